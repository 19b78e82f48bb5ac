//! Expression tree produced by the parser.

use std::fmt;

use super::lexer::WILDCARD;

/// How a term is compared against a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermMode {
    /// The document must contain the word exactly.
    Exact,
    /// Some document word must start with the value.
    Prefix,
    /// The normalised document text must contain the value verbatim.
    Phrase,
}

/// Node of a compiled boolean expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A leaf comparing one normalised value against the document.
    Term {
        /// Normalised term text.
        value: String,
        /// Comparison used for the value.
        mode: TermMode,
    },
    /// Negation of the child expression.
    Not(Box<Node>),
    /// Both children must match.
    And(Box<Node>, Box<Node>),
    /// At least one child must match.
    Or(Box<Node>, Box<Node>),
}

impl Node {
    /// Build an exact-word leaf.
    #[must_use]
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Term {
            value: value.into(),
            mode: TermMode::Exact,
        }
    }

    /// Build a prefix (wildcard) leaf.
    #[must_use]
    pub fn prefix(value: impl Into<String>) -> Self {
        Self::Term {
            value: value.into(),
            mode: TermMode::Prefix,
        }
    }

    /// Build a phrase leaf.
    #[must_use]
    pub fn phrase(value: impl Into<String>) -> Self {
        Self::Term {
            value: value.into(),
            mode: TermMode::Phrase,
        }
    }

    /// Negate `child`.
    #[must_use]
    pub fn negate(child: Self) -> Self {
        Self::Not(Box::new(child))
    }

    /// Conjoin two expressions.
    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    /// Disjoin two expressions.
    #[must_use]
    pub fn or(left: Self, right: Self) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }
}

/// Renders a fully parenthesised canonical form, e.g.
/// `(("salvation beams" OR salvationbeams) AND wright*)`.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Term {
                value,
                mode: TermMode::Exact,
            } => f.write_str(value),
            Self::Term {
                value,
                mode: TermMode::Prefix,
            } => write!(f, "{value}{WILDCARD}"),
            Self::Term {
                value,
                mode: TermMode::Phrase,
            } => write!(f, "\"{value}\""),
            Self::Not(child) => write!(f, "NOT {child}"),
            Self::And(left, right) => write!(f, "({left} AND {right})"),
            Self::Or(left, right) => write!(f, "({left} OR {right})"),
        }
    }
}
