//! Query compilation: lexing, implicit conjunction, parsing.

mod ast;
mod implicit;
mod lexer;
mod parser;

use crate::context::MatchContext;
use crate::errors::QueryWarning;
use crate::evaluate::evaluate;

pub use ast::{Node, TermMode};
pub use implicit::insert_implicit_and;
pub use lexer::{Connective, Token, WILDCARD, tokenise};
pub use parser::{MAX_NESTING, Parsed, parse};

/// A query compiled once and reusable across documents.
///
/// Compilation never fails; a query with no usable terms compiles to an
/// empty expression that matches nothing.
///
/// # Examples
/// ```
/// use rulematch::{MatchContext, Query};
/// let query = Query::compile("(\"salvation beams\" OR salvationbeams) AND (stryker OR wright*)");
/// let ctx = MatchContext::new("The salvation beams system by Stryker");
/// assert!(query.evaluate(&ctx));
/// assert!(!query.matches("A Wright Medical shoulder implant"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    source: String,
    root: Option<Node>,
    warnings: Vec<QueryWarning>,
}

impl Query {
    /// Compile `source` into an expression tree.
    #[must_use]
    pub fn compile(source: &str) -> Self {
        let Parsed { root, warnings } = parse(&insert_implicit_and(tokenise(source)));
        for warning in &warnings {
            log::debug!("query {source:?}: {warning}");
        }
        Self {
            source: source.to_owned(),
            root,
            warnings,
        }
    }

    /// The text the query was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Root of the compiled expression, if any term survived.
    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// Whether the query compiled to nothing and therefore never matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Constructs tolerated while compiling.
    #[must_use]
    pub fn warnings(&self) -> &[QueryWarning] {
        &self.warnings
    }

    /// Evaluate against a prepared document context.
    #[must_use]
    pub fn evaluate(&self, context: &MatchContext) -> bool {
        self.root
            .as_ref()
            .is_some_and(|root| evaluate(root, context))
    }

    /// Normalise `document` and evaluate against it.
    #[must_use]
    pub fn matches(&self, document: &str) -> bool {
        self.evaluate(&MatchContext::new(document))
    }
}
