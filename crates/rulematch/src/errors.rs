//! Diagnostics and error types shared by the query and rule modules.

use thiserror::Error;

use crate::query::Connective;

/// Non-fatal diagnostic recorded while compiling a query.
///
/// Warnings never change how a query evaluates. Each one names a construct
/// the parser tolerated so rule authors can spot typos before they ship.
/// Positions are zero-based indices into the token stream after implicit
/// conjunctions have been inserted.
///
/// # Examples
/// ```
/// use rulematch::{Query, QueryWarning};
/// let query = Query::compile("(stryker OR wright*");
/// assert_eq!(query.warnings(), &[QueryWarning::UnclosedGroup { position: 0 }]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryWarning {
    /// The query produced no tokens at all.
    #[error("query is empty")]
    EmptyQuery,
    /// A `(` was still open when the input ended.
    #[error("unclosed '(' at token {position} (zero-based)")]
    UnclosedGroup {
        /// Token index of the opening parenthesis.
        position: usize,
    },
    /// A `)` appeared while no group was open and was skipped.
    #[error("unmatched ')' at token {position} (zero-based)")]
    UnmatchedClose {
        /// Token index of the stray parenthesis.
        position: usize,
    },
    /// A connective had nothing to apply to on one side.
    #[error("'{connective}' is missing an operand at token {position} (zero-based)")]
    MissingOperand {
        /// The connective that was ignored.
        connective: Connective,
        /// Token index of the connective.
        position: usize,
    },
    /// A wildcard marker with no prefix, which can never match.
    #[error("wildcard without a prefix at token {position} (zero-based)")]
    BareWildcard {
        /// Token index of the wildcard term.
        position: usize,
    },
    /// Groups opened past the nesting limit were merged into the group
    /// around them.
    #[error("groups nested deeper than {limit} levels at token {position} (zero-based) are flattened")]
    NestingTooDeep {
        /// Token index of the first `(` past the limit.
        position: usize,
        /// The nesting limit in force.
        limit: usize,
    },
    /// Tokens were present but none of them formed a term.
    #[error("query contains no terms and never matches")]
    NeverMatches,
}

/// Errors surfaced while loading a brand rule set.
///
/// # Examples
/// ```
/// use rulematch::{RuleSet, RuleSetError};
/// let err = RuleSet::from_json(r#"{"brands": [{"name": " ", "rule": "a"}]}"#)
///     .err()
///     .map(|e| e.to_string());
/// assert_eq!(err.as_deref(), Some("brand at index 0 has a blank name"));
/// ```
#[derive(Debug, Error)]
pub enum RuleSetError {
    /// The document is not valid rule-set JSON.
    #[error("invalid rule set JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A brand or sub-brand name is empty after trimming.
    #[error("{scope} has a blank name")]
    BlankName {
        /// Where the blank name was found.
        scope: String,
    },
    /// Two entries in the same scope share a name.
    #[error("duplicate name `{name}` in {scope}")]
    DuplicateName {
        /// Where the duplicate was found.
        scope: String,
        /// The repeated name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_positional_warnings() {
        assert_eq!(
            QueryWarning::UnmatchedClose { position: 3 }.to_string(),
            "unmatched ')' at token 3 (zero-based)"
        );
        assert_eq!(
            QueryWarning::MissingOperand {
                connective: Connective::Or,
                position: 1,
            }
            .to_string(),
            "'OR' is missing an operand at token 1 (zero-based)"
        );
    }

    #[test]
    fn formats_nesting_limit() {
        assert_eq!(
            QueryWarning::NestingTooDeep {
                position: 4,
                limit: 2,
            }
            .to_string(),
            "groups nested deeper than 2 levels at token 4 (zero-based) are flattened"
        );
    }

    #[test]
    fn formats_duplicate_names() {
        let err = RuleSetError::DuplicateName {
            scope: "brands".into(),
            name: "Stryker".into(),
        };
        assert_eq!(err.to_string(), "duplicate name `Stryker` in brands");
    }

    #[test]
    fn forwards_json_error_display() {
        let Err(json_err) = serde_json::from_str::<serde_json::Value>("{") else {
            panic!("truncated JSON should not parse");
        };
        let expected = format!("invalid rule set JSON: {json_err}");
        assert_eq!(RuleSetError::from(json_err).to_string(), expected);
    }
}
