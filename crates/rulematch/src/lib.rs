//! Boolean keyword rules for content classification.
//!
//! A rule is a hand-authored expression such as
//! `("salvation beams" OR salvationbeams) AND (stryker OR wright*)`. Rules
//! are compiled once into a [`Query`] and evaluated against normalised
//! document text, producing a plain yes/no verdict.
//!
//! Supported syntax, loosest binding first: `OR`, `AND` (also implied by
//! juxtaposition), `NOT`, and parentheses. Bare words match whole words,
//! `word*` matches any word starting with `word`, and `"quoted text"` must
//! appear contiguously. Connectives are case-insensitive. There is no
//! proximity operator; `NEAR/5` reads as the two words `near` and `5`.
//!
//! Matching never fails. Malformed rules are recovered best-effort and the
//! tolerated constructs are reported through [`Query::warnings`].

mod context;
mod errors;
mod evaluate;
mod normalise;
mod query;
mod rules;

pub use context::MatchContext;
pub use errors::{QueryWarning, RuleSetError};
pub use evaluate::evaluate;
pub use normalise::{is_word_char, normalise};
pub use query::{
    Connective, MAX_NESTING, Node, Parsed, Query, TermMode, Token, WILDCARD, insert_implicit_and,
    parse, tokenise,
};
pub use rules::{
    BrandRule, Classification, Classifier, CompiledRule, RuleSet, RuleWarning, SubBrandRule,
};

/// Decide whether `document` satisfies the rule `query`.
///
/// An empty or unusable query never matches.
///
/// # Examples
/// ```
/// use rulematch::matches;
/// let query = "\"T2 femur\" NOT (stock OR \"wall street\")";
/// assert!(matches("T2 femur nail clinical overview", query));
/// assert!(!matches("T2 femur nails and stock performance on Wall Street", query));
/// assert!(!matches("anything", ""));
/// ```
#[must_use]
pub fn matches(document: &str, query: &str) -> bool {
    Query::compile(query).matches(document)
}
