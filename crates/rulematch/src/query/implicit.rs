//! Juxtaposition handling: `a b` and `a (b or c)` read as conjunctions.

use super::lexer::{Connective, Token};

/// A token after which an operand has just finished.
fn ends_value(token: &Token) -> bool {
    matches!(
        token,
        Token::Term { .. } | Token::Phrase(_) | Token::RightParen
    )
}

/// A token that begins a new operand.
fn starts_value(token: &Token) -> bool {
    matches!(
        token,
        Token::Term { .. }
            | Token::Phrase(_)
            | Token::LeftParen
            | Token::Connective(Connective::Not)
    )
}

/// Splice an `AND` between every completed operand and a following operand.
///
/// Explicit `AND`/`OR` tokens are never value starts, so they are never
/// preceded by an inserted connective.
///
/// # Examples
/// ```
/// use rulematch::{Connective, Token, insert_implicit_and, tokenise};
/// let tokens = insert_implicit_and(tokenise("stryker (t2)"));
/// assert_eq!(tokens.get(1), Some(&Token::Connective(Connective::And)));
/// ```
#[must_use]
pub fn insert_implicit_and(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len().saturating_mul(2));
    for token in tokens {
        if out.last().is_some_and(ends_value) && starts_value(&token) {
            out.push(Token::Connective(Connective::And));
        }
        out.push(token);
    }
    out
}
