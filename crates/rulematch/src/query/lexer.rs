//! Query lexer converting rule text into connective, group and term tokens.

use std::fmt;

use crate::normalise::{fold_case, is_word_char, normalise};

/// Marker that turns a bare term into a prefix match.
pub const WILDCARD: char = '*';

/// Boolean connective recognised in query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    /// Both operands must match.
    And,
    /// Either operand may match.
    Or,
    /// Unary negation of the following operand.
    Not,
}

impl Connective {
    /// Return the connective as it is conventionally written.
    ///
    /// # Examples
    /// ```
    /// use rulematch::Connective;
    /// assert_eq!(Connective::Or.as_str(), "OR");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }

    /// `AND` and `OR` join two operands; `NOT` prefixes one.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        !matches!(self, Self::Not)
    }

    fn from_word(word: &str) -> Option<Self> {
        match word {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            _ => None,
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexical unit of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `and`, `or` or `not` written as a bare word.
    Connective(Connective),
    /// Opening parenthesis.
    LeftParen,
    /// Closing parenthesis.
    RightParen,
    /// A single normalised word.
    Term {
        /// Lowercased alphanumeric word, without the wildcard marker.
        value: String,
        /// Whether the word was followed by [`WILDCARD`].
        wildcard: bool,
    },
    /// Normalised contents of a double-quoted span.
    Phrase(String),
}

#[derive(Default)]
struct Lexer {
    tokens: Vec<Token>,
}

impl Lexer {
    fn push(&mut self, token: Token) {
        if let Token::Connective(next) = &token {
            if next.is_binary() && matches!(self.tokens.last(), Some(Token::Connective(_))) {
                return;
            }
        }
        self.tokens.push(token);
    }

    fn push_phrase(&mut self, body: &str) {
        let value = normalise(body);
        if !value.is_empty() {
            self.push(Token::Phrase(value));
        }
    }

    fn push_word(&mut self, word: String, wildcard: bool) {
        let token = match (wildcard, Connective::from_word(&word)) {
            (false, Some(connective)) => Token::Connective(connective),
            _ => Token::Term {
                value: word,
                wildcard,
            },
        };
        self.push(token);
    }

    /// Split an unquoted run on non-word characters into sub-tokens.
    fn push_run(&mut self, run: &str) {
        let mut word = String::new();
        let mut emitted = false;
        let mut saw_marker = false;
        for ch in run.chars() {
            if is_word_char(ch) {
                word.push(ch);
                continue;
            }
            saw_marker |= ch == WILDCARD;
            if !word.is_empty() {
                self.push_word(std::mem::take(&mut word), ch == WILDCARD);
                emitted = true;
            }
        }
        if !word.is_empty() {
            self.push_word(word, false);
            emitted = true;
        }
        if !emitted && saw_marker {
            self.push(Token::Term {
                value: String::new(),
                wildcard: true,
            });
        }
    }
}

/// Lex a raw query string into tokens.
///
/// The query is lowercased first. Parentheses are always tokens of their
/// own, a `"` opens a phrase running to the next `"` (or the end of input),
/// and everything else is split into words. A binary connective directly
/// after another connective is dropped, so the output never holds two
/// adjacent `AND`/`OR` tokens.
///
/// # Examples
/// ```
/// use rulematch::{Connective, Token, tokenise};
/// let tokens = tokenise("Wright* OR \"Wall-Street\"");
/// assert_eq!(
///     tokens,
///     vec![
///         Token::Term { value: "wright".into(), wildcard: true },
///         Token::Connective(Connective::Or),
///         Token::Phrase("wall street".into()),
///     ]
/// );
/// ```
#[must_use]
pub fn tokenise(query: &str) -> Vec<Token> {
    let lowered: String = fold_case(query).collect();
    let mut lexer = Lexer::default();
    let mut chars = lowered.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '(' => lexer.push(Token::LeftParen),
            ')' => lexer.push(Token::RightParen),
            '"' => {
                let body: String = chars.by_ref().take_while(|&c| c != '"').collect();
                lexer.push_phrase(&body);
            }
            c if c.is_whitespace() => {}
            c => {
                let mut run = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || matches!(next, '(' | ')' | '"') {
                        break;
                    }
                    run.push(next);
                    chars.next();
                }
                lexer.push_run(&run);
            }
        }
    }

    lexer.tokens
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rstest::rstest;

    pub(crate) fn term(value: &str) -> Token {
        Token::Term {
            value: value.into(),
            wildcard: false,
        }
    }

    pub(crate) fn prefix(value: &str) -> Token {
        Token::Term {
            value: value.into(),
            wildcard: true,
        }
    }

    pub(crate) fn phrase(value: &str) -> Token {
        Token::Phrase(value.into())
    }

    pub(crate) const AND: Token = Token::Connective(Connective::And);
    pub(crate) const OR: Token = Token::Connective(Connective::Or);
    pub(crate) const NOT: Token = Token::Connective(Connective::Not);

    #[test]
    fn tokenises_connectives_case_insensitively() {
        assert_eq!(
            tokenise("a AND b or c Not d"),
            vec![term("a"), AND, term("b"), OR, term("c"), NOT, term("d")]
        );
    }

    #[test]
    fn splits_parentheses_regardless_of_spacing() {
        assert_eq!(
            tokenise("(a)or(b)"),
            vec![
                Token::LeftParen,
                term("a"),
                Token::RightParen,
                OR,
                Token::LeftParen,
                term("b"),
                Token::RightParen,
            ]
        );
    }

    #[rstest]
    #[case("\"Salvation  Beams\"", vec![phrase("salvation beams")])]
    #[case("\"share holder*\"", vec![phrase("share holder")])]
    #[case("\"unterminated phrase", vec![phrase("unterminated phrase")])]
    #[case("\"\" a", vec![term("a")])]
    #[case("x\"y z\"", vec![term("x"), phrase("y z")])]
    #[case("\"and\"", vec![phrase("and")])]
    fn lexes_phrases(#[case] query: &str, #[case] expected: Vec<Token>) {
        assert_eq!(tokenise(query), expected);
    }

    #[rstest]
    #[case("wright*", vec![prefix("wright")])]
    #[case("stock**", vec![prefix("stock")])]
    #[case("*", vec![prefix("")])]
    #[case("-*-", vec![prefix("")])]
    #[case("foo-*", vec![term("foo")])]
    #[case("foo*bar", vec![prefix("foo"), term("bar")])]
    #[case("and*", vec![prefix("and")])]
    fn lexes_wildcards(#[case] query: &str, #[case] expected: Vec<Token>) {
        assert_eq!(tokenise(query), expected);
    }

    #[rstest]
    #[case("super_stryker", vec![term("super"), term("stryker")])]
    #[case("near/5", vec![term("near"), term("5")])]
    #[case("Marché", vec![term("marché")])]
    #[case("R6", vec![term("r6")])]
    #[case("!!!", vec![])]
    fn splits_words_on_punctuation(#[case] query: &str, #[case] expected: Vec<Token>) {
        assert_eq!(tokenise(query), expected);
    }

    #[rstest]
    #[case("a AND OR b", vec![term("a"), AND, term("b")])]
    #[case("a or and b", vec![term("a"), OR, term("b")])]
    #[case("NOT AND b", vec![NOT, term("b")])]
    #[case("a AND NOT b", vec![term("a"), AND, NOT, term("b")])]
    #[case("NOT NOT b", vec![NOT, NOT, term("b")])]
    fn drops_redundant_connectives(#[case] query: &str, #[case] expected: Vec<Token>) {
        assert_eq!(tokenise(query), expected);
    }

    #[test]
    fn empty_query_yields_no_tokens() {
        assert!(tokenise("").is_empty());
        assert!(tokenise("   \t").is_empty());
    }

    #[rstest]
    #[case("ΟΔΟΣ")]
    #[case("Σοφία ΟΔΟΣ")]
    #[case("İstanbul")]
    #[case("Straße")]
    #[case("ǅemal")]
    fn term_values_fold_like_documents(#[case] word: &str) {
        let values: Vec<String> = tokenise(word)
            .into_iter()
            .filter_map(|token| match token {
                Token::Term { value, .. } => Some(value),
                _ => None,
            })
            .collect();
        assert_eq!(values.join(" "), normalise(word));
    }
}
