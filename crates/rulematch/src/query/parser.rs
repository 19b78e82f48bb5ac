//! Recursive-descent parser turning tokens into an expression tree.
//!
//! ```text
//! expr     := or_expr
//! or_expr  := and_expr (OR and_expr)*
//! and_expr := not_expr (AND not_expr)*
//! not_expr := NOT not_expr | primary
//! primary  := '(' or_expr ')' | TERM | PHRASE
//! ```
//!
//! The parser never fails. Malformed constructs are dropped and reported as
//! [`QueryWarning`]s: a stray `)` is skipped, a missing `)` is assumed at the
//! end of input, and a connective without an operand contributes nothing.
//! Groups nested deeper than [`MAX_NESTING`] are flattened into the
//! innermost allowed group.

use crate::errors::QueryWarning;
use crate::normalise::normalise;

use super::ast::Node;
use super::lexer::{Connective, Token};

/// Result of parsing a token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    /// Root of the expression, or `None` when no term survived parsing.
    pub root: Option<Node>,
    /// Constructs the parser had to tolerate, in the order met.
    pub warnings: Vec<QueryWarning>,
}

/// Deepest group nesting parsed as written.
pub const MAX_NESTING: usize = 128;

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    /// `(` tokens dropped past [`MAX_NESTING`] whose `)` is still pending.
    flattened: usize,
    warnings: Vec<QueryWarning>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            flattened: 0,
            warnings: Vec::new(),
        }
    }

    /// Current token, skipping any `)` that closes nothing or closes a
    /// flattened group.
    fn peek(&mut self) -> Option<&'a Token> {
        let tokens = self.tokens;
        while matches!(tokens.get(self.pos), Some(Token::RightParen)) {
            if self.flattened > 0 {
                self.flattened -= 1;
            } else if self.depth == 0 {
                self.warnings
                    .push(QueryWarning::UnmatchedClose { position: self.pos });
            } else {
                break;
            }
            self.pos += 1;
        }
        tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Consume `connective` if it is next, returning its position.
    fn eat(&mut self, connective: Connective) -> Option<usize> {
        match self.peek() {
            Some(Token::Connective(next)) if *next == connective => {
                let position = self.pos;
                self.advance();
                Some(position)
            }
            _ => None,
        }
    }

    fn join(
        &mut self,
        connective: Connective,
        position: usize,
        left: Option<Node>,
        right: Option<Node>,
        build: fn(Node, Node) -> Node,
    ) -> Option<Node> {
        match (left, right) {
            (Some(left), Some(right)) => Some(build(left, right)),
            (left, right) => {
                self.warnings.push(QueryWarning::MissingOperand {
                    connective,
                    position,
                });
                left.or(right)
            }
        }
    }

    fn parse_or(&mut self) -> Option<Node> {
        let mut left = self.parse_and();
        while let Some(position) = self.eat(Connective::Or) {
            let right = self.parse_and();
            left = self.join(Connective::Or, position, left, right, Node::or);
        }
        left
    }

    fn parse_and(&mut self) -> Option<Node> {
        let mut left = self.parse_not();
        while let Some(position) = self.eat(Connective::And) {
            let right = self.parse_not();
            left = self.join(Connective::And, position, left, right, Node::and);
        }
        left
    }

    fn parse_not(&mut self) -> Option<Node> {
        let mut negations = Vec::new();
        while let Some(position) = self.eat(Connective::Not) {
            negations.push(position);
        }
        let Some(mut node) = self.parse_primary() else {
            for &position in negations.iter().rev() {
                self.warnings.push(QueryWarning::MissingOperand {
                    connective: Connective::Not,
                    position,
                });
            }
            return None;
        };
        for _ in &negations {
            node = Node::negate(node);
        }
        Some(node)
    }

    fn parse_primary(&mut self) -> Option<Node> {
        let mut token = self.peek()?;
        while self.depth >= MAX_NESTING && matches!(token, Token::LeftParen) {
            if self.flattened == 0 {
                self.warnings.push(QueryWarning::NestingTooDeep {
                    position: self.pos,
                    limit: MAX_NESTING,
                });
            }
            self.flattened += 1;
            self.advance();
            token = self.peek()?;
        }
        let position = self.pos;
        match token {
            Token::LeftParen => {
                self.advance();
                self.depth += 1;
                let inner = self.parse_or();
                self.depth -= 1;
                if matches!(self.tokens.get(self.pos), Some(Token::RightParen)) {
                    self.advance();
                } else {
                    self.warnings
                        .push(QueryWarning::UnclosedGroup { position });
                }
                inner
            }
            Token::Term { value, wildcard } => {
                self.advance();
                Some(self.leaf(value, *wildcard, position))
            }
            Token::Phrase(value) => {
                self.advance();
                Some(Node::phrase(normalise(value)))
            }
            Token::RightParen | Token::Connective(_) => None,
        }
    }

    fn leaf(&mut self, raw: &str, wildcard: bool, position: usize) -> Node {
        let value = normalise(raw);
        if value.contains(' ') {
            return Node::phrase(value);
        }
        if !wildcard {
            return Node::exact(value);
        }
        if value.is_empty() {
            self.warnings
                .push(QueryWarning::BareWildcard { position });
        }
        Node::prefix(value)
    }
}

/// Parse a token stream in one forward pass.
///
/// Operator precedence from loosest to tightest is `OR`, `AND`, `NOT`, then
/// parentheses. Pieces left over after a complete expression (only possible
/// for streams that skipped [`insert_implicit_and`](crate::insert_implicit_and))
/// are conjoined with it.
///
/// # Examples
/// ```
/// use rulematch::{Node, insert_implicit_and, parse, tokenise};
/// let parsed = parse(&insert_implicit_and(tokenise("stryker OR wright* t2")));
/// assert_eq!(
///     parsed.root,
///     Some(Node::or(
///         Node::exact("stryker"),
///         Node::and(Node::prefix("wright"), Node::exact("t2")),
///     ))
/// );
/// assert!(parsed.warnings.is_empty());
/// ```
#[must_use]
pub fn parse(tokens: &[Token]) -> Parsed {
    let mut parser = Parser::new(tokens);
    let mut root: Option<Node> = None;

    while parser.peek().is_some() {
        let start = parser.pos;
        let next = parser.parse_or();
        root = match (root, next) {
            (Some(left), Some(right)) => Some(Node::and(left, right)),
            (left, right) => left.or(right),
        };
        if parser.pos == start {
            parser.advance();
        }
    }

    let mut warnings = parser.warnings;
    if tokens.is_empty() {
        warnings.push(QueryWarning::EmptyQuery);
    } else if root.is_none() {
        warnings.push(QueryWarning::NeverMatches);
    }
    Parsed { root, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::implicit::insert_implicit_and;
    use crate::query::lexer::tokenise;
    use rstest::rstest;

    fn parse_query(query: &str) -> Parsed {
        parse(&insert_implicit_and(tokenise(query)))
    }

    fn a() -> Node {
        Node::exact("a")
    }

    fn b() -> Node {
        Node::exact("b")
    }

    fn c() -> Node {
        Node::exact("c")
    }

    #[rstest]
    #[case("a OR b AND c", Node::or(a(), Node::and(b(), c())))]
    #[case("a AND b OR c", Node::or(Node::and(a(), b()), c()))]
    #[case("NOT a AND b", Node::and(Node::negate(a()), b()))]
    #[case("NOT NOT a", Node::negate(Node::negate(a())))]
    #[case("(a OR b) c", Node::and(Node::or(a(), b()), c()))]
    #[case("a (b OR c)", Node::and(a(), Node::or(b(), c())))]
    #[case("((a))", a())]
    #[case("a b c", Node::and(Node::and(a(), b()), c()))]
    fn respects_precedence(#[case] query: &str, #[case] expected: Node) {
        let parsed = parse_query(query);
        assert_eq!(parsed.root, Some(expected));
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
    }

    #[test]
    fn parses_phrase_and_negated_group() {
        let parsed = parse_query("\"T2 femur\" NOT (stock OR \"wall street\")");
        assert_eq!(
            parsed.root,
            Some(Node::and(
                Node::phrase("t2 femur"),
                Node::negate(Node::or(Node::exact("stock"), Node::phrase("wall street"))),
            ))
        );
    }

    #[rstest]
    #[case(
        "(a AND",
        Some(a()),
        vec![
            QueryWarning::MissingOperand { connective: Connective::And, position: 2 },
            QueryWarning::UnclosedGroup { position: 0 },
        ]
    )]
    #[case("a )", Some(a()), vec![QueryWarning::UnmatchedClose { position: 1 }])]
    #[case("a ) b", Some(Node::and(a(), b())), vec![QueryWarning::UnmatchedClose { position: 1 }])]
    #[case("(a)) OR b", Some(Node::or(a(), b())), vec![QueryWarning::UnmatchedClose { position: 3 }])]
    #[case(
        "OR b",
        Some(b()),
        vec![QueryWarning::MissingOperand { connective: Connective::Or, position: 0 }]
    )]
    #[case(
        "a NOT",
        Some(a()),
        vec![
            QueryWarning::MissingOperand { connective: Connective::Not, position: 2 },
            QueryWarning::MissingOperand { connective: Connective::And, position: 1 },
        ]
    )]
    #[case(
        "AND OR",
        None,
        vec![
            QueryWarning::MissingOperand { connective: Connective::And, position: 0 },
            QueryWarning::NeverMatches,
        ]
    )]
    #[case("()", None, vec![QueryWarning::NeverMatches])]
    #[case("", None, vec![QueryWarning::EmptyQuery])]
    #[case("*", Some(Node::prefix("")), vec![QueryWarning::BareWildcard { position: 0 }])]
    fn recovers_from_malformed_input(
        #[case] query: &str,
        #[case] root: Option<Node>,
        #[case] warnings: Vec<QueryWarning>,
    ) {
        let parsed = parse_query(query);
        assert_eq!(parsed.root, root);
        assert_eq!(parsed.warnings, warnings);
    }

    #[test]
    fn conjoins_juxtaposed_tokens_without_implicit_pass() {
        let tokens = vec![
            Token::Term {
                value: "a".into(),
                wildcard: false,
            },
            Token::Term {
                value: "b".into(),
                wildcard: false,
            },
        ];
        assert_eq!(parse(&tokens).root, Some(Node::and(a(), b())));
    }

    #[test]
    fn normalises_hand_built_terms() {
        let tokens = vec![
            Token::Term {
                value: "Wall Street".into(),
                wildcard: false,
            },
            Token::Connective(Connective::Or),
            Token::Term {
                value: "NYSE".into(),
                wildcard: false,
            },
        ];
        assert_eq!(
            parse(&tokens).root,
            Some(Node::or(Node::phrase("wall street"), Node::exact("nyse")))
        );
    }

    #[test]
    fn flattens_groups_past_the_nesting_limit() {
        let depth = MAX_NESTING + 3;
        let query = format!("{}a OR b{} c", "(".repeat(depth), ")".repeat(depth));
        let parsed = parse_query(&query);
        assert_eq!(
            parsed.warnings,
            vec![QueryWarning::NestingTooDeep {
                position: MAX_NESTING,
                limit: MAX_NESTING,
            }]
        );
        assert_eq!(parsed.root, Some(Node::and(Node::or(a(), b()), c())));
    }

    #[test]
    fn unclosed_deep_nesting_still_parses() {
        let parsed = parse_query(&"(".repeat(5000));
        assert_eq!(parsed.root, None);
        assert_eq!(
            parsed.warnings.first(),
            Some(&QueryWarning::NestingTooDeep {
                position: MAX_NESTING,
                limit: MAX_NESTING,
            })
        );
        assert_eq!(parsed.warnings.last(), Some(&QueryWarning::NeverMatches));
    }

    #[test]
    fn long_negation_chains_parse_without_recursion() {
        let parsed = parse_query(&format!("{}a", "NOT ".repeat(3)));
        assert_eq!(
            parsed.root,
            Some(Node::negate(Node::negate(Node::negate(a()))))
        );
        let parsed = parse_query(&"NOT ".repeat(2));
        assert_eq!(
            parsed.warnings,
            vec![
                QueryWarning::MissingOperand { connective: Connective::Not, position: 1 },
                QueryWarning::MissingOperand { connective: Connective::Not, position: 0 },
                QueryWarning::NeverMatches,
            ]
        );
    }
}
