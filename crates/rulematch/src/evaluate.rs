//! Boolean evaluation of expression trees.

use crate::context::MatchContext;
use crate::query::{Node, TermMode};

/// Decide whether `context` satisfies `node`.
///
/// Pure and recursive; depth follows the nesting of the authored query, not
/// the size of the document.
///
/// # Examples
/// ```
/// use rulematch::{MatchContext, Node, evaluate};
/// let ctx = MatchContext::new("Stryker T2 femur");
/// let node = Node::and(Node::exact("stryker"), Node::negate(Node::prefix("stock")));
/// assert!(evaluate(&node, &ctx));
/// ```
#[must_use]
pub fn evaluate(node: &Node, context: &MatchContext) -> bool {
    match node {
        Node::Term { value, mode } => match mode {
            TermMode::Phrase => context.contains_phrase(value),
            TermMode::Prefix => context.has_word_with_prefix(value),
            TermMode::Exact => context.contains_word(value),
        },
        Node::Not(child) => !evaluate(child, context),
        Node::And(left, right) => evaluate(left, context) && evaluate(right, context),
        Node::Or(left, right) => evaluate(left, context) || evaluate(right, context),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn article() -> MatchContext {
        MatchContext::new("The salvation beams system by Stryker is trending in orthopedics.")
    }

    #[rstest]
    #[case(Node::exact("stryker"), true)]
    #[case(Node::exact("stryk"), false)]
    #[case(Node::prefix("trend"), true)]
    #[case(Node::prefix("trends"), false)]
    #[case(Node::prefix(""), false)]
    #[case(Node::phrase("salvation beams"), true)]
    #[case(Node::phrase("beams salvation"), false)]
    #[case(Node::phrase("is trend"), true)]
    fn evaluates_leaves(article: MatchContext, #[case] node: Node, #[case] expected: bool) {
        assert_eq!(evaluate(&node, &article), expected);
    }

    #[rstest]
    #[case(Node::negate(Node::exact("stock")), true)]
    #[case(Node::and(Node::exact("stryker"), Node::exact("wright")), false)]
    #[case(Node::or(Node::exact("wright"), Node::exact("stryker")), true)]
    #[case(
        Node::and(
            Node::or(Node::phrase("salvation beams"), Node::exact("salvationbeams")),
            Node::or(Node::exact("stryker"), Node::prefix("wright")),
        ),
        true
    )]
    fn evaluates_connectives(article: MatchContext, #[case] node: Node, #[case] expected: bool) {
        assert_eq!(evaluate(&node, &article), expected);
    }

    #[test]
    fn negation_is_the_only_way_to_match_an_empty_document() {
        let empty = MatchContext::new("");
        assert!(!evaluate(&Node::exact("a"), &empty));
        assert!(!evaluate(&Node::prefix("a"), &empty));
        assert!(!evaluate(&Node::phrase("a b"), &empty));
        assert!(evaluate(&Node::negate(Node::exact("a")), &empty));
    }
}
