//! Text canonicalisation shared by documents and query phrases.

use std::sync::LazyLock;

use regex::Regex;

static MARKUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap_or_else(|_| unreachable!()));

/// Whether `ch` belongs to a word in normalised text.
///
/// The lexer and the normaliser both segment on this predicate so document
/// words and query words always line up.
#[must_use]
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric()
}

/// Lowercase `text` one character at a time.
///
/// Queries and documents both go through this fold, so no context-sensitive
/// mapping (such as a word-final sigma) can make the two sides disagree.
pub(crate) fn fold_case(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().flat_map(char::to_lowercase)
}

/// Canonicalise free text for matching.
///
/// Markup spans are replaced by a space, the text is lowercased, and every
/// run of non-word characters collapses to a single space with no leading or
/// trailing space. The result is idempotent under a second call.
///
/// # Examples
/// ```
/// use rulematch::normalise;
/// assert_eq!(normalise("<p>Salvation-Beams,  by <b>Stryker</b>!</p>"), "salvation beams by stryker");
/// assert_eq!(normalise(""), "");
/// ```
#[must_use]
pub fn normalise(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let stripped = MARKUP_RE.replace_all(text, " ");
    let mut out = String::with_capacity(stripped.len());
    let mut pending_space = false;
    for ch in fold_case(&stripped) {
        if is_word_char(ch) {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }
    out
}
