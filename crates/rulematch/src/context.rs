//! Per-document data that compiled queries are evaluated against.

use hashbrown::HashSet;

use crate::normalise::normalise;

/// Normalised view of one document.
///
/// Built once per document; any number of queries can then be evaluated
/// against the same context by shared reference.
///
/// # Examples
/// ```
/// use rulematch::MatchContext;
/// let ctx = MatchContext::new("<p>Stryker's T2-Femur nail</p>");
/// assert_eq!(ctx.text(), "stryker s t2 femur nail");
/// assert!(ctx.contains_word("femur"));
/// assert!(ctx.has_word_with_prefix("stry"));
/// assert!(ctx.contains_phrase("t2 femur"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MatchContext {
    text: String,
    words: Vec<String>,
    vocabulary: HashSet<String>,
}

impl MatchContext {
    /// Normalise `document` and index its words.
    #[must_use]
    pub fn new(document: &str) -> Self {
        let text = normalise(document);
        let words: Vec<String> = text
            .split(' ')
            .filter(|word| !word.is_empty())
            .map(str::to_owned)
            .collect();
        let vocabulary = words.iter().cloned().collect();
        Self {
            text,
            words,
            vocabulary,
        }
    }

    /// The normalised document text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Words of the normalised text in document order.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Whether the document holds no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether `word` occurs as a whole word.
    #[must_use]
    pub fn contains_word(&self, word: &str) -> bool {
        self.vocabulary.contains(word)
    }

    /// Whether some word starts with `prefix`. An empty prefix never matches.
    #[must_use]
    pub fn has_word_with_prefix(&self, prefix: &str) -> bool {
        !prefix.is_empty() && self.words.iter().any(|word| word.starts_with(prefix))
    }

    /// Whether the normalised text contains `phrase` contiguously.
    ///
    /// Containment is substring-based, so `"beam"` also matches inside
    /// `"beams"`. An empty phrase never matches.
    #[must_use]
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        !phrase.is_empty() && self.text.contains(phrase)
    }
}
