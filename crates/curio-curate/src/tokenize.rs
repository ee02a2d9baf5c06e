//! Record tokenization for the similarity engine.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use curio_core::defaults::TOKEN_MIN_CHARS;
use curio_core::{ContentRecord, RecordId};

/// Common English function words dropped before scoring. Everything at
/// or below [`TOKEN_MIN_CHARS`] characters is dropped by the length
/// filter already, so only longer words appear here.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "are", "but", "not", "you", "all", "can", "was", "one", "our",
        "out", "has", "have", "had", "this", "that", "with", "from", "they", "will", "would",
        "there", "their", "what", "which", "when", "your", "them", "then", "than", "some",
        "into", "just", "about", "been", "more", "very", "also",
    ]
    .into_iter()
    .collect()
});

/// Tokenize text into the term set used for Jaccard scoring.
///
/// Lowercases, maps non-alphanumeric characters to spaces, splits on
/// whitespace, and drops short tokens and stopwords.
pub fn tokenize(text: &str) -> HashSet<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    normalized
        .split_whitespace()
        .filter(|token| token.chars().count() > TOKEN_MIN_CHARS)
        .filter(|token| !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Per-record token set cache.
///
/// Built eagerly over one snapshot of the record set; rebuilding the
/// engine over a reloaded snapshot is the invalidation path.
pub struct TokenSets {
    sets: HashMap<RecordId, HashSet<String>>,
}

impl TokenSets {
    pub fn build(records: &[ContentRecord]) -> Self {
        let sets = records
            .iter()
            .map(|record| (record.id.clone(), tokenize(&record.text)))
            .collect();
        Self { sets }
    }

    pub fn get(&self, id: &RecordId) -> Option<&HashSet<String>> {
        self.sets.get(id)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
