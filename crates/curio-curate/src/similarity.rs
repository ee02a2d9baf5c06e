//! Jaccard-based "find similar items" suggestion engine.
//!
//! A deterministic, explainable similarity signal — set overlap over
//! extracted terms, no model calls and no server-side compute. The user
//! picks a handful of seed records for a category; candidates are
//! ranked by their best match against any seed.

use std::collections::HashSet;

use tracing::debug;

use curio_core::defaults;
use curio_core::{ContentRecord, RecordId};

use crate::tokenize::TokenSets;

/// Jaccard index between two token sets: `|A ∩ B| / |A ∪ B|`.
/// Defined as 0 when either set is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Suggestion sensitivity, selected by the dashboard slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensitivity {
    Strict,
    Balanced,
    Loose,
}

/// Threshold and result cap for one sensitivity band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestionBand {
    pub threshold: f64,
    pub max_suggestions: usize,
}

impl Sensitivity {
    /// Map a 0-100 slider position onto a band: the lower third is
    /// Strict, the middle Balanced, the upper Loose.
    pub fn from_slider(position: u8) -> Self {
        match position {
            0..=33 => Self::Strict,
            34..=66 => Self::Balanced,
            _ => Self::Loose,
        }
    }

    pub fn band(&self) -> SuggestionBand {
        match self {
            Self::Strict => SuggestionBand {
                threshold: defaults::SIMILARITY_STRICT_THRESHOLD,
                max_suggestions: defaults::SIMILARITY_STRICT_MAX,
            },
            Self::Balanced => SuggestionBand {
                threshold: defaults::SIMILARITY_BALANCED_THRESHOLD,
                max_suggestions: defaults::SIMILARITY_BALANCED_MAX,
            },
            Self::Loose => SuggestionBand {
                threshold: defaults::SIMILARITY_LOOSE_THRESHOLD,
                max_suggestions: defaults::SIMILARITY_LOOSE_MAX,
            },
        }
    }
}

/// One suggested record with its best-seed similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub id: RecordId,
    pub score: f64,
}

/// Similarity engine over one snapshot of the record collection.
///
/// Token sets are cached per record id for the engine's lifetime;
/// build a fresh engine after the collection is reloaded.
pub struct SimilarityEngine {
    records: Vec<ContentRecord>,
    tokens: TokenSets,
}

impl SimilarityEngine {
    pub fn new(records: Vec<ContentRecord>) -> Self {
        let tokens = TokenSets::build(&records);
        Self { records, tokens }
    }

    /// Suggest records for `target_category`, seeded by user-chosen
    /// example records.
    ///
    /// Candidates are records neither already carrying the category nor
    /// seeds themselves. Each is scored by its best Jaccard match
    /// against any single seed — a candidate need only resemble one
    /// good example. Results are sorted descending and cut to the
    /// sensitivity band.
    pub fn find_similar(
        &self,
        seed_ids: &[RecordId],
        target_category: &str,
        sensitivity: Sensitivity,
    ) -> Vec<Suggestion> {
        let seeds: Vec<&HashSet<String>> =
            seed_ids.iter().filter_map(|id| self.tokens.get(id)).collect();
        if seeds.is_empty() {
            return Vec::new();
        }

        let band = sensitivity.band();

        let mut suggestions: Vec<Suggestion> = self
            .records
            .iter()
            .filter(|record| !record.has_category(target_category))
            .filter(|record| !seed_ids.contains(&record.id))
            .filter_map(|record| {
                let tokens = self.tokens.get(&record.id)?;
                let score = seeds
                    .iter()
                    .map(|seed| jaccard(tokens, seed))
                    .fold(0.0_f64, f64::max);
                (score >= band.threshold).then(|| Suggestion {
                    id: record.id.clone(),
                    score,
                })
            })
            .collect();

        suggestions.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.id.cmp(&b.id))
        });
        suggestions.truncate(band.max_suggestions);

        debug!(
            seeds = seeds.len(),
            threshold = band.threshold,
            result_count = suggestions.len(),
            "similar-item suggestions computed"
        );

        suggestions
    }
}
