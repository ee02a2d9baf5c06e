//! Hierarchical category usage counting.
//!
//! Category strings may encode a hierarchy with `/`-delimited path
//! segments. `"Tech/AI/LLM"` contributes one count to each of `"Tech"`,
//! `"Tech/AI"`, and `"Tech/AI/LLM"`. Sibling categories of one record
//! aggregate independently into shared prefixes: a record tagged
//! `["A/B", "A/C"]` contributes 2 to `"A"`.
//!
//! This is a pure function of the record set, recomputed on demand —
//! local single-user collections are small enough that incremental
//! maintenance isn't worth the bookkeeping.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::ContentRecord;

/// One category path and how many times it is used across the record
/// set, ancestors included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUsage {
    pub name: String,
    pub usage_count: usize,
}

/// Compute hierarchical usage counts for every category path and every
/// ancestor prefix. Results are sorted by count descending, then name,
/// so the head of the list is the prompt-context shortlist.
pub fn compute_usage(records: &[ContentRecord]) -> Vec<CategoryUsage> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for record in records {
        for category in &record.categories {
            let mut path = String::new();
            for segment in category.split('/') {
                let segment = segment.trim();
                if segment.is_empty() {
                    continue;
                }
                if path.is_empty() {
                    path.push_str(segment);
                } else {
                    path.push('/');
                    path.push_str(segment);
                }
                *counts.entry(path.clone()).or_insert(0) += 1;
            }
        }
    }

    let mut usage: Vec<CategoryUsage> = counts
        .into_iter()
        .map(|(name, usage_count)| CategoryUsage { name, usage_count })
        .collect();
    usage.sort_by(|a, b| {
        b.usage_count
            .cmp(&a.usage_count)
            .then_with(|| a.name.cmp(&b.name))
    });

    debug!(
        records = records.len(),
        categories = usage.len(),
        "computed category usage index"
    );

    usage
}

/// All distinct category strings in use, sorted. The flat list the
/// dashboard filter sidebar shows; hierarchy is not expanded here.
pub fn distinct_categories(records: &[ContentRecord]) -> Vec<String> {
    let mut names: Vec<String> = records
        .iter()
        .flat_map(|r| r.categories.iter().cloned())
        .collect();
    names.sort();
    names.dedup();
    names
}
