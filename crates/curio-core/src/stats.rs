//! Derived statistics over the record collection.
//!
//! Like the usage index, a pure on-demand derivation — nothing here is
//! stored or incrementally maintained.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ContentRecord, InteractionType, Platform};

/// Aggregate counts over the record set. Day boundaries are UTC.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordStats {
    pub total: usize,
    /// Records captured since UTC midnight of `now`.
    pub today: usize,
    /// Records captured in the trailing 7 days.
    pub this_week: usize,
    pub by_platform: HashMap<Platform, usize>,
    pub by_interaction: HashMap<InteractionType, usize>,
    /// Records still awaiting a categorization attempt.
    pub awaiting_categorization: usize,
}

impl RecordStats {
    /// Compute statistics as of `now`. Injected rather than read from
    /// the clock so callers and tests share one notion of time.
    pub fn compute(records: &[ContentRecord], now: DateTime<Utc>) -> Self {
        let day_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or(now);
        let week_ago = now - Duration::days(7);

        let mut stats = RecordStats {
            total: records.len(),
            ..Default::default()
        };

        for record in records {
            if record.captured_at >= day_start {
                stats.today += 1;
            }
            if record.captured_at >= week_ago {
                stats.this_week += 1;
            }
            *stats.by_platform.entry(record.platform).or_insert(0) += 1;
            *stats
                .by_interaction
                .entry(record.interaction_type)
                .or_insert(0) += 1;
            if !record.ai_processed {
                stats.awaiting_categorization += 1;
            }
        }

        stats
    }
}
