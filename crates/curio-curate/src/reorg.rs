//! Category reorganization: provider-suggested mappings and the bulk
//! best-effort apply step.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use curio_core::traits::{RecordStore, SettingsProvider};
use curio_core::usage::compute_usage;
use curio_core::{RecordId, ReorgAction, ReorgMapping, ReorgRequest, ReorgSuggestions, Result};
use curio_inference::{Classifier, ProviderEndpoints, RateLimiter};

/// Aggregate result of a bulk mapping apply.
///
/// The apply is best-effort: already-persisted records stay renamed even
/// when later records fail, and in-memory state is not rolled back.
/// When `needs_resync()` is true the caller should reload the record
/// collection to reconcile with persisted truth.
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    /// Records successfully rewritten and persisted.
    pub updated: usize,
    /// Records whose persistence failed.
    pub failed: Vec<RecordId>,
    /// Error strings matching `failed`, for the user-facing summary.
    pub errors: Vec<String>,
}

impl ApplyReport {
    pub fn needs_resync(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Taxonomy cleanup engine for the dashboard.
pub struct ReorgEngine {
    records: Arc<dyn RecordStore>,
    settings: Arc<dyn SettingsProvider>,
    endpoints: ProviderEndpoints,
    limiter: Arc<RateLimiter>,
}

impl ReorgEngine {
    pub fn new(records: Arc<dyn RecordStore>, settings: Arc<dyn SettingsProvider>) -> Self {
        Self {
            records,
            settings,
            endpoints: ProviderEndpoints::from_env(),
            limiter: Arc::new(RateLimiter::with_defaults()),
        }
    }

    pub fn with_endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Share the classification rate limiter so reorg calls and queue
    /// drains draw from the same budget.
    pub fn with_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Ask the provider chain for merge/rename/split mappings over a
    /// user-selected category subset, contextualized with the current
    /// usage counts.
    ///
    /// Returns the raw, schema-validated proposal for user review;
    /// nothing is mutated here. Malformed entries survive into the
    /// proposal and are filtered by [`ReorgEngine::apply_mappings`].
    pub async fn suggest(
        &self,
        action: ReorgAction,
        categories: Vec<String>,
        goal: Option<String>,
    ) -> Result<ReorgSuggestions> {
        let records = self.records.list_all().await?;
        let usage = compute_usage(&records);

        let settings = self.settings.load().await?;
        let classifier = Classifier::from_settings(&settings, &self.endpoints, self.limiter.clone())?;

        let request = ReorgRequest {
            action,
            categories,
            usage,
            goal,
        };
        classifier.suggest_reorg(&request).await
    }

    /// Apply approved mappings across the whole record collection.
    ///
    /// Every record whose category list carries a `from` name has those
    /// entries rewritten to `to` and the result de-duplicated (first
    /// occurrence wins, order preserved). Per-record persistence
    /// failures are collected, not propagated — partial application is
    /// an accepted outcome reported through [`ApplyReport`].
    pub async fn apply_mappings(&self, mappings: &[ReorgMapping]) -> Result<ApplyReport> {
        let rename: HashMap<&str, &str> = mappings
            .iter()
            .filter(|m| m.is_applicable())
            .map(|m| (m.from.as_str(), m.to.as_str()))
            .collect();

        let mut report = ApplyReport::default();
        if rename.is_empty() {
            return Ok(report);
        }

        let records = self.records.list_all().await?;
        for record in &records {
            if !record
                .categories
                .iter()
                .any(|c| rename.contains_key(c.as_str()))
            {
                continue;
            }

            let mut rewritten: Vec<String> = Vec::with_capacity(record.categories.len());
            for category in &record.categories {
                let name = rename
                    .get(category.as_str())
                    .map(|to| to.to_string())
                    .unwrap_or_else(|| category.clone());
                if !rewritten.contains(&name) {
                    rewritten.push(name);
                }
            }

            match self.records.set_categories(&record.id, rewritten).await {
                Ok(()) => report.updated += 1,
                Err(e) => {
                    warn!(record_id = %record.id, error = %e, "failed to persist category rename");
                    report.errors.push(e.to_string());
                    report.failed.push(record.id.clone());
                }
            }
        }

        info!(
            mappings = rename.len(),
            updated = report.updated,
            failed = report.failed.len(),
            "applied category mappings"
        );

        Ok(report)
    }
}
