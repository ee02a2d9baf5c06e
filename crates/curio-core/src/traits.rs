//! Core traits for curio abstractions.
//!
//! Persistence in the host is a generic key-value store with whole-
//! collection read-modify-write semantics and no external locking.
//! These traits are the seams this core depends on; concrete backings
//! (extension storage, files, memory) live behind them.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    AiSettings, CategorizationNotice, CategorizationUpdate, ContentRecord, RecordId,
};

// =============================================================================
// RECORD STORE
// =============================================================================

/// Repository for captured content records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a record by id. Missing records are `Ok(None)`, not errors.
    async fn fetch(&self, id: &RecordId) -> Result<Option<ContentRecord>>;

    /// Load the full record collection, newest first.
    async fn list_all(&self) -> Result<Vec<ContentRecord>>;

    /// Insert a record, replacing any existing record with the same id.
    async fn save(&self, record: ContentRecord) -> Result<()>;

    /// Apply a categorization attempt's result to a record.
    async fn apply_categorization(
        &self,
        id: &RecordId,
        update: CategorizationUpdate,
    ) -> Result<()>;

    /// Replace a record's category list (curation/reorg path).
    async fn set_categories(&self, id: &RecordId, categories: Vec<String>) -> Result<()>;
}

// =============================================================================
// QUEUE STORE
// =============================================================================

/// Persisted ordered sequence of record ids awaiting categorization.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Load the pending ids in insertion order.
    async fn load(&self) -> Result<Vec<RecordId>>;

    /// Append an id unless already queued. Returns whether it was added.
    async fn push_unique(&self, id: &RecordId) -> Result<bool>;

    /// Remove the given ids from the queue.
    async fn remove(&self, ids: &[RecordId]) -> Result<()>;
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Supplies the AI-related settings slice on demand. Reloaded at the
/// start of every drain cycle so credential changes take effect without
/// a restart.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn load(&self) -> Result<AiSettings>;
}

// =============================================================================
// OUTCOME NOTIFICATIONS
// =============================================================================

/// Fire-and-forget channel informing a record's origin context of its
/// categorization outcome. Delivery is best-effort: implementations log
/// failures and never retry or propagate them.
#[async_trait]
pub trait OutcomeNotifier: Send + Sync {
    async fn notify(&self, record: &ContentRecord, notice: CategorizationNotice);
}

/// No-op notifier for hosts without a notification surface.
pub struct NoOpNotifier;

#[async_trait]
impl OutcomeNotifier for NoOpNotifier {
    async fn notify(&self, _record: &ContentRecord, _notice: CategorizationNotice) {}
}

// =============================================================================
// USER CATEGORIES
// =============================================================================

/// Repository for the user-defined category list.
#[async_trait]
pub trait UserCategoryStore: Send + Sync {
    /// List user-defined categories in insertion order.
    async fn list(&self) -> Result<Vec<String>>;

    /// Add a category. Returns `false` if the name already exists.
    async fn add(&self, name: &str) -> Result<bool>;

    /// Rename a category. Returns `false` if `old` is missing or `new`
    /// already exists.
    async fn rename(&self, old: &str, new: &str) -> Result<bool>;

    /// Remove a category. Returns `false` if it was not present.
    async fn remove(&self, name: &str) -> Result<bool>;
}
