//! In-memory store with key-value snapshot semantics.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use curio_core::models::{AiSettings, CategorizationUpdate, ContentRecord, RecordId};
use curio_core::traits::{QueueStore, RecordStore, SettingsProvider, UserCategoryStore};
use curio_core::{Error, Result};

#[derive(Default)]
struct StoreState {
    /// Records newest-first, matching the host's collection ordering.
    records: Vec<ContentRecord>,
    /// Pending categorization queue, insertion order, no duplicates.
    queue: Vec<RecordId>,
    settings: AiSettings,
    user_categories: Vec<String>,
    /// Ids whose next write fails. Test hook for partial-failure paths.
    fail_updates_for: HashSet<RecordId>,
}

/// In-memory store implementing every curio storage trait.
///
/// All mutation follows the whole-collection read-modify-write pattern
/// the key-value contract prescribes; a single `RwLock` stands in for
/// the store's snapshot isolation.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records.
    pub fn seeded(records: Vec<ContentRecord>) -> Self {
        Self {
            state: RwLock::new(StoreState {
                records,
                ..Default::default()
            }),
        }
    }

    pub async fn set_settings(&self, settings: AiSettings) {
        self.state.write().await.settings = settings;
    }

    pub async fn queue_snapshot(&self) -> Vec<RecordId> {
        self.state.read().await.queue.clone()
    }

    /// Make every subsequent write to `id` fail with a storage error.
    /// Used by tests exercising partial-failure aggregation.
    pub async fn fail_updates_for(&self, id: &RecordId) {
        self.state.write().await.fail_updates_for.insert(id.clone());
    }

    pub async fn clear_injected_failures(&self) {
        self.state.write().await.fail_updates_for.clear();
    }

    fn check_writable(state: &StoreState, id: &RecordId) -> Result<()> {
        if state.fail_updates_for.contains(id) {
            return Err(Error::Storage(format!("injected write failure: {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch(&self, id: &RecordId) -> Result<Option<ContentRecord>> {
        let state = self.state.read().await;
        Ok(state.records.iter().find(|r| &r.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<ContentRecord>> {
        Ok(self.state.read().await.records.clone())
    }

    async fn save(&self, record: ContentRecord) -> Result<()> {
        let mut state = self.state.write().await;
        Self::check_writable(&state, &record.id)?;
        if let Some(existing) = state.records.iter_mut().find(|r| r.id == record.id) {
            *existing = record;
        } else {
            // Newest first, as the host collection is ordered.
            state.records.insert(0, record);
        }
        Ok(())
    }

    async fn apply_categorization(
        &self,
        id: &RecordId,
        update: CategorizationUpdate,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        Self::check_writable(&state, id)?;
        let record = state
            .records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| Error::Storage(format!("record not found: {}", id)))?;
        if let Some(categories) = update.categories {
            record.categories = categories;
        }
        record.ai_processed = update.ai_processed;
        record.ai_failure_reason = update.ai_failure_reason;
        debug!(record_id = %id, ai_processed = record.ai_processed, "record categorization updated");
        Ok(())
    }

    async fn set_categories(&self, id: &RecordId, categories: Vec<String>) -> Result<()> {
        let mut state = self.state.write().await;
        Self::check_writable(&state, id)?;
        let record = state
            .records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| Error::Storage(format!("record not found: {}", id)))?;
        record.categories = categories;
        Ok(())
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn load(&self) -> Result<Vec<RecordId>> {
        Ok(self.state.read().await.queue.clone())
    }

    async fn push_unique(&self, id: &RecordId) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.queue.contains(id) {
            return Ok(false);
        }
        state.queue.push(id.clone());
        debug!(record_id = %id, queue_len = state.queue.len(), "queued for categorization");
        Ok(true)
    }

    async fn remove(&self, ids: &[RecordId]) -> Result<()> {
        let mut state = self.state.write().await;
        state.queue.retain(|id| !ids.contains(id));
        Ok(())
    }
}

#[async_trait]
impl SettingsProvider for MemoryStore {
    async fn load(&self) -> Result<AiSettings> {
        Ok(self.state.read().await.settings.clone())
    }
}

#[async_trait]
impl UserCategoryStore for MemoryStore {
    async fn list(&self) -> Result<Vec<String>> {
        Ok(self.state.read().await.user_categories.clone())
    }

    async fn add(&self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        let mut state = self.state.write().await;
        if state.user_categories.iter().any(|c| c == name) {
            return Ok(false);
        }
        state.user_categories.push(name.to_string());
        Ok(true)
    }

    async fn rename(&self, old: &str, new: &str) -> Result<bool> {
        let new = new.trim();
        if new.is_empty() {
            return Ok(false);
        }
        let mut state = self.state.write().await;
        if state.user_categories.iter().any(|c| c == new) {
            return Ok(false);
        }
        match state.user_categories.iter_mut().find(|c| *c == old) {
            Some(slot) => {
                *slot = new.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.user_categories.len();
        state.user_categories.retain(|c| c != name);
        Ok(state.user_categories.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curio_core::models::{InteractionType, Platform};

    fn record(id: &str) -> ContentRecord {
        ContentRecord::new(id, Platform::Instagram, InteractionType::Save, "some post")
    }

    #[tokio::test]
    async fn test_save_and_fetch() {
        let store = MemoryStore::new();
        store.save(record("a")).await.unwrap();

        let fetched = store.fetch(&RecordId::from("a")).await.unwrap();
        assert!(fetched.is_some());
        assert!(store.fetch(&RecordId::from("zzz")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_newest_first_and_replaces_by_id() {
        let store = MemoryStore::new();
        store.save(record("a")).await.unwrap();
        store.save(record("b")).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all[0].id, RecordId::from("b"));
        assert_eq!(all[1].id, RecordId::from("a"));

        let mut replacement = record("a");
        replacement.text = "edited".to_string();
        store.save(replacement).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].text, "edited");
    }

    #[tokio::test]
    async fn test_apply_categorization_completed() {
        let store = MemoryStore::new();
        store.save(record("a")).await.unwrap();

        let outcome =
            curio_core::CategorizationOutcome::success(vec!["Tech".to_string()]);
        store
            .apply_categorization(
                &RecordId::from("a"),
                CategorizationUpdate::completed(&outcome),
            )
            .await
            .unwrap();

        let r = store.fetch(&RecordId::from("a")).await.unwrap().unwrap();
        assert_eq!(r.categories, vec!["Tech".to_string()]);
        assert!(r.ai_processed);
        assert!(r.ai_failure_reason.is_none());
    }

    #[tokio::test]
    async fn test_apply_categorization_failed_keeps_categories() {
        let store = MemoryStore::new();
        store
            .save(record("a").with_categories(vec!["Old".to_string()]))
            .await
            .unwrap();

        store
            .apply_categorization(
                &RecordId::from("a"),
                CategorizationUpdate::failed("boom"),
            )
            .await
            .unwrap();

        let r = store.fetch(&RecordId::from("a")).await.unwrap().unwrap();
        assert_eq!(r.categories, vec!["Old".to_string()]);
        assert!(!r.ai_processed);
        assert_eq!(r.ai_failure_reason.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_apply_categorization_missing_record() {
        let store = MemoryStore::new();
        let err = store
            .apply_categorization(&RecordId::from("nope"), CategorizationUpdate::failed("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_queue_dedup_and_removal() {
        let store = MemoryStore::new();
        assert!(store.push_unique(&RecordId::from("a")).await.unwrap());
        assert!(!store.push_unique(&RecordId::from("a")).await.unwrap());
        assert!(store.push_unique(&RecordId::from("b")).await.unwrap());

        assert_eq!(QueueStore::load(&store).await.unwrap().len(), 2);

        QueueStore::remove(&store, &[RecordId::from("a")])
            .await
            .unwrap();
        assert_eq!(
            QueueStore::load(&store).await.unwrap(),
            vec![RecordId::from("b")]
        );
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let store = MemoryStore::new();
        store.save(record("a")).await.unwrap();
        store.fail_updates_for(&RecordId::from("a")).await;

        let err = store
            .set_categories(&RecordId::from("a"), vec!["X".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));

        store.clear_injected_failures().await;
        store
            .set_categories(&RecordId::from("a"), vec!["X".to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_user_categories_crud() {
        let store = MemoryStore::new();
        assert!(store.add("Reading").await.unwrap());
        assert!(!store.add("Reading").await.unwrap());
        assert!(!store.add("  ").await.unwrap());

        assert!(store.rename("Reading", "Books").await.unwrap());
        assert!(!store.rename("Reading", "Books").await.unwrap());
        assert!(!store.rename("Books", "Books").await.unwrap());

        assert_eq!(
            UserCategoryStore::list(&store).await.unwrap(),
            vec!["Books".to_string()]
        );

        assert!(UserCategoryStore::remove(&store, "Books").await.unwrap());
        assert!(!UserCategoryStore::remove(&store, "Books").await.unwrap());
    }

    #[tokio::test]
    async fn test_settings_roundtrip() {
        let store = MemoryStore::new();
        store
            .set_settings(AiSettings::default().with_openai_key("sk-test"))
            .await;
        let settings = SettingsProvider::load(&store).await.unwrap();
        assert_eq!(settings.openai_api_key.as_deref(), Some("sk-test"));
    }
}
