//! Storage seam for shared setting records.
//!
//! The resolver only ever reads and lazily creates records through
//! [`SettingStore`]. Transaction semantics belong to the implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::record::{SeoSetting, SettingRecord};

/// Async repository of setting records keyed by name.
#[async_trait]
pub trait SettingStore: Send + Sync {
    type Record: SettingRecord;

    /// Find a live (not soft-deleted) record by name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Self::Record>, CoreError>;

    /// Find the live record flagged as global.
    async fn find_global(&self) -> Result<Option<Self::Record>, CoreError>;

    /// Insert a new record. Returns [`CoreError::Conflict`] when a live
    /// record with the same name already exists, or when the record is
    /// global and another live global record exists.
    async fn insert(&self, record: &Self::Record) -> Result<Self::Record, CoreError>;

    /// Overwrite an existing live record. Returns `None` if it does not exist.
    /// Flagging it global while another live global exists is a
    /// [`CoreError::Conflict`].
    async fn update(&self, record: &Self::Record) -> Result<Option<Self::Record>, CoreError>;

    /// All live records ordered by name.
    async fn list(&self) -> Result<Vec<Self::Record>, CoreError>;

    /// Mark a record deleted. Returns `true` if a live record was affected.
    async fn soft_delete(&self, name: &str) -> Result<bool, CoreError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local [`SettingStore`] for tests and database-less embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, SeoSetting>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, soft-deleted ones included.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SettingStore for MemoryStore {
    type Record = SeoSetting;

    async fn find_by_name(&self, name: &str) -> Result<Option<SeoSetting>, CoreError> {
        let records = self.records.read().await;
        Ok(records
            .get(name)
            .filter(|r| r.deleted_at.is_none())
            .cloned())
    }

    async fn find_global(&self) -> Result<Option<SeoSetting>, CoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|r| r.is_global_seo && r.deleted_at.is_none())
            .cloned())
    }

    async fn insert(&self, record: &SeoSetting) -> Result<SeoSetting, CoreError> {
        let mut records = self.records.write().await;
        if records
            .get(&record.name)
            .is_some_and(|r| r.deleted_at.is_none())
        {
            return Err(CoreError::Conflict(format!(
                "Setting '{}' already exists",
                record.name
            )));
        }
        if record.is_global_seo && has_other_live_global(&records, &record.name) {
            return Err(global_conflict(&record.name));
        }

        let now = chrono::Utc::now();
        let stored = SeoSetting {
            created_at: Some(now),
            updated_at: Some(now),
            deleted_at: None,
            ..record.clone()
        };
        records.insert(stored.name.clone(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, record: &SeoSetting) -> Result<Option<SeoSetting>, CoreError> {
        let mut records = self.records.write().await;
        if record.is_global_seo && has_other_live_global(&records, &record.name) {
            return Err(global_conflict(&record.name));
        }
        let Some(existing) = records
            .get_mut(&record.name)
            .filter(|r| r.deleted_at.is_none())
        else {
            return Ok(None);
        };

        existing.setting = record.setting.clone();
        existing.is_global_seo = record.is_global_seo;
        existing.updated_at = Some(chrono::Utc::now());
        Ok(Some(existing.clone()))
    }

    async fn list(&self) -> Result<Vec<SeoSetting>, CoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn soft_delete(&self, name: &str) -> Result<bool, CoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(name).filter(|r| r.deleted_at.is_none()) {
            Some(record) => {
                record.deleted_at = Some(chrono::Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Only one live record may carry the global flag.
fn has_other_live_global(records: &BTreeMap<String, SeoSetting>, name: &str) -> bool {
    records
        .values()
        .any(|r| r.is_global_seo && r.deleted_at.is_none() && r.name != name)
}

fn global_conflict(name: &str) -> CoreError {
    CoreError::Conflict(format!(
        "Setting '{name}' cannot be global: a live global setting already exists"
    ))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn insert_then_find() {
        let store = MemoryStore::new();
        let created = store
            .insert(&SeoSetting::provision("CategoryPage", false))
            .await
            .unwrap();
        assert!(created.created_at.is_some());

        let found = store.find_by_name("CategoryPage").await.unwrap().unwrap();
        assert_eq!(found.name, "CategoryPage");
        assert!(store.find_by_name("Missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let store = MemoryStore::new();
        let record = SeoSetting::provision("CategoryPage", false);
        store.insert(&record).await.unwrap();
        assert_matches!(store.insert(&record).await, Err(CoreError::Conflict(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn find_global_uses_flag_not_name() {
        let store = MemoryStore::new();
        store
            .insert(&SeoSetting::provision("Anything", true))
            .await
            .unwrap();
        let global = store.find_global().await.unwrap().unwrap();
        assert_eq!(global.name, "Anything");
    }

    #[tokio::test]
    async fn second_live_global_conflicts() {
        let store = MemoryStore::new();
        store
            .insert(&SeoSetting::provision("GlobalA", true))
            .await
            .unwrap();
        assert_matches!(
            store.insert(&SeoSetting::provision("GlobalB", true)).await,
            Err(CoreError::Conflict(_))
        );
        assert_eq!(store.len().await, 1);
        assert_eq!(store.find_global().await.unwrap().unwrap().name, "GlobalA");

        store.soft_delete("GlobalA").await.unwrap();
        store
            .insert(&SeoSetting::provision("GlobalB", true))
            .await
            .unwrap();
        assert_eq!(store.find_global().await.unwrap().unwrap().name, "GlobalB");
    }

    #[tokio::test]
    async fn update_cannot_promote_second_global() {
        let store = MemoryStore::new();
        store
            .insert(&SeoSetting::provision("GlobalA", true))
            .await
            .unwrap();
        let mut page = store
            .insert(&SeoSetting::provision("CategoryPage", false))
            .await
            .unwrap();

        page.is_global_seo = true;
        assert_matches!(store.update(&page).await, Err(CoreError::Conflict(_)));

        let mut global = store.find_global().await.unwrap().unwrap();
        global.setting.title = "kept global".into();
        let updated = store.update(&global).await.unwrap().unwrap();
        assert!(updated.is_global_seo, "the global record itself stays updatable");
    }

    #[tokio::test]
    async fn update_missing_returns_none() {
        let store = MemoryStore::new();
        let record = SeoSetting::provision("Nope", false);
        assert!(store.update(&record).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn soft_delete_hides_and_allows_reinsert() {
        let store = MemoryStore::new();
        store
            .insert(&SeoSetting::provision("Page", false))
            .await
            .unwrap();

        assert!(store.soft_delete("Page").await.unwrap());
        assert!(!store.soft_delete("Page").await.unwrap(), "second delete is a no-op");
        assert!(store.find_by_name("Page").await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());

        store
            .insert(&SeoSetting::provision("Page", false))
            .await
            .unwrap();
        assert!(store.find_by_name("Page").await.unwrap().is_some());
    }
}
