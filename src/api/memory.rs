//! Implements the `ObjectStore` trait with in-memory data for test mode.
//!
//! Note: this is compiled even in the "production" version of this app so
//! that the whole flow can be run top-to-bottom without touching the Google
//! APIs.

use crate::api::{AmbiguousMatch, ObjectKind, ObjectStore};
use crate::Result;
use anyhow::{bail, Context};
use std::collections::BTreeMap;

/// An `ObjectStore` backed by a map. By default it is seeded with the payee
/// filters a populated drive folder would hold.
pub(crate) struct MemoryStore {
    objects: BTreeMap<String, StoredObject>,
    next_id: u64,
}

#[derive(Debug, Clone)]
struct StoredObject {
    name: String,
    kind: ObjectKind,
    content: String,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// A store seeded with remote payee filter data.
    pub(crate) fn seeded() -> Self {
        let mut store = Self::new();
        store.insert("payeeFilters.json", ObjectKind::File, REMOTE_FILTER_DATA);
        store
    }

    fn insert(&mut self, name: &str, kind: ObjectKind, content: &str) -> String {
        let id = format!("mem-{:04}", self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id.clone(),
            StoredObject {
                name: name.to_string(),
                kind,
                content: content.to_string(),
            },
        );
        id
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    async fn search(&mut self, name: &str, kind: ObjectKind) -> Result<Option<String>> {
        let mut ids = self
            .objects
            .iter()
            .filter(|(_, object)| object.name == name && object.kind == kind)
            .map(|(id, _)| id.clone());
        match (ids.next(), ids.next()) {
            (None, _) => Ok(None),
            (Some(id), None) => Ok(Some(id)),
            (Some(_), Some(_)) => bail!(AmbiguousMatch {
                name: name.to_string(),
                kind,
            }),
        }
    }

    async fn create_folder(&mut self, name: &str) -> Result<String> {
        Ok(self.insert(name, ObjectKind::Folder, ""))
    }

    async fn create_file(&mut self, name: &str, _parent_id: &str, content: &str) -> Result<String> {
        Ok(self.insert(name, ObjectKind::File, content))
    }

    async fn read_file(&mut self, id: &str) -> Result<String> {
        self.objects
            .get(id)
            .map(|object| object.content.clone())
            .with_context(|| format!("No object with id '{id}' in the store"))
    }

    async fn update_file(&mut self, id: &str, content: &str) -> Result<()> {
        let object = self
            .objects
            .get_mut(id)
            .with_context(|| format!("No object with id '{id}' in the store"))?;
        object.content = content.to_string();
        Ok(())
    }
}

/// Seed payee filter data.
const REMOTE_FILTER_DATA: &str = r#"[
  {"payeeName": "ICA", "alias": "Groceries"},
  {"payeeName": "SL", "alias": "Transit"},
  {"payeeName": "HYRA", "alias": "Rent"},
  {"payeeName": "COMHEM", "alias": "Internet"}
]"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_missing_object_returns_none() {
        let mut store = MemoryStore::new();
        let found = store.search("transactions.json", ObjectKind::File).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_create_read_update_round_trip() {
        let mut store = MemoryStore::new();
        let folder_id = store.create_folder("EconoStats").await.unwrap();
        let file_id = store
            .create_file("transactions.json", &folder_id, "[]")
            .await
            .unwrap();

        assert_eq!(store.read_file(&file_id).await.unwrap(), "[]");

        store.update_file(&file_id, "[1]").await.unwrap();
        assert_eq!(store.read_file(&file_id).await.unwrap(), "[1]");

        let found = store.search("transactions.json", ObjectKind::File).await.unwrap();
        assert_eq!(found, Some(file_id));
    }

    #[tokio::test]
    async fn test_search_distinguishes_kinds() {
        let mut store = MemoryStore::new();
        store.create_folder("EconoStats").await.unwrap();
        let found = store.search("EconoStats", ObjectKind::File).await.unwrap();
        assert!(found.is_none());
        let found = store.search("EconoStats", ObjectKind::Folder).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_names_are_an_ambiguous_match() {
        let mut store = MemoryStore::new();
        let folder_id = store.create_folder("EconoStats").await.unwrap();
        store.create_file("transactions.json", &folder_id, "[]").await.unwrap();
        store.create_file("transactions.json", &folder_id, "[]").await.unwrap();

        let error = store
            .search("transactions.json", ObjectKind::File)
            .await
            .unwrap_err();
        let ambiguous = error.downcast_ref::<AmbiguousMatch>().unwrap();
        assert_eq!(ambiguous.name, "transactions.json");
        assert_eq!(ambiguous.kind, ObjectKind::File);
    }

    #[tokio::test]
    async fn test_seeded_store_holds_remote_filters() {
        let mut store = MemoryStore::seeded();
        let id = store
            .search("payeeFilters.json", ObjectKind::File)
            .await
            .unwrap()
            .unwrap();
        let content = store.read_file(&id).await.unwrap();
        assert!(content.contains("Groceries"));
    }
}
