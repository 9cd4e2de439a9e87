//! In-process store used to exercise hooks and adapters without a network.
//!
//! Every call is counted per [`Operation`], and a one-shot failure can be
//! armed for any operation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    CollectionStore, FileUpload, ObjectStorage, SessionProvider, StoreClock, StoreResult,
};
use crate::entity::{stamp_new_row, timestamp, Collection, OrderBy, Row};
use crate::error::{StoreError, UploadError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Insert,
    Update,
    Remove,
    Upload,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Collection, Vec<Row>>>,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<HashMap<Operation, usize>>,
    armed: Mutex<HashMap<Operation, String>>,
    clock: StoreClock,
    user_id: Option<String>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose session reports `user_id`.
    pub fn with_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// Insert rows as-is, bypassing call counting.
    pub fn seed(&self, collection: Collection, rows: Vec<Row>) {
        lock(&self.tables).entry(collection).or_default().extend(rows);
    }

    /// Current rows of a collection in insertion order.
    pub fn rows(&self, collection: Collection) -> Vec<Row> {
        lock(&self.tables)
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove a row without counting a call, as a store-side cascade would.
    pub fn delete_silently(&self, collection: Collection, id: &str) {
        if let Some(rows) = lock(&self.tables).get_mut(&collection) {
            rows.retain(|row| row.get("id").and_then(|v| v.as_str()) != Some(id));
        }
    }

    pub fn calls(&self, op: Operation) -> usize {
        lock(&self.calls).get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    /// Make the next call of `op` fail with `message`.
    pub fn fail_next(&self, op: Operation, message: impl Into<String>) {
        lock(&self.armed).insert(op, message.into());
    }

    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        lock(&self.objects).get(path).cloned()
    }

    fn enter(&self, op: Operation) -> Option<String> {
        *lock(&self.calls).entry(op).or_insert(0) += 1;
        lock(&self.armed).remove(&op)
    }

    fn check(&self, op: Operation) -> StoreResult<()> {
        match self.enter(op) {
            Some(message) => Err(StoreError::Rejected {
                status: 400,
                message,
            }),
            None => Ok(()),
        }
    }
}

fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(|v| v.as_str())
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn list(
        &self,
        collection: Collection,
        order: OrderBy,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Row>> {
        self.check(Operation::List)?;
        let mut rows = self.rows(collection);
        order.sort(&mut rows);
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        self.check(Operation::Insert)?;
        let mut created = Vec::with_capacity(rows.len());
        for mut row in rows {
            let now = self.clock.now();
            stamp_new_row(&mut row, collection, Uuid::new_v4().to_string(), now);
            created.push(row);
        }
        lock(&self.tables)
            .entry(collection)
            .or_default()
            .extend(created.iter().cloned());
        Ok(created)
    }

    async fn update(&self, collection: Collection, id: &str, patch: Row) -> StoreResult<Row> {
        self.check(Operation::Update)?;
        let now = self.clock.now();
        let mut tables = lock(&self.tables);
        let row = tables
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|row| row_id(row) == Some(id)))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        row.extend(patch);
        if collection.has_updated_at() {
            row.insert("updated_at".to_string(), timestamp(now).into());
        }
        Ok(row.clone())
    }

    async fn remove(&self, collection: Collection, id: &str) -> StoreResult<()> {
        self.check(Operation::Remove)?;
        let mut tables = lock(&self.tables);
        let rows = tables.entry(collection).or_default();
        let before = rows.len();
        rows.retain(|row| row_id(row) != Some(id));
        if rows.len() == before {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for MemoryStore {
    async fn upload(&self, path: &str, file: &FileUpload) -> Result<String, UploadError> {
        if let Some(message) = self.enter(Operation::Upload) {
            return Err(UploadError {
                path: path.to_string(),
                message,
            });
        }
        lock(&self.objects).insert(path.to_string(), file.bytes.clone());
        Ok(format!("memory://{}", path))
    }
}

#[async_trait]
impl SessionProvider for MemoryStore {
    async fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_lists_newest_first() {
        let store = MemoryStore::new();
        store
            .insert(Collection::Sparks, vec![row(json!({"title": "first"}))])
            .await
            .unwrap();
        store
            .insert(Collection::Sparks, vec![row(json!({"title": "second"}))])
            .await
            .unwrap();

        let rows = store
            .list(Collection::Sparks, Collection::Sparks.order(), None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["title"], "second");
        assert!(rows[0]["id"].is_string());
        assert!(rows[0]["updated_at"].is_string());
        assert_eq!(store.calls(Operation::Insert), 2);
        assert_eq!(store.calls(Operation::List), 1);
    }

    #[tokio::test]
    async fn test_remove_twice_fails_second_time() {
        let store = MemoryStore::new();
        let created = store
            .insert(Collection::Clipboard, vec![row(json!({"content": "hi"}))])
            .await
            .unwrap();
        let id = created[0]["id"].as_str().unwrap().to_string();

        store.remove(Collection::Clipboard, &id).await.unwrap();
        let err = store.remove(Collection::Clipboard, &id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_armed_failure_fires_once() {
        let store = MemoryStore::new();
        store.fail_next(Operation::List, "permission denied");

        let err = store
            .list(Collection::Goals, Collection::Goals.order(), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("permission denied"));
        assert!(store
            .list(Collection::Goals, Collection::Goals.order(), None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_respects_limit() {
        let store = MemoryStore::new();
        let rows = (0..25).map(|i| row(json!({"content": i.to_string()}))).collect();
        store.insert(Collection::Clipboard, rows).await.unwrap();
        let listed = store
            .list(
                Collection::Clipboard,
                Collection::Clipboard.order(),
                Collection::Clipboard.limit(),
            )
            .await
            .unwrap();
        assert_eq!(listed.len(), 20);
    }
}
