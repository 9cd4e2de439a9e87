//! The only layer that talks to a backend: typed CRUD per record type plus
//! the upload step for file-bearing records.

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entity::{from_row, to_row, Patch, Record, Row};
use crate::error::{Result, StoreError};
use crate::store::{Backend, FileUpload};

/// Placeholder owner for writes made without a session.
pub const ANONYMOUS_USER: &str = "anonymous";

#[derive(Clone)]
pub struct CollectionAdapter {
    backend: Backend,
}

impl CollectionAdapter {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Ordered records of `T`'s collection.
    pub async fn list<T: Record>(&self) -> Result<Vec<T>> {
        let collection = T::COLLECTION;
        let rows = self
            .backend
            .collections
            .list(collection, collection.order(), collection.limit())
            .await?;
        rows.into_iter().map(from_row).collect()
    }

    /// Insert one record, uploading `file` first when given.
    pub async fn insert<T: Record>(&self, draft: &T::Draft, file: Option<&FileUpload>) -> Result<T> {
        let mut row = to_row(draft)?;
        let user_id = self.scope_row::<T>(&mut row).await;
        if let Some(file) = file {
            self.attach_upload::<T>(&mut row, file, user_id.as_deref()).await;
        }
        let created = self
            .backend
            .collections
            .insert(T::COLLECTION, vec![row])
            .await?;
        match created.into_iter().next() {
            Some(row) => from_row(row),
            None => Err(StoreError::Decode(format!(
                "insert into {} returned no row",
                T::COLLECTION
            ))
            .into()),
        }
    }

    /// Insert several records in one call; results come back in input order.
    pub async fn insert_many<T: Record>(&self, drafts: &[T::Draft]) -> Result<Vec<T>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }
        let mut rows = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let mut row = to_row(draft)?;
            self.scope_row::<T>(&mut row).await;
            rows.push(row);
        }
        let created = self.backend.collections.insert(T::COLLECTION, rows).await?;
        created.into_iter().map(from_row).collect()
    }

    /// Apply `patch` remotely. An empty patch with no file makes no call and
    /// yields `None`.
    pub async fn update<T: Record>(
        &self,
        id: &str,
        patch: &T::Patch,
        file: Option<&FileUpload>,
    ) -> Result<Option<T>> {
        let mut row = patch.to_row()?;
        if let Some(file) = file {
            let user_id = self.backend.session.current_user_id().await;
            self.attach_upload::<T>(&mut row, file, user_id.as_deref()).await;
        }
        if row.is_empty() {
            debug!(collection = %T::COLLECTION, id, "skipping empty update");
            return Ok(None);
        }
        let updated = self
            .backend
            .collections
            .update(T::COLLECTION, id, row)
            .await?;
        from_row(updated).map(Some)
    }

    pub async fn remove<T: Record>(&self, id: &str) -> Result<()> {
        self.backend.collections.remove(T::COLLECTION, id).await?;
        Ok(())
    }

    /// Tag user-scoped rows with the session's user. Returns the session
    /// user, if any.
    async fn scope_row<T: Record>(&self, row: &mut Row) -> Option<String> {
        let user_id = self.backend.session.current_user_id().await;
        if T::USER_SCOPED {
            let owner = user_id.clone().unwrap_or_else(|| ANONYMOUS_USER.to_string());
            row.insert("user_id".to_string(), Value::String(owner));
        }
        user_id
    }

    /// Upload `file` and point the record's file field at it. On failure the
    /// field keeps whatever URL the caller supplied.
    async fn attach_upload<T: Record>(
        &self,
        row: &mut Row,
        file: &FileUpload,
        user_id: Option<&str>,
    ) {
        let Some(field) = T::FILE_FIELD else {
            warn!(collection = %T::COLLECTION, "collection has no file field; ignoring upload");
            return;
        };
        let path = upload_path(T::COLLECTION.short_name(), user_id, &file.extension());
        match self.backend.objects.upload(&path, file).await {
            Ok(url) => {
                row.insert(field.to_string(), Value::String(url));
            }
            Err(e) => {
                warn!(error = %e, field, "upload failed; keeping supplied URL");
            }
        }
    }
}

/// `<prefix>/<user or random>/<random>.<ext>`
pub fn upload_path(prefix: &str, user_id: Option<&str>, extension: &str) -> String {
    let scope = match user_id {
        Some(user) => user.to_string(),
        None => Uuid::new_v4().to_string(),
    };
    format!("{}/{}/{}.{}", prefix, scope, Uuid::new_v4(), extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Clip, Goal, NewClip, NewGoal, NewProject, ProjectPatch, StudioProject};
    use crate::store::{MemoryStore, Operation};
    use std::sync::Arc;

    fn adapter(store: &Arc<MemoryStore>) -> CollectionAdapter {
        CollectionAdapter::new(Backend::from_store(store.clone()))
    }

    #[tokio::test]
    async fn test_empty_update_makes_no_call() {
        let store = Arc::new(MemoryStore::new());
        let adapter = adapter(&store);
        let result = adapter
            .update::<StudioProject>("p-1", &ProjectPatch::default(), None)
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(store.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_goal_insert_is_tagged_with_session_user() {
        let store = Arc::new(MemoryStore::with_user("u-42"));
        let goal: Goal = adapter(&store)
            .insert(
                &NewGoal {
                    title: "Learn Spanish".to_string(),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(goal.user_id.as_deref(), Some("u-42"));
    }

    #[tokio::test]
    async fn test_goal_insert_without_session_is_anonymous() {
        let store = Arc::new(MemoryStore::new());
        let goal: Goal = adapter(&store)
            .insert(
                &NewGoal {
                    title: "Learn Spanish".to_string(),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(goal.user_id.as_deref(), Some(ANONYMOUS_USER));
    }

    #[tokio::test]
    async fn test_upload_replaces_url_field() {
        let store = Arc::new(MemoryStore::with_user("u-1"));
        let draft = NewProject {
            title: "Pavilion".to_string(),
            cover_url: Some("https://elsewhere/cover.jpg".to_string()),
            ..Default::default()
        };
        let file = FileUpload::new("cover.png", "image/png", vec![1, 2]);
        let project: StudioProject = adapter(&store).insert(&draft, Some(&file)).await.unwrap();

        let url = project.cover_url.unwrap();
        assert!(url.starts_with("memory://projects/u-1/"));
        assert!(url.ends_with(".png"));
        let path = url.trim_start_matches("memory://");
        assert_eq!(store.object(path), Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn test_upload_failure_keeps_supplied_url() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next(Operation::Upload, "bucket full");
        let draft = NewProject {
            title: "Pavilion".to_string(),
            cover_url: Some("https://elsewhere/cover.jpg".to_string()),
            ..Default::default()
        };
        let file = FileUpload::new("cover.png", "image/png", vec![1]);
        let project: StudioProject = adapter(&store).insert(&draft, Some(&file)).await.unwrap();
        assert_eq!(project.cover_url.as_deref(), Some("https://elsewhere/cover.jpg"));
        assert_eq!(store.calls(Operation::Insert), 1);
    }

    #[tokio::test]
    async fn test_update_with_only_a_file_still_writes() {
        let store = Arc::new(MemoryStore::new());
        let adapter = adapter(&store);
        let clip: Clip = adapter.insert(&NewClip::text("hello"), None).await.unwrap();
        let file = FileUpload::new("shot.jpg", "image/jpeg", vec![7]);
        let updated = adapter
            .update::<Clip>(&clip.id, &Default::default(), Some(&file))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.image_url.unwrap().starts_with("memory://clipboard/"));
    }

    #[test]
    fn test_upload_path_shape() {
        let path = upload_path("goals", Some("u-9"), "jpg");
        let parts: Vec<_> = path.split('/').collect();
        assert_eq!(parts[0], "goals");
        assert_eq!(parts[1], "u-9");
        assert!(parts[2].ends_with(".jpg"));

        let anonymous = upload_path("goals", None, "png");
        assert_ne!(anonymous.split('/').nth(1), Some("u-9"));
    }
}
