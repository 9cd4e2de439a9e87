//! Stateful, ordered mirrors of one collection.
//!
//! An [`EntityHook`] owns the in-memory list for its record type and applies
//! each write's result back into it only after the backend (or, in demo
//! mode, the hook itself) has produced the record. Failed operations leave
//! the list untouched and record the failure message.

mod events;

pub use events::{ChangeBus, ChangeEvent, ChangeKind};

use std::sync::{Arc, Weak};

use chrono::Utc;
use tokio::sync::{broadcast::error::RecvError, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::demo::{DataSource, Route};
use crate::entity::{Collection, Patch, Record};
use crate::error::{KarrosError, Result, StoreError};
use crate::store::FileUpload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStatus {
    /// Created, never listed.
    Idle,
    Loading,
    Ready,
}

/// What a consumer renders: the list, whether it is settled, and the last
/// failure.
#[derive(Debug, Clone)]
pub struct HookSnapshot<T> {
    pub items: Arc<Vec<T>>,
    pub status: HookStatus,
    pub error: Option<String>,
}

impl<T> Default for HookSnapshot<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            status: HookStatus::Idle,
            error: None,
        }
    }
}

struct HookInner<T: Record> {
    source: Arc<DataSource>,
    state: watch::Sender<HookSnapshot<T>>,
}

/// Handle to one collection's local mirror. Clones share state.
pub struct EntityHook<T: Record> {
    inner: Arc<HookInner<T>>,
}

impl<T: Record> Clone for EntityHook<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Record> EntityHook<T> {
    pub fn new(source: Arc<DataSource>) -> Self {
        let (state, _) = watch::channel(HookSnapshot::default());
        Self {
            inner: Arc::new(HookInner { source, state }),
        }
    }

    /// A hook with its first list already attempted. A failed list is
    /// recorded in the snapshot, not returned.
    pub async fn load(source: Arc<DataSource>) -> Self {
        let hook = Self::new(source);
        if let Err(e) = hook.refresh().await {
            debug!(collection = %T::COLLECTION, error = %e, "initial load failed");
        }
        hook
    }

    pub fn source(&self) -> &Arc<DataSource> {
        &self.inner.source
    }

    pub fn snapshot(&self) -> HookSnapshot<T> {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<HookSnapshot<T>> {
        self.inner.state.subscribe()
    }

    pub fn items(&self) -> Arc<Vec<T>> {
        self.inner.state.borrow().items.clone()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.inner
            .state
            .borrow()
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    /// True until the first list settles, and during a refresh.
    pub fn loading(&self) -> bool {
        self.inner.state.borrow().status != HookStatus::Ready
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }

    /// Re-list the collection, replacing the items wholesale.
    pub async fn refresh(&self) -> Result<()> {
        self.inner.state.send_modify(|state| {
            state.status = HookStatus::Loading;
            state.error = None;
        });
        let listed = match self.inner.source.route() {
            Ok(Route::Live(adapter)) => adapter.list::<T>().await,
            Ok(Route::Demo(fixtures)) => fixtures.list::<T>(),
            Err(e) => Err(e),
        };
        let items = listed.map_err(|e| self.fail(e))?;
        debug!(collection = %T::COLLECTION, count = items.len(), "refreshed");
        self.inner.state.send_modify(|state| {
            state.items = Arc::new(items);
            state.status = HookStatus::Ready;
        });
        Ok(())
    }

    /// Create a record and merge it into the list once it exists.
    pub async fn create(&self, draft: &T::Draft, file: Option<&FileUpload>) -> Result<T> {
        self.begin();
        let created = match self.inner.source.route() {
            Ok(Route::Live(adapter)) => adapter.insert::<T>(draft, file).await,
            Ok(Route::Demo(_)) => T::materialize(draft, Uuid::new_v4().to_string(), Utc::now()),
            Err(e) => Err(e),
        };
        let record = created.map_err(|e| self.fail(e))?;
        self.upsert(vec![record.clone()]);
        self.publish(ChangeKind::Created, record.id());
        Ok(record)
    }

    /// Create several records in one backend call.
    pub async fn create_many(&self, drafts: &[T::Draft]) -> Result<Vec<T>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }
        self.begin();
        let created = match self.inner.source.route() {
            Ok(Route::Live(adapter)) => adapter.insert_many::<T>(drafts).await,
            Ok(Route::Demo(_)) => {
                let now = Utc::now();
                drafts
                    .iter()
                    .map(|draft| T::materialize(draft, Uuid::new_v4().to_string(), now))
                    .collect()
            }
            Err(e) => Err(e),
        };
        let records = created.map_err(|e| self.fail(e))?;
        self.upsert(records.clone());
        for record in &records {
            self.publish(ChangeKind::Created, record.id());
        }
        Ok(records)
    }

    /// Apply `patch` and replace the cached entry. An empty patch without a
    /// file returns the cached record and makes no call.
    pub async fn update(
        &self,
        id: &str,
        patch: &T::Patch,
        file: Option<&FileUpload>,
    ) -> Result<T> {
        self.begin();
        if patch.is_empty() && file.is_none() {
            return self.cached(id);
        }
        let updated = match self.inner.source.route() {
            Ok(Route::Live(adapter)) => match adapter.update::<T>(id, patch, file).await {
                Ok(Some(record)) => Ok(record),
                Ok(None) => return self.cached(id),
                Err(e) => Err(e),
            },
            Ok(Route::Demo(_)) => match self.get(id) {
                Some(current) => current.apply_patch(patch, Utc::now()),
                None => Err(not_found::<T>(id)),
            },
            Err(e) => Err(e),
        };
        let record = updated.map_err(|e| self.fail(e))?;
        self.upsert(vec![record.clone()]);
        self.publish(ChangeKind::Updated, id);
        Ok(record)
    }

    /// Delete remotely, then drop the cached entry.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.begin();
        let removed = match self.inner.source.route() {
            Ok(Route::Live(adapter)) => adapter.remove::<T>(id).await,
            Ok(Route::Demo(_)) => match self.get(id) {
                Some(_) => Ok(()),
                None => Err(not_found::<T>(id)),
            },
            Err(e) => Err(e),
        };
        removed.map_err(|e| self.fail(e))?;
        self.modify_items(|items| items.retain(|item| item.id() != id));
        self.publish(ChangeKind::Deleted, id);
        Ok(())
    }

    /// Re-list this hook whenever a record of `upstream` is deleted, so
    /// store-side cascades show up. Demo mode has no cascades and is left
    /// alone. The task ends once every handle to this hook is dropped and
    /// the next event arrives.
    pub fn follow(&self, upstream: Collection) -> JoinHandle<()> {
        let mut events = self.inner.source.bus().subscribe();
        let weak: Weak<HookInner<T>> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            loop {
                let resync = match events.recv().await {
                    Ok(event) => event.collection == upstream && event.kind == ChangeKind::Deleted,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "change events lagged; resyncing");
                        true
                    }
                    Err(RecvError::Closed) => break,
                };
                if !resync {
                    continue;
                }
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let hook = EntityHook { inner };
                if hook.source().is_demo() {
                    continue;
                }
                if let Err(e) = hook.refresh().await {
                    warn!(collection = %T::COLLECTION, error = %e, "resync failed");
                }
            }
        })
    }

    fn begin(&self) {
        self.inner
            .state
            .send_if_modified(|state| state.error.take().is_some());
    }

    fn fail(&self, err: KarrosError) -> KarrosError {
        warn!(collection = %T::COLLECTION, error = %err, "operation failed");
        let message = err.to_string();
        self.inner.state.send_modify(|state| {
            state.error = Some(message);
            if state.status == HookStatus::Loading {
                state.status = HookStatus::Ready;
            }
        });
        err
    }

    fn cached(&self, id: &str) -> Result<T> {
        self.get(id).ok_or_else(|| self.fail(not_found::<T>(id)))
    }

    fn modify_items(&self, f: impl FnOnce(&mut Vec<T>)) {
        self.inner.state.send_modify(|state| {
            let mut items = state.items.as_ref().clone();
            f(&mut items);
            state.items = Arc::new(items);
        });
    }

    /// Replace entries with matching ids in place; place new ones where the
    /// collection's ordering puts them. Capped collections keep only what a
    /// list would return.
    fn upsert(&self, records: Vec<T>) {
        let order = T::COLLECTION.order();
        let limit = T::COLLECTION.limit();
        self.modify_items(|items| {
            for record in records {
                if let Some(slot) = items.iter_mut().find(|item| item.id() == record.id()) {
                    *slot = record;
                    continue;
                }
                let at = order.insertion_index(items, &record);
                items.insert(at, record);
            }
            if let Some(limit) = limit {
                items.truncate(limit);
            }
        });
    }

    fn publish(&self, kind: ChangeKind, id: &str) {
        self.inner.source.bus().publish(T::COLLECTION, kind, id);
    }
}

fn not_found<T: Record>(id: &str) -> KarrosError {
    StoreError::not_found(T::COLLECTION, id).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::CollectionAdapter;
    use crate::entity::{
        Clip, MilestoneStatus, NewClip, NewProject, NewProjectMilestone, NewSecret, NewSpark,
        ProjectMilestone, ProjectPatch, ProjectStatus, Secret, StudioProject, StudioSpark,
    };
    use crate::store::{Backend, MemoryStore, Operation};
    use std::time::Duration;

    fn live(store: &Arc<MemoryStore>) -> Arc<DataSource> {
        Arc::new(DataSource::live(CollectionAdapter::new(Backend::from_store(
            store.clone(),
        ))))
    }

    fn project(title: &str) -> NewProject {
        NewProject {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_loading_until_first_list() {
        let store = Arc::new(MemoryStore::new());
        let hook = EntityHook::<StudioProject>::new(live(&store));
        assert!(hook.loading());
        assert_eq!(hook.snapshot().status, HookStatus::Idle);

        hook.refresh().await.unwrap();
        assert!(!hook.loading());
        assert!(hook.items().is_empty());
        assert!(hook.error().is_none());
    }

    #[tokio::test]
    async fn test_create_prepends_in_newest_first_collection() {
        let store = Arc::new(MemoryStore::new());
        let hook = EntityHook::<StudioProject>::load(live(&store)).await;
        hook.create(&project("First"), None).await.unwrap();
        let second = hook.create(&project("Second"), None).await.unwrap();

        let items = hook.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, second.id);
        assert_eq!(items[1].title, "First");
    }

    #[tokio::test]
    async fn test_create_appends_in_oldest_first_collection() {
        let store = Arc::new(MemoryStore::new());
        let hook = EntityHook::<ProjectMilestone>::load(live(&store)).await;
        for title in ["Brief", "Concept"] {
            hook.create(
                &NewProjectMilestone {
                    project_id: "p-1".to_string(),
                    title: title.to_string(),
                    status: MilestoneStatus::Pending,
                    target_date: None,
                },
                None,
            )
            .await
            .unwrap();
        }
        let titles: Vec<_> = hook.items().iter().map(|m| m.title.clone()).collect();
        assert_eq!(titles, vec!["Brief", "Concept"]);
    }

    #[tokio::test]
    async fn test_create_inserts_at_sorted_position() {
        let store = Arc::new(MemoryStore::new());
        let hook = EntityHook::<Secret>::load(live(&store)).await;
        for service in ["Apple", "Netflix", "GitHub"] {
            hook.create(&NewSecret::new(service, "", "pw", ""), None)
                .await
                .unwrap();
        }
        let services: Vec<_> = hook.items().iter().map(|s| s.service.clone()).collect();
        assert_eq!(services, vec!["Apple", "GitHub", "Netflix"]);
    }

    #[tokio::test]
    async fn test_failed_create_leaves_items() {
        let store = Arc::new(MemoryStore::new());
        let hook = EntityHook::<StudioProject>::load(live(&store)).await;
        hook.create(&project("Kept"), None).await.unwrap();
        let before = hook.items();

        store.fail_next(Operation::Insert, "new row violates row-level security policy");
        let err = hook.create(&project("Lost"), None).await.unwrap_err();
        assert!(err.to_string().contains("row-level security"));
        assert!(Arc::ptr_eq(&before, &hook.items()));
        assert!(hook.error().unwrap().contains("row-level security"));
    }

    #[tokio::test]
    async fn test_capped_collection_drops_oldest_on_create() {
        let store = Arc::new(MemoryStore::new());
        let hook = EntityHook::<Clip>::load(live(&store)).await;
        let mut created = Vec::new();
        for n in 0..25 {
            let clip = hook
                .create(&NewClip::text(&format!("clip {n}")), None)
                .await
                .unwrap();
            created.push(clip.id);
        }

        let local: Vec<_> = hook.items().iter().map(|c| c.id.clone()).collect();
        assert_eq!(local.len(), 20);
        assert_eq!(local[0], created[24]);
        assert!(!local.contains(&created[4]));
        assert!(local.contains(&created[5]));

        hook.refresh().await.unwrap();
        let listed: Vec<_> = hook.items().iter().map(|c| c.id.clone()).collect();
        assert_eq!(local, listed);
    }

    #[tokio::test]
    async fn test_empty_update_is_a_no_op() {
        let store = Arc::new(MemoryStore::new());
        let hook = EntityHook::<StudioProject>::load(live(&store)).await;
        let created = hook.create(&project("Pavilion"), None).await.unwrap();
        let calls = store.total_calls();

        let same = hook
            .update(&created.id, &ProjectPatch::default(), None)
            .await
            .unwrap();
        assert_eq!(same, created);
        assert_eq!(store.total_calls(), calls);
    }

    #[tokio::test]
    async fn test_update_replaces_entry_by_id() {
        let store = Arc::new(MemoryStore::new());
        let hook = EntityHook::<StudioProject>::load(live(&store)).await;
        let a = hook.create(&project("A"), None).await.unwrap();
        hook.create(&project("B"), None).await.unwrap();

        let patch = ProjectPatch {
            status: Some(ProjectStatus::Active),
            ..Default::default()
        };
        let updated = hook.update(&a.id, &patch, None).await.unwrap();
        assert_eq!(updated.status, ProjectStatus::Active);

        let items = hook.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id, a.id);
        assert_eq!(items[1].status, ProjectStatus::Active);
    }

    #[tokio::test]
    async fn test_update_unknown_id_fails() {
        let store = Arc::new(MemoryStore::new());
        let hook = EntityHook::<StudioProject>::load(live(&store)).await;
        let patch = ProjectPatch {
            title: Some("Ghost".to_string()),
            ..Default::default()
        };
        let err = hook.update("missing", &patch, None).await.unwrap_err();
        assert!(matches!(
            err,
            KarrosError::Store(StoreError::NotFound { .. })
        ));
        assert!(hook.error().is_some());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_same_items() {
        let store = Arc::new(MemoryStore::new());
        let hook = EntityHook::<StudioProject>::load(live(&store)).await;
        let created = hook.create(&project("Pavilion"), None).await.unwrap();
        let before = hook.items();

        store.fail_next(Operation::Remove, "violates foreign key constraint");
        assert!(hook.delete(&created.id).await.is_err());
        assert!(Arc::ptr_eq(&before, &hook.items()));
        assert!(hook.error().unwrap().contains("foreign key"));

        hook.delete(&created.id).await.unwrap();
        assert!(hook.items().is_empty());
        assert!(hook.error().is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_known_items() {
        let store = Arc::new(MemoryStore::new());
        let hook = EntityHook::<StudioSpark>::load(live(&store)).await;
        hook.create(
            &NewSpark {
                title: "Kinetic facade".to_string(),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

        store.fail_next(Operation::List, "JWT expired");
        assert!(hook.refresh().await.is_err());
        assert_eq!(hook.items().len(), 1);
        assert!(!hook.loading());
        assert_eq!(hook.snapshot().status, HookStatus::Ready);
    }

    #[tokio::test]
    async fn test_demo_writes_stay_local() {
        let store = Arc::new(MemoryStore::new());
        let source = live(&store);
        source.set_demo(true).unwrap();
        let hook = EntityHook::<StudioProject>::load(source).await;
        let fixture_count = hook.items().len();

        let created = hook.create(&project("Offline"), None).await.unwrap();
        assert!(Uuid::parse_str(&created.id).is_ok());
        assert_eq!(hook.items().len(), fixture_count + 1);
        hook.delete(&created.id).await.unwrap();
        assert!(hook.delete(&created.id).await.is_err());
        assert_eq!(store.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_demo_and_live_data_never_mix() {
        let store = Arc::new(MemoryStore::new());
        let source = live(&store);
        let hook = EntityHook::<StudioProject>::load(source.clone()).await;
        let live_project = hook.create(&project("Live only"), None).await.unwrap();

        source.set_demo(true).unwrap();
        hook.refresh().await.unwrap();
        let demo_items = hook.items();
        assert!(!demo_items.is_empty());
        assert!(demo_items.iter().all(|p| p.id != live_project.id));
        assert!(demo_items.iter().all(|p| p.id.starts_with("d-")));

        source.set_demo(false).unwrap();
        hook.refresh().await.unwrap();
        let live_items = hook.items();
        assert_eq!(live_items.len(), 1);
        assert_eq!(live_items[0].id, live_project.id);
    }

    #[tokio::test]
    async fn test_follow_resyncs_after_upstream_delete() {
        let store = Arc::new(MemoryStore::new());
        let source = live(&store);
        let projects = EntityHook::<StudioProject>::load(source.clone()).await;
        let milestones = EntityHook::<ProjectMilestone>::load(source).await;

        let parent = projects.create(&project("Pavilion"), None).await.unwrap();
        let child = milestones
            .create(
                &NewProjectMilestone {
                    project_id: parent.id.clone(),
                    title: "Survey".to_string(),
                    status: MilestoneStatus::Pending,
                    target_date: None,
                },
                None,
            )
            .await
            .unwrap();
        let task = milestones.follow(Collection::Projects);
        let mut rx = milestones.subscribe();

        // the store cascades the delete to the project's milestones
        store.delete_silently(Collection::ProjectMilestones, &child.id);
        projects.delete(&parent.id).await.unwrap();

        tokio::time::timeout(
            Duration::from_secs(2),
            rx.wait_for(|s| s.status == HookStatus::Ready && s.items.is_empty()),
        )
        .await
        .unwrap()
        .unwrap();
        task.abort();
    }
}
