//! Backend seams: collection CRUD, object storage and the session provider.
//!
//! Everything above this module talks to a [`Backend`]; only the
//! implementations here know about HTTP, SQLite or in-process maps.

pub mod memory;
pub mod rest;
pub mod sqlite;

pub use memory::{MemoryStore, Operation};
pub use rest::{RestConfig, RestStore};
pub use sqlite::SqliteStore;

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::entity::{Collection, OrderBy, Row};
use crate::error::{StoreError, UploadError};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Per-table CRUD against the system of record.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Ordered rows. An empty collection is an empty vec, never an error.
    async fn list(
        &self,
        collection: Collection,
        order: OrderBy,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Row>>;

    /// Insert rows; the store fills ids and timestamps and returns the
    /// created rows in input order.
    async fn insert(&self, collection: Collection, rows: Vec<Row>) -> StoreResult<Vec<Row>>;

    /// Apply `patch` to the row with `id` and return the new row state.
    async fn update(&self, collection: Collection, id: &str, patch: Row) -> StoreResult<Row>;

    /// Delete the row with `id`. Unknown ids fail with `NotFound`.
    async fn remove(&self, collection: Collection, id: &str) -> StoreResult<()>;
}

/// Binary object storage returning publicly reachable URLs.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, path: &str, file: &FileUpload) -> Result<String, UploadError>;
}

/// Read-only view of the signed-in user.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_user_id(&self) -> Option<String>;
}

/// A session provider with a fixed (possibly absent) identity.
#[derive(Debug, Clone, Default)]
pub struct StaticSession(pub Option<String>);

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_user_id(&self) -> Option<String> {
        self.0.clone()
    }
}

/// A binary payload attached to a create or update.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing the content type from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Lowercased extension, `bin` when the name has none.
    pub fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Strictly increasing microsecond timestamps for stores that stamp rows
/// themselves, so rows written back to back still order by recency.
#[derive(Debug, Default)]
pub(crate) struct StoreClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl StoreClock {
    pub(crate) fn now(&self) -> DateTime<Utc> {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let mut now = Utc::now().trunc_subsecs(6);
        if let Some(prev) = *last {
            if now <= prev {
                now = prev + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now
    }
}

/// The three collaborators a live data source needs.
#[derive(Clone)]
pub struct Backend {
    pub collections: Arc<dyn CollectionStore>,
    pub objects: Arc<dyn ObjectStorage>,
    pub session: Arc<dyn SessionProvider>,
}

impl Backend {
    pub fn new(
        collections: Arc<dyn CollectionStore>,
        objects: Arc<dyn ObjectStorage>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            collections,
            objects,
            session,
        }
    }

    /// One object serving all three roles.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CollectionStore + ObjectStorage + SessionProvider + 'static,
    {
        Self {
            collections: store.clone(),
            objects: store.clone(),
            session: store,
        }
    }
}
