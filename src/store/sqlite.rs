use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use super::{
    CollectionStore, FileUpload, ObjectStorage, SessionProvider, StoreClock, StoreResult,
};
use crate::entity::{stamp_new_row, timestamp, Collection, OrderBy, Row};
use crate::error::{StoreError, UploadError};

const STORE_DB: &str = "store.db";
const OBJECTS_DIR: &str = "objects";

/// Single-file local store. Rows are kept as JSON bodies keyed by
/// collection and id; the store plays the hosted service's role of
/// assigning ids and timestamps.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    objects_dir: Option<PathBuf>,
    user_id: Option<String>,
    clock: StoreClock,
}

impl SqliteStore {
    /// Open or create the store inside a project directory.
    pub fn open(dir: &Path, user_id: Option<String>) -> StoreResult<Self> {
        let conn = Connection::open(dir.join(STORE_DB))?;
        let store = Self {
            conn: Mutex::new(conn),
            objects_dir: Some(dir.join(OBJECTS_DIR)),
            user_id,
            clock: StoreClock::default(),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// A throwaway store without object storage.
    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            objects_dir: None,
            user_id: None,
            clock: StoreClock::default(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn().execute_batch(
            "
            CREATE TABLE IF NOT EXISTS records (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            );

            CREATE INDEX IF NOT EXISTS idx_records_created
                ON records(collection, created_at);
            ",
        )?;
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of rows stored for a collection.
    pub fn count(&self, collection: Collection) -> StoreResult<usize> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1",
            [collection.table()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn parse_body(body: &str) -> StoreResult<Row> {
    serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))
}

fn encode_body(row: &Row) -> StoreResult<String> {
    serde_json::to_string(row).map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl CollectionStore for SqliteStore {
    async fn list(
        &self,
        collection: Collection,
        order: OrderBy,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Row>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT body FROM records WHERE collection = ?1 ORDER BY created_at")?;
        let bodies = stmt
            .query_map([collection.table()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = bodies
            .iter()
            .map(|body| parse_body(body))
            .collect::<StoreResult<Vec<_>>>()?;
        order.sort(&mut rows);
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        debug!(collection = %collection, count = rows.len(), "listed local rows");
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let mut created = Vec::with_capacity(rows.len());
        for mut row in rows {
            let now = self.clock.now();
            let id = Uuid::new_v4().to_string();
            stamp_new_row(&mut row, collection, id.clone(), now);
            tx.execute(
                "INSERT INTO records (collection, id, created_at, body) VALUES (?1, ?2, ?3, ?4)",
                params![collection.table(), id, timestamp(now), encode_body(&row)?],
            )?;
            created.push(row);
        }
        tx.commit()?;
        Ok(created)
    }

    async fn update(&self, collection: Collection, id: &str, patch: Row) -> StoreResult<Row> {
        let conn = self.conn();
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM records WHERE collection = ?1 AND id = ?2",
                params![collection.table(), id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(body) = body else {
            return Err(StoreError::not_found(collection, id));
        };

        let mut row = parse_body(&body)?;
        row.extend(patch);
        row.insert("id".to_string(), id.into());
        if collection.has_updated_at() {
            row.insert("updated_at".to_string(), timestamp(self.clock.now()).into());
        }
        conn.execute(
            "UPDATE records SET body = ?3 WHERE collection = ?1 AND id = ?2",
            params![collection.table(), id, encode_body(&row)?],
        )?;
        Ok(row)
    }

    async fn remove(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let affected = self.conn().execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            params![collection.table(), id],
        )?;
        if affected == 0 {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for SqliteStore {
    async fn upload(&self, path: &str, file: &FileUpload) -> Result<String, UploadError> {
        let fail = |message: String| UploadError {
            path: path.to_string(),
            message,
        };
        let Some(dir) = &self.objects_dir else {
            return Err(fail("object storage is not available".to_string()));
        };
        let target = dir.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| fail(e.to_string()))?;
        }
        fs::write(&target, &file.bytes).map_err(|e| fail(e.to_string()))?;
        Ok(format!("file://{}", target.display()))
    }
}

#[async_trait]
impl SessionProvider for SqliteStore {
    async fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}
