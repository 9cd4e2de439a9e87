//! Hosted backend speaking the PostgREST / storage / auth REST dialect.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{CollectionStore, FileUpload, ObjectStorage, SessionProvider, StoreResult};
use crate::entity::{Collection, OrderBy, Row};
use crate::error::{StoreError, UploadError};

const DEFAULT_BUCKET: &str = "karros";

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    pub url: String,
    pub anon_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub bucket: String,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl RestConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            access_token: None,
            bucket: default_bucket(),
        }
    }

    fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn table_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base(), collection.table())
    }

    pub fn upload_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base(), self.bucket, path)
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base(),
            self.bucket,
            path
        )
    }

    pub fn user_url(&self) -> String {
        format!("{}/auth/v1/user", self.base())
    }

    /// Token sent as the bearer: the user's session when present,
    /// otherwise the public key.
    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }
}

/// Query pairs for a list request.
pub fn list_query(order: OrderBy, limit: Option<usize>) -> Vec<(&'static str, String)> {
    let direction = if order.ascending { "asc" } else { "desc" };
    let mut query = vec![
        ("select", "*".to_string()),
        ("order", format!("{}.{}", order.column, direction)),
    ];
    if let Some(limit) = limit {
        query.push(("limit", limit.to_string()));
    }
    query
}

fn id_filter(id: &str) -> [(&'static str, String); 1] {
    [("id", format!("eq.{}", id))]
}

/// Map a non-success response to a store error, keeping the service's own
/// message when the body carries one.
pub fn status_error(status: u16, body: &str) -> StoreError {
    let message = error_message(body).unwrap_or_else(|| {
        StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("request failed")
            .to_string()
    });
    match status {
        401 | 403 => StoreError::Unauthorized(message),
        _ => StoreError::Rejected { status, message },
    }
}

fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.to_string());
    };
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
        .or_else(|| Some(trimmed.to_string()))
}

fn map_reqwest_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Transport("request timed out".to_string())
    } else {
        StoreError::Transport(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct SessionUser {
    id: String,
}

/// REST client for one project on the hosted service.
#[derive(Debug, Clone)]
pub struct RestStore {
    http: Client,
    config: RestConfig,
}

impl RestStore {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(config: RestConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("karros/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.config.bearer())
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let res = self
            .authorized(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        let err = status_error(status.as_u16(), &body);
        warn!(status = status.as_u16(), error = %err, "store request failed");
        Err(err)
    }

    async fn rows(&self, request: RequestBuilder) -> StoreResult<Vec<Row>> {
        self.send(request)
            .await?
            .json::<Vec<Row>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CollectionStore for RestStore {
    async fn list(
        &self,
        collection: Collection,
        order: OrderBy,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Row>> {
        let request = self
            .http
            .get(self.config.table_url(collection))
            .query(&list_query(order, limit));
        let rows = self.rows(request).await?;
        debug!(collection = %collection, count = rows.len(), "listed remote rows");
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        let request = self
            .http
            .post(self.config.table_url(collection))
            .header("Prefer", "return=representation")
            .json(&rows);
        self.rows(request).await
    }

    async fn update(&self, collection: Collection, id: &str, patch: Row) -> StoreResult<Row> {
        let request = self
            .http
            .patch(self.config.table_url(collection))
            .query(&id_filter(id))
            .header("Prefer", "return=representation")
            .json(&patch);
        self.rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn remove(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let request = self
            .http
            .delete(self.config.table_url(collection))
            .query(&id_filter(id))
            .header("Prefer", "return=representation");
        if self.rows(request).await?.is_empty() {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for RestStore {
    async fn upload(&self, path: &str, file: &FileUpload) -> Result<String, UploadError> {
        let request = self
            .http
            .post(self.config.upload_url(path))
            .header("Content-Type", &file.content_type)
            .header("x-upsert", "false")
            .body(file.bytes.clone());
        self.send(request).await.map_err(|e| UploadError {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(self.config.public_url(path))
    }
}

#[async_trait]
impl SessionProvider for RestStore {
    async fn current_user_id(&self) -> Option<String> {
        self.config.access_token.as_ref()?;
        let request = self.http.get(self.config.user_url());
        match self.send(request).await {
            Ok(res) => res.json::<SessionUser>().await.ok().map(|user| user.id),
            Err(e) => {
                debug!(error = %e, "no session");
                None
            }
        }
    }
}
