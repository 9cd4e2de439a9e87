use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Collection, Patch, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    pub id: String,
    pub service: String,
    #[serde(default)]
    pub username: Option<String>,
    pub password: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_profile")]
    pub profile: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSecret {
    pub service: String,
    pub username: Option<String>,
    pub password: String,
    pub notes: Option<String>,
    pub profile: String,
}

impl NewSecret {
    /// Blank optional fields are stored as null.
    pub fn new(service: &str, username: &str, password: &str, notes: &str) -> Self {
        Self {
            service: service.trim().to_string(),
            username: non_blank(username),
            password: password.to_string(),
            notes: non_blank(notes),
            profile: default_profile(),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub(super) fn default_profile() -> String {
    "personal".to_string()
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SecretPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl Patch for SecretPatch {}

impl Record for Secret {
    const COLLECTION: Collection = Collection::Secrets;

    type Draft = NewSecret;
    type Patch = SecretPatch;

    fn id(&self) -> &str {
        &self.id
    }
}
