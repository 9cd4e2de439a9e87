use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::secret::default_profile;
use super::{Collection, Patch, Record};

/// A shared clipboard entry: text, a link, or an image attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_profile")]
    pub profile: String,
    pub created_at: DateTime<Utc>,
}

impl Clip {
    pub fn is_url(&self) -> bool {
        let text = self.content.trim();
        (text.starts_with("http://") || text.starts_with("https://"))
            && !text.contains(char::is_whitespace)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClip {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub profile: String,
}

impl NewClip {
    pub fn text(content: &str) -> Self {
        Self {
            content: content.trim().to_string(),
            image_url: None,
            profile: default_profile(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClipPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
}

impl Patch for ClipPatch {}

impl Record for Clip {
    const COLLECTION: Collection = Collection::Clipboard;
    const FILE_FIELD: Option<&'static str> = Some("image_url");

    type Draft = NewClip;
    type Patch = ClipPatch;

    fn id(&self) -> &str {
        &self.id
    }
}
