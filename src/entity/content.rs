use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Collection, Patch, Platform, PriorityLevel, Record};

text_enum! {
    ContentStatus default Idea {
        Idea => "idea",
        Scripted => "scripted",
        Filmed => "filmed",
        Edited => "edited",
        Scheduled => "scheduled",
        Published => "published",
    }
}

text_enum! {
    ContentCategory default Other {
        Vlog => "Vlog",
        Thoughts => "Thoughts",
        Showcase => "Showcase",
        Concept => "Concept",
        Update => "Update",
        Other => "Other",
    }
}

/// A shooting location attached to a content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentScene {
    pub id: String,
    pub location: String,
    #[serde(rename = "type")]
    pub scene_type: String,
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub distance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioContent {
    pub id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(rename = "type", default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub category: Option<ContentCategory>,
    pub title: String,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default)]
    pub priority: Option<PriorityLevel>,
    #[serde(default)]
    pub impact: Option<PriorityLevel>,
    #[serde(default)]
    pub publish_date: Option<NaiveDate>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub scenes: Vec<ContentScene>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewContent {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub platforms: Vec<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ContentCategory>,
    pub status: ContentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<PriorityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<Platform>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<ContentCategory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ContentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Option<PriorityLevel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenes: Option<Vec<ContentScene>>,
}

impl Patch for ContentPatch {}

impl Record for StudioContent {
    const COLLECTION: Collection = Collection::Content;

    type Draft = NewContent;
    type Patch = ContentPatch;

    fn id(&self) -> &str {
        &self.id
    }
}
