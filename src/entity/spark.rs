use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Collection, Patch, Record};

text_enum! {
    SparkType default Idea {
        Idea => "idea",
        Tool => "tool",
        Item => "item",
        Resource => "resource",
        Event => "event",
        Person => "person",
    }
}

text_enum! {
    SparkStatus default Active {
        Active => "active",
        Acquired => "acquired",
        Dismissed => "dismissed",
    }
}

/// A captured idea, tool or resource, optionally linked to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioSpark {
    pub id: String,
    #[serde(rename = "type", default)]
    pub spark_type: SparkType,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub status: SparkStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSpark {
    #[serde(rename = "type")]
    pub spark_type: SparkType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SparkPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub spark_type: Option<SparkType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SparkStatus>,
}

impl Patch for SparkPatch {}

impl Record for StudioSpark {
    const COLLECTION: Collection = Collection::Sparks;

    type Draft = NewSpark;
    type Patch = SparkPatch;

    fn id(&self) -> &str {
        &self.id
    }
}
