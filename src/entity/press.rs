use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Collection, GtvCategory, Patch, Record};

text_enum! {
    PressType default Other {
        Competition => "competition",
        Grant => "grant",
        Award => "award",
        Feature => "feature",
        Accelerator => "accelerator",
        Other => "other",
    }
}

text_enum! {
    PressStatus default NotStarted {
        NotStarted => "not_started",
        Applying => "applying",
        Submitted => "submitted",
        Achieved => "achieved",
        Lost => "lost",
        Closed => "closed",
        Published => "published",
        Rejected => "rejected",
    }
}

/// Competitions, grants, awards and features being pursued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioPress {
    pub id: String,
    pub title: String,
    pub organization: String,
    #[serde(rename = "type", default)]
    pub press_type: PressType,
    #[serde(default)]
    pub status: PressStatus,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub date_achieved: Option<NaiveDate>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub milestone_goal: Option<String>,
    #[serde(default)]
    pub is_strategy_goal: bool,
    #[serde(default)]
    pub is_portfolio_item: bool,
    #[serde(default)]
    pub gtv_category: Option<GtvCategory>,
    #[serde(default)]
    pub project_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPress {
    pub title: String,
    pub organization: String,
    #[serde(rename = "type")]
    pub press_type: PressType,
    pub status: PressStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub is_strategy_goal: bool,
    pub is_portfolio_item: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PressPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub press_type: Option<PressType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PressStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_achieved: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_portfolio_item: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<String>>,
}

impl Patch for PressPatch {}

impl Record for StudioPress {
    const COLLECTION: Collection = Collection::Press;

    type Draft = NewPress;
    type Patch = PressPatch;

    fn id(&self) -> &str {
        &self.id
    }
}
