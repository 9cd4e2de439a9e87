// src/entity/goal.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Collection, Patch, Record};

text_enum! {
    GoalCategory default Personal {
        Finance => "finance",
        Health => "health",
        Career => "career",
        Personal => "personal",
    }
}

text_enum! {
    GoalStatus default Active {
        Active => "active",
        Completed => "completed",
        Archived => "archived",
    }
}

text_enum! {
    GoalPriority default Mid {
        Super => "super",
        High => "high",
        Mid => "mid",
        Low => "low",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: GoalCategory,
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: GoalPriority,
    #[serde(default)]
    pub vision_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Filled by client-side lookup against the milestones collection.
    #[serde(default)]
    pub milestones: Vec<GoalMilestone>,
}

impl Goal {
    pub fn completed_milestones(&self) -> usize {
        self.milestones.iter().filter(|m| m.is_completed).count()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGoal {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: GoalCategory,
    pub priority: GoalPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GoalPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<GoalCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GoalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<GoalPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision_image_url: Option<Option<String>>,
}

impl Patch for GoalPatch {}

impl Record for Goal {
    const COLLECTION: Collection = Collection::Goals;
    const FILE_FIELD: Option<&'static str> = Some("vision_image_url");
    const USER_SCOPED: bool = true;

    type Draft = NewGoal;
    type Patch = GoalPatch;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalMilestone {
    pub id: String,
    pub goal_id: String,
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGoalMilestone {
    pub goal_id: String,
    pub title: String,
    pub position: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MilestonePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

impl Patch for MilestonePatch {}

impl Record for GoalMilestone {
    const COLLECTION: Collection = Collection::GoalMilestones;

    type Draft = NewGoalMilestone;
    type Patch = MilestonePatch;

    fn id(&self) -> &str {
        &self.id
    }
}
