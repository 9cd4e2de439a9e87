use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Collection, Patch, Record};

text_enum! {
    MilestoneStatus default Pending {
        Pending => "pending",
        Completed => "completed",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMilestone {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: MilestoneStatus,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub impact_score: Option<i64>,
    #[serde(default)]
    pub linked_task_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProjectMilestone {
    pub project_id: String,
    pub title: String,
    pub status: MilestoneStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectMilestonePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MilestoneStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_task_id: Option<Option<String>>,
}

impl ProjectMilestonePatch {
    pub fn completion(done: bool, at: DateTime<Utc>) -> Self {
        Self {
            status: Some(if done {
                MilestoneStatus::Completed
            } else {
                MilestoneStatus::Pending
            }),
            completed_at: Some(done.then_some(at)),
            ..Default::default()
        }
    }
}

impl Patch for ProjectMilestonePatch {}

impl Record for ProjectMilestone {
    const COLLECTION: Collection = Collection::ProjectMilestones;

    type Draft = NewProjectMilestone;
    type Patch = ProjectMilestonePatch;

    fn id(&self) -> &str {
        &self.id
    }
}
