// src/entity/project.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Collection, Patch, Record};

text_enum! {
    ProjectStatus default Idea {
        Idea => "idea",
        Research => "research",
        Active => "active",
        Paused => "paused",
        Shipped => "shipped",
        Archived => "archived",
    }
}

text_enum! {
    ProjectType default Other {
        ArchitecturalDesign => "Architectural Design",
        Technology => "Technology",
        Fashion => "Fashion",
        ProductDesign => "Product Design",
        Media => "Media",
        Other => "Other",
    }
}

text_enum! {
    Platform default Web {
        Youtube => "youtube",
        Instagram => "instagram",
        Substack => "substack",
        Tiktok => "tiktok",
        X => "x",
        Web => "web",
    }
}

text_enum! {
    /// Shared by projects, content and the placement matrix.
    PriorityLevel default Mid {
        Urgent => "urgent",
        High => "high",
        Mid => "mid",
        Low => "low",
    }
}

text_enum! {
    GtvCategory default Innovation {
        Innovation => "innovation",
        Impact => "impact",
        Recognition => "recognition",
        Leadership => "leadership",
    }
}

text_enum! {
    StrategicCategory default Personal {
        Rnd => "rnd",
        Production => "production",
        Media => "media",
        Growth => "growth",
        Personal => "personal",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioProject {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default, rename = "type")]
    pub project_type: Option<ProjectType>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub gtv_featured: bool,
    #[serde(default)]
    pub gtv_category: Option<GtvCategory>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Option<PriorityLevel>,
    #[serde(default)]
    pub impact: Option<PriorityLevel>,
    #[serde(default)]
    pub impact_score: Option<i64>,
    #[serde(default)]
    pub strategic_category: Option<StrategicCategory>,
    /// Matrix coordinates persisted after a drag, in percent.
    #[serde(default)]
    pub ai_position_x: Option<f64>,
    #[serde(default)]
    pub ai_position_y: Option<f64>,
    #[serde(default)]
    pub is_promoted: bool,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ProjectStatus,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub project_type: Option<ProjectType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    pub gtv_featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<PriorityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategic_category: Option<StrategicCategory>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub project_type: Option<Option<ProjectType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<Platform>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gtv_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Option<PriorityLevel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_score: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategic_category: Option<Option<StrategicCategory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_position_x: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_position_y: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_promoted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
}

impl ProjectPatch {
    /// A priority or date change without new coordinates drops any
    /// persisted drag position, so the matrix recomputes it.
    pub fn reset_stale_position(mut self) -> Self {
        let moves = self.priority.is_some() || self.target_date.is_some();
        let placed = self.ai_position_x.is_some() || self.ai_position_y.is_some();
        if moves && !placed {
            self.ai_position_x = Some(None);
            self.ai_position_y = Some(None);
        }
        self
    }
}

impl Patch for ProjectPatch {}

impl Record for StudioProject {
    const COLLECTION: Collection = Collection::Projects;
    const FILE_FIELD: Option<&'static str> = Some("cover_url");

    type Draft = NewProject;
    type Patch = ProjectPatch;

    fn id(&self) -> &str {
        &self.id
    }
}
