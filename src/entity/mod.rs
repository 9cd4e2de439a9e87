//! Record types for every collection, plus the traits the generic layers use.
//!
//! Records are flat rows. Relations are soft `*_id` fields resolved by
//! lookup, never by joins in this layer.

/// Declares a closed set of text values with serde, `Display` and `FromStr`.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident default $default:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let fold = |text: &str| text.trim().to_lowercase().replace(['-', ' '], "_");
                let wanted = fold(s);
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| fold(v.as_str()) == wanted)
                    .ok_or_else(|| format!("Invalid {}: {}", stringify!($name), s))
            }
        }
    };
}

mod clip;
mod content;
mod goal;
mod network;
mod press;
mod project;
mod secret;
mod spark;
mod studio_milestone;

pub use clip::{Clip, ClipPatch, NewClip};
pub use content::{ContentCategory, ContentPatch, ContentScene, ContentStatus, NewContent, StudioContent};
pub use goal::{
    Goal, GoalCategory, GoalMilestone, GoalPatch, GoalPriority, GoalStatus, MilestonePatch,
    NewGoal, NewGoalMilestone,
};
pub use network::{NetworkPatch, NetworkStatus, NetworkType, NewNetwork, StudioNetwork};
pub use press::{NewPress, PressPatch, PressStatus, PressType, StudioPress};
pub use project::{
    GtvCategory, NewProject, Platform, PriorityLevel, ProjectPatch, ProjectStatus, ProjectType,
    StrategicCategory, StudioProject,
};
pub use secret::{NewSecret, Secret, SecretPatch};
pub use spark::{NewSpark, SparkPatch, SparkStatus, SparkType, StudioSpark};
pub use studio_milestone::{
    MilestoneStatus, NewProjectMilestone, ProjectMilestone, ProjectMilestonePatch,
};

use std::cmp::Ordering;
use std::fmt::Debug;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};

/// A row as it crosses the backend seam.
pub type Row = Map<String, Value>;

/// Owner of user-scoped records created without a backend.
pub const LOCAL_USER: &str = "demo";

/// The remote tables this layer reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Goals,
    GoalMilestones,
    Projects,
    Sparks,
    ProjectMilestones,
    Content,
    Press,
    Networks,
    Secrets,
    Clipboard,
}

impl Collection {
    pub const ALL: &'static [Collection] = &[
        Collection::Goals,
        Collection::GoalMilestones,
        Collection::Projects,
        Collection::Sparks,
        Collection::ProjectMilestones,
        Collection::Content,
        Collection::Press,
        Collection::Networks,
        Collection::Secrets,
        Collection::Clipboard,
    ];

    /// Table name at the store.
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Goals => "sys_goals",
            Collection::GoalMilestones => "sys_milestones",
            Collection::Projects => "studio_projects",
            Collection::Sparks => "studio_sparks",
            Collection::ProjectMilestones => "studio_milestones",
            Collection::Content => "studio_content",
            Collection::Press => "studio_press",
            Collection::Networks => "studio_networks",
            Collection::Secrets => "sys_secrets",
            Collection::Clipboard => "sys_clipboard",
        }
    }

    /// Short name, also used as the object storage prefix.
    pub fn short_name(&self) -> &'static str {
        match self {
            Collection::Goals => "goals",
            Collection::GoalMilestones => "goal_milestones",
            Collection::Projects => "projects",
            Collection::Sparks => "sparks",
            Collection::ProjectMilestones => "project_milestones",
            Collection::Content => "content",
            Collection::Press => "press",
            Collection::Networks => "networks",
            Collection::Secrets => "secrets",
            Collection::Clipboard => "clipboard",
        }
    }

    pub fn order(&self) -> OrderBy {
        match self {
            Collection::GoalMilestones => OrderBy::asc("position"),
            Collection::ProjectMilestones => OrderBy::asc("created_at"),
            Collection::Secrets => OrderBy::asc("service"),
            _ => OrderBy::desc("created_at"),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            Collection::Clipboard => Some(20),
            _ => None,
        }
    }

    pub fn has_updated_at(&self) -> bool {
        matches!(
            self,
            Collection::Projects
                | Collection::Sparks
                | Collection::ProjectMilestones
                | Collection::Content
                | Collection::Press
                | Collection::Networks
        )
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table())
    }
}

impl std::str::FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Collection::ALL
            .iter()
            .copied()
            .find(|c| c.table() == wanted || c.short_name() == wanted)
            .ok_or_else(|| format!("Unknown collection: {}", s))
    }
}

/// Ordering of a collection's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub ascending: bool,
}

impl OrderBy {
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            ascending: true,
        }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            ascending: false,
        }
    }

    /// Compare two rows on this ordering's column. Nulls sort last.
    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        let left = a.get(self.column).unwrap_or(&Value::Null);
        let right = b.get(self.column).unwrap_or(&Value::Null);
        match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ord = compare_values(left, right);
                if self.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            }
        }
    }

    pub fn sort(&self, rows: &mut [Row]) {
        rows.sort_by(|a, b| self.compare(a, b));
    }

    /// Index at which a freshly written record belongs in a list already in
    /// this order.
    ///
    /// `created_at` orderings are decided by recency alone: the store just
    /// stamped the record, so it is the newest one.
    pub fn insertion_index<T: Serialize>(&self, items: &[T], record: &T) -> usize {
        if self.column == "created_at" {
            return if self.ascending { items.len() } else { 0 };
        }
        let Ok(new_row) = to_row(record) else {
            return items.len();
        };
        items
            .iter()
            .position(|item| {
                to_row(item)
                    .map(|row| self.compare(&row, &new_row) == Ordering::Greater)
                    .unwrap_or(false)
            })
            .unwrap_or(items.len())
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Serialize any value to a row. Non-object values are a programming error
/// surfaced as a decode failure.
pub fn to_row<T: Serialize>(value: &T) -> Result<Row> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Decode(format!("expected an object, got {}", other)).into()),
    }
}

/// Deserialize a store row into a record.
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Decode(e.to_string()).into())
}

/// A partial update. Absent fields are untouched; `Some(None)` on a
/// clearable field writes null.
pub trait Patch: Serialize + Default + Clone + Debug + Send + Sync + 'static {
    fn to_row(&self) -> Result<Row> {
        to_row(self)
    }

    fn is_empty(&self) -> bool {
        self.to_row().map(|row| row.is_empty()).unwrap_or(false)
    }
}

/// A record mirrored from one collection.
pub trait Record: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    const COLLECTION: Collection;

    /// Column receiving the public URL of an uploaded file, if any.
    const FILE_FIELD: Option<&'static str> = None;

    /// Whether inserts are tagged with the current user's id.
    const USER_SCOPED: bool = false;

    /// Creation payload.
    type Draft: Serialize + Clone + Debug + Send + Sync + 'static;

    type Patch: Patch;

    fn id(&self) -> &str;

    /// Build the record the store would return for `draft`, for stores that
    /// live in this process (demo mode). Column defaults come from the
    /// record's serde defaults; user-scoped records belong to [`LOCAL_USER`].
    fn materialize(draft: &Self::Draft, id: String, now: DateTime<Utc>) -> Result<Self> {
        let mut row = to_row(draft)?;
        if Self::USER_SCOPED {
            row.entry("user_id")
                .or_insert_with(|| Value::String(LOCAL_USER.to_string()));
        }
        stamp_new_row(&mut row, Self::COLLECTION, id, now);
        from_row(row)
    }

    /// Merge a patch over this record.
    fn apply_patch(&self, patch: &Self::Patch, now: DateTime<Utc>) -> Result<Self> {
        let mut row = to_row(self)?;
        row.extend(patch.to_row()?);
        if Self::COLLECTION.has_updated_at() {
            row.insert("updated_at".to_string(), Value::String(timestamp(now)));
        }
        from_row(row)
    }
}

/// Fill the columns a store assigns on insert.
pub fn stamp_new_row(row: &mut Row, collection: Collection, id: String, now: DateTime<Utc>) {
    let stamp = Value::String(timestamp(now));
    row.insert("id".to_string(), Value::String(id));
    row.insert("created_at".to_string(), stamp.clone());
    if collection.has_updated_at() {
        row.insert("updated_at".to_string(), stamp);
    }
}

/// Fixed-width UTC timestamp, so text ordering matches time ordering.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
