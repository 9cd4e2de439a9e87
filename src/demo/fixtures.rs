//! Built-in demo data set covering every collection.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};

use crate::entity::{from_row, Collection, Record, Row};
use crate::error::Result;

/// Static rows per collection. Reads return fresh copies; writes made in
/// demo mode never touch these.
#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    tables: HashMap<Collection, Vec<Row>>,
}

impl Fixtures {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the rows of one collection.
    pub fn with(mut self, collection: Collection, rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.tables.insert(collection, rows);
        self
    }

    pub fn rows(&self, collection: Collection) -> &[Row] {
        self.tables
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Fixture records of `T`, in the collection's order.
    pub fn list<T: Record>(&self) -> Result<Vec<T>> {
        let collection = T::COLLECTION;
        let mut rows = self.rows(collection).to_vec();
        collection.order().sort(&mut rows);
        if let Some(limit) = collection.limit() {
            rows.truncate(limit);
        }
        rows.into_iter().map(from_row).collect()
    }

    /// The shipped demo data. Project dates are relative to `today` so the
    /// matrix always has something inside its window.
    pub fn builtin(today: NaiveDate) -> Self {
        let day = |offset: i64| (today + Duration::days(offset)).to_string();

        Self::empty()
            .with(
                Collection::Goals,
                vec![
                    json!({
                        "id": "d-goal-1", "user_id": "demo", "title": "Build a 6-month emergency fund",
                        "description": "Automate a weekly transfer into savings.",
                        "category": "finance", "status": "active", "priority": "super",
                        "target_date": day(180), "created_at": "2025-01-03T09:00:00.000000Z"
                    }),
                    json!({
                        "id": "d-goal-2", "user_id": "demo", "title": "Run a half marathon",
                        "category": "health", "status": "active", "priority": "high",
                        "target_date": day(90), "created_at": "2025-01-05T09:00:00.000000Z"
                    }),
                    json!({
                        "id": "d-goal-3", "user_id": "demo", "title": "Publish the studio portfolio",
                        "category": "career", "status": "completed", "priority": "mid",
                        "created_at": "2025-01-08T09:00:00.000000Z"
                    }),
                ],
            )
            .with(
                Collection::GoalMilestones,
                vec![
                    json!({"id": "d-gm-1", "goal_id": "d-goal-1", "title": "Open a separate savings account", "is_completed": true, "position": 1, "created_at": "2025-01-03T09:00:01.000000Z"}),
                    json!({"id": "d-gm-2", "goal_id": "d-goal-1", "title": "Reach three months of expenses", "is_completed": false, "position": 2, "created_at": "2025-01-03T09:00:02.000000Z"}),
                    json!({"id": "d-gm-3", "goal_id": "d-goal-1", "title": "Reach six months of expenses", "is_completed": false, "position": 3, "created_at": "2025-01-03T09:00:03.000000Z"}),
                    json!({"id": "d-gm-4", "goal_id": "d-goal-2", "title": "Run 10k without stopping", "is_completed": true, "position": 1, "created_at": "2025-01-05T09:00:01.000000Z"}),
                    json!({"id": "d-gm-5", "goal_id": "d-goal-2", "title": "Complete a 16k long run", "is_completed": false, "position": 2, "created_at": "2025-01-05T09:00:02.000000Z"}),
                    json!({"id": "d-gm-6", "goal_id": "d-goal-3", "title": "Shoot project photography", "is_completed": true, "position": 1, "created_at": "2025-01-08T09:00:01.000000Z"}),
                ],
            )
            .with(
                Collection::Projects,
                vec![
                    json!({
                        "id": "d-proj-1", "title": "Riverside Pavilion", "tagline": "Timber canopy for the summer market",
                        "status": "active", "type": "Architectural Design", "platforms": ["instagram", "web"],
                        "priority": "urgent", "target_date": day(2), "strategic_category": "production",
                        "gtv_featured": true, "gtv_category": "innovation",
                        "created_at": "2025-02-01T10:00:00.000000Z", "updated_at": "2025-02-01T10:00:00.000000Z"
                    }),
                    json!({
                        "id": "d-proj-2", "title": "Modular Desk Lamp", "status": "research", "type": "Product Design",
                        "platforms": ["youtube"], "priority": "high", "target_date": day(7),
                        "strategic_category": "rnd",
                        "created_at": "2025-02-03T10:00:00.000000Z", "updated_at": "2025-02-03T10:00:00.000000Z"
                    }),
                    json!({
                        "id": "d-proj-3", "title": "Studio Newsletter", "status": "idea", "type": "Media",
                        "platforms": ["substack"], "priority": "low", "strategic_category": "media",
                        "created_at": "2025-02-05T10:00:00.000000Z", "updated_at": "2025-02-05T10:00:00.000000Z"
                    }),
                    json!({
                        "id": "d-proj-4", "title": "Recycled Textile Capsule", "status": "paused", "type": "Fashion",
                        "priority": "mid", "target_date": day(12), "strategic_category": "growth",
                        "ai_position_x": 70.0, "ai_position_y": 55.0,
                        "created_at": "2025-02-07T10:00:00.000000Z", "updated_at": "2025-02-07T10:00:00.000000Z"
                    }),
                ],
            )
            .with(
                Collection::Sparks,
                vec![
                    json!({"id": "d-spark-1", "title": "Kinetic facade study", "type": "idea", "status": "active", "tags": ["facade", "motion"], "created_at": "2025-02-10T08:00:00.000000Z", "updated_at": "2025-02-10T08:00:00.000000Z"}),
                    json!({"id": "d-spark-2", "title": "Benchtop CNC router", "type": "tool", "status": "acquired", "project_id": "d-proj-2", "price": 24.0, "created_at": "2025-02-11T08:00:00.000000Z", "updated_at": "2025-02-11T08:00:00.000000Z"}),
                    json!({"id": "d-spark-3", "title": "Build log video series", "type": "resource", "status": "dismissed", "created_at": "2025-02-12T08:00:00.000000Z", "updated_at": "2025-02-12T08:00:00.000000Z"}),
                ],
            )
            .with(
                Collection::ProjectMilestones,
                vec![
                    json!({"id": "d-pm-1", "project_id": "d-proj-1", "title": "Structural sign-off", "status": "completed", "created_at": "2025-02-01T10:00:01.000000Z", "updated_at": "2025-02-01T10:00:01.000000Z"}),
                    json!({"id": "d-pm-2", "project_id": "d-proj-1", "title": "Fabrication drawings", "status": "pending", "target_date": day(1), "created_at": "2025-02-01T10:00:02.000000Z", "updated_at": "2025-02-01T10:00:02.000000Z"}),
                    json!({"id": "d-pm-3", "project_id": "d-proj-2", "title": "First prototype", "status": "pending", "created_at": "2025-02-03T10:00:01.000000Z", "updated_at": "2025-02-03T10:00:01.000000Z"}),
                ],
            )
            .with(
                Collection::Content,
                vec![
                    json!({"id": "d-content-1", "title": "Pavilion timelapse", "platforms": ["youtube"], "status": "edited", "category": "Showcase", "priority": "high", "project_id": "d-proj-1", "publish_date": day(5), "created_at": "2025-02-14T12:00:00.000000Z", "updated_at": "2025-02-14T12:00:00.000000Z"}),
                    json!({"id": "d-content-2", "title": "Why modular lighting", "platforms": ["substack"], "status": "scripted", "category": "Thoughts", "created_at": "2025-02-15T12:00:00.000000Z", "updated_at": "2025-02-15T12:00:00.000000Z"}),
                ],
            )
            .with(
                Collection::Press,
                vec![
                    json!({"id": "d-press-1", "title": "Emerging Designers Award", "organization": "Design Council", "type": "award", "status": "applying", "deadline": day(20), "created_at": "2025-02-16T12:00:00.000000Z", "updated_at": "2025-02-16T12:00:00.000000Z"}),
                    json!({"id": "d-press-2", "title": "Studio feature", "organization": "Dezeen", "type": "feature", "status": "not_started", "project_id": "d-proj-1", "created_at": "2025-02-17T12:00:00.000000Z", "updated_at": "2025-02-17T12:00:00.000000Z"}),
                ],
            )
            .with(
                Collection::Networks,
                vec![
                    json!({"id": "d-net-1", "name": "Alex Rivera", "type": "person", "status": "connected", "platform": "Instagram", "tags": ["exhibitions"], "created_at": "2025-02-18T12:00:00.000000Z", "updated_at": "2025-02-18T12:00:00.000000Z"}),
                    json!({"id": "d-net-2", "name": "Makers Guild", "type": "community", "status": "interested", "created_at": "2025-02-19T12:00:00.000000Z", "updated_at": "2025-02-19T12:00:00.000000Z"}),
                ],
            )
            .with(
                Collection::Secrets,
                vec![
                    json!({"id": "d-sec-1", "service": "GitHub", "username": "studio-admin", "password": "demo-password-1", "profile": "personal", "created_at": "2025-01-10T12:00:00.000000Z"}),
                    json!({"id": "d-sec-2", "service": "Adobe", "username": "studio@example.com", "password": "demo-password-2", "notes": "Team plan", "profile": "personal", "created_at": "2025-01-11T12:00:00.000000Z"}),
                ],
            )
            .with(
                Collection::Clipboard,
                vec![
                    json!({"id": "d-clip-1", "content": "https://example.com/moodboard", "profile": "personal", "created_at": "2025-02-20T12:00:00.000000Z"}),
                    json!({"id": "d-clip-2", "content": "Order more birch ply sheets", "profile": "personal", "created_at": "2025-02-21T12:00:00.000000Z"}),
                ],
            )
    }
}
