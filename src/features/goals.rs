use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::demo::DataSource;
use crate::entity::{Collection, Goal, GoalMilestone, GoalPatch, MilestonePatch, NewGoal, NewGoalMilestone};
use crate::error::{require_text, Result};
use crate::hook::EntityHook;
use crate::store::FileUpload;

/// A goal and the titles of its first milestones.
#[derive(Debug, Clone, Default)]
pub struct CreateGoal {
    pub goal: NewGoal,
    pub milestones: Vec<String>,
}

/// Goals joined with their milestones.
pub struct Goals {
    goals: EntityHook<Goal>,
    milestones: EntityHook<GoalMilestone>,
    resync: JoinHandle<()>,
}

impl Drop for Goals {
    fn drop(&mut self) {
        self.resync.abort();
    }
}

impl Goals {
    pub async fn load(source: Arc<DataSource>) -> Self {
        let (goals, milestones) = tokio::join!(
            EntityHook::<Goal>::load(source.clone()),
            EntityHook::<GoalMilestone>::load(source),
        );
        let resync = milestones.follow(Collection::Goals);
        Self {
            goals,
            milestones,
            resync,
        }
    }

    pub async fn refresh(&self) -> Result<()> {
        tokio::try_join!(self.goals.refresh(), self.milestones.refresh())?;
        Ok(())
    }

    pub fn loading(&self) -> bool {
        self.goals.loading() || self.milestones.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.goals.error().or_else(|| self.milestones.error())
    }

    pub fn goal_hook(&self) -> &EntityHook<Goal> {
        &self.goals
    }

    pub fn milestone_hook(&self) -> &EntityHook<GoalMilestone> {
        &self.milestones
    }

    /// Every goal, newest first, with its milestones in position order.
    pub fn goals(&self) -> Vec<Goal> {
        let milestones = self.milestones.items();
        self.goals
            .items()
            .iter()
            .map(|goal| with_milestones(goal.clone(), &milestones))
            .collect()
    }

    pub fn goal(&self, id: &str) -> Option<Goal> {
        let goal = self.goals.get(id)?;
        Some(with_milestones(goal, &self.milestones.items()))
    }

    /// Insert the goal, then its milestones. Blank milestone titles are
    /// dropped and the rest numbered from 1.
    pub async fn create_goal(&self, input: &CreateGoal, vision: Option<&FileUpload>) -> Result<Goal> {
        require_text("title", &input.goal.title)?;

        let goal = self.goals.create(&input.goal, vision).await?;
        let drafts: Vec<NewGoalMilestone> = input
            .milestones
            .iter()
            .map(|title| title.trim())
            .filter(|title| !title.is_empty())
            .enumerate()
            .map(|(index, title)| NewGoalMilestone {
                goal_id: goal.id.clone(),
                title: title.to_string(),
                position: index as i64 + 1,
            })
            .collect();
        self.milestones.create_many(&drafts).await?;

        info!(goal = %goal.id, milestones = drafts.len(), "created goal");
        Ok(self.goal(&goal.id).unwrap_or(goal))
    }

    pub async fn update_goal(
        &self,
        id: &str,
        patch: &GoalPatch,
        vision: Option<&FileUpload>,
    ) -> Result<Goal> {
        if let Some(title) = &patch.title {
            require_text("title", title)?;
        }
        let goal = self.goals.update(id, patch, vision).await?;
        Ok(with_milestones(goal, &self.milestones.items()))
    }

    /// Milestones removed by the store along with the goal disappear on the
    /// next resync.
    pub async fn delete_goal(&self, id: &str) -> Result<()> {
        self.goals.delete(id).await
    }

    pub async fn toggle_milestone(&self, id: &str, done: bool) -> Result<GoalMilestone> {
        let patch = MilestonePatch {
            is_completed: Some(done),
            ..Default::default()
        };
        self.milestones.update(id, &patch, None).await
    }
}

fn with_milestones(mut goal: Goal, milestones: &[GoalMilestone]) -> Goal {
    let mut own: Vec<GoalMilestone> = milestones
        .iter()
        .filter(|m| m.goal_id == goal.id)
        .cloned()
        .collect();
    own.sort_by_key(|m| m.position);
    goal.milestones = own;
    goal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::CollectionAdapter;
    use crate::error::KarrosError;
    use crate::store::{Backend, MemoryStore};

    fn live(store: &Arc<MemoryStore>) -> Arc<DataSource> {
        Arc::new(DataSource::live(CollectionAdapter::new(Backend::from_store(
            store.clone(),
        ))))
    }

    fn deposit() -> CreateGoal {
        CreateGoal {
            goal: NewGoal {
                title: "Save for deposit".to_string(),
                description: Some("First flat".to_string()),
                ..Default::default()
            },
            milestones: vec!["Save $500".to_string(), "Save $1000".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_goal_with_milestones() {
        let store = Arc::new(MemoryStore::new());
        let goals = Goals::load(live(&store)).await;

        let goal = goals.create_goal(&deposit(), None).await.unwrap();
        assert_eq!(goal.milestones.len(), 2);
        assert!(goal.milestones.iter().all(|m| !m.is_completed));
        assert_eq!(goal.milestones[0].title, "Save $500");
        assert_eq!(goal.milestones[0].position, 1);
        assert_eq!(goal.milestones[1].position, 2);
        assert_eq!(store.rows(Collection::GoalMilestones).len(), 2);
        assert_eq!(store.rows(Collection::Goals)[0]["user_id"], "anonymous");
    }

    #[tokio::test]
    async fn test_toggle_flips_only_that_milestone() {
        let store = Arc::new(MemoryStore::new());
        let goals = Goals::load(live(&store)).await;
        let created = goals.create_goal(&deposit(), None).await.unwrap();

        let first = &created.milestones[0];
        let toggled = goals.toggle_milestone(&first.id, true).await.unwrap();
        assert!(toggled.is_completed);

        let goal = goals.goal(&created.id).unwrap();
        assert!(goal.milestones[0].is_completed);
        assert!(!goal.milestones[1].is_completed);
        assert_eq!(goal.completed_milestones(), 1);
        assert_eq!(goal.title, created.title);
        assert_eq!(goal.description, created.description);
        assert_eq!(goal.status, created.status);
    }

    #[tokio::test]
    async fn test_blank_milestone_titles_dropped() {
        let store = Arc::new(MemoryStore::new());
        let goals = Goals::load(live(&store)).await;
        let input = CreateGoal {
            milestones: vec!["Plan".to_string(), "   ".to_string(), "Ship".to_string()],
            ..deposit()
        };
        let goal = goals.create_goal(&input, None).await.unwrap();
        let positions: Vec<_> = goal.milestones.iter().map(|m| (m.title.as_str(), m.position)).collect();
        assert_eq!(positions, vec![("Plan", 1), ("Ship", 2)]);
    }

    #[tokio::test]
    async fn test_blank_title_rejected_before_any_call() {
        let store = Arc::new(MemoryStore::new());
        let goals = Goals::load(live(&store)).await;
        let calls = store.total_calls();

        let input = CreateGoal {
            goal: NewGoal {
                title: "  ".to_string(),
                ..Default::default()
            },
            milestones: vec![],
        };
        let err = goals.create_goal(&input, None).await.unwrap_err();
        assert!(matches!(err, KarrosError::Validation(_)));
        assert_eq!(store.total_calls(), calls);
    }

    #[tokio::test]
    async fn test_demo_goals_joined_with_fixture_milestones() {
        let goals = Goals::load(Arc::new(DataSource::demo())).await;
        let all = goals.goals();
        assert_eq!(all.len(), 3);

        let fund = goals.goal("d-goal-1").unwrap();
        let positions: Vec<_> = fund.milestones.iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(fund.completed_milestones(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_goal() {
        let store = Arc::new(MemoryStore::new());
        let goals = Goals::load(live(&store)).await;
        let goal = goals.create_goal(&deposit(), None).await.unwrap();

        let patch = GoalPatch {
            title: Some("Save for a bigger deposit".to_string()),
            ..Default::default()
        };
        let updated = goals.update_goal(&goal.id, &patch, None).await.unwrap();
        assert_eq!(updated.title, "Save for a bigger deposit");
        assert_eq!(updated.milestones.len(), 2);

        goals.delete_goal(&goal.id).await.unwrap();
        assert!(goals.goals().is_empty());
        assert!(store.rows(Collection::Goals).is_empty());
    }
}
