use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::task::JoinHandle;
use tracing::info;

use crate::demo::DataSource;
use crate::entity::{
    Collection, ContentPatch, MilestoneStatus, NetworkPatch, NewContent, NewNetwork, NewPress,
    NewProject, NewProjectMilestone, NewSpark, PressPatch, ProjectMilestone, ProjectMilestonePatch,
    ProjectPatch, SparkPatch, StudioContent, StudioNetwork, StudioPress,
    StudioProject, StudioSpark,
};
use crate::error::{require_text, Result};
use crate::hook::EntityHook;
use crate::matrix::{self, MatrixDrop, MatrixFilter};
use crate::store::FileUpload;

/// The creative studio: projects and everything hanging off them.
pub struct Studio {
    projects: EntityHook<StudioProject>,
    sparks: EntityHook<StudioSpark>,
    milestones: EntityHook<ProjectMilestone>,
    content: EntityHook<StudioContent>,
    press: EntityHook<StudioPress>,
    networks: EntityHook<StudioNetwork>,
    resync: JoinHandle<()>,
}

impl Drop for Studio {
    fn drop(&mut self) {
        self.resync.abort();
    }
}

impl Studio {
    /// Load all six collections concurrently.
    pub async fn load(source: Arc<DataSource>) -> Self {
        let (projects, sparks, milestones, content, press, networks) = tokio::join!(
            EntityHook::<StudioProject>::load(source.clone()),
            EntityHook::<StudioSpark>::load(source.clone()),
            EntityHook::<ProjectMilestone>::load(source.clone()),
            EntityHook::<StudioContent>::load(source.clone()),
            EntityHook::<StudioPress>::load(source.clone()),
            EntityHook::<StudioNetwork>::load(source),
        );
        let resync = milestones.follow(Collection::Projects);
        Self {
            projects,
            sparks,
            milestones,
            content,
            press,
            networks,
            resync,
        }
    }

    pub async fn refresh(&self) -> Result<()> {
        tokio::try_join!(
            self.projects.refresh(),
            self.sparks.refresh(),
            self.milestones.refresh(),
            self.content.refresh(),
            self.press.refresh(),
            self.networks.refresh(),
        )?;
        Ok(())
    }

    pub fn loading(&self) -> bool {
        self.projects.loading()
            || self.sparks.loading()
            || self.milestones.loading()
            || self.content.loading()
            || self.press.loading()
            || self.networks.loading()
    }

    /// The first failure among the hooks, if any.
    pub fn error(&self) -> Option<String> {
        self.projects
            .error()
            .or_else(|| self.sparks.error())
            .or_else(|| self.milestones.error())
            .or_else(|| self.content.error())
            .or_else(|| self.press.error())
            .or_else(|| self.networks.error())
    }

    pub fn projects(&self) -> &EntityHook<StudioProject> {
        &self.projects
    }

    pub fn sparks(&self) -> &EntityHook<StudioSpark> {
        &self.sparks
    }

    pub fn milestones(&self) -> &EntityHook<ProjectMilestone> {
        &self.milestones
    }

    pub fn content(&self) -> &EntityHook<StudioContent> {
        &self.content
    }

    pub fn press(&self) -> &EntityHook<StudioPress> {
        &self.press
    }

    pub fn networks(&self) -> &EntityHook<StudioNetwork> {
        &self.networks
    }

    // Projects

    /// Create a project, then one pending milestone per non-blank title.
    pub async fn add_project(
        &self,
        draft: &NewProject,
        milestone_titles: &[String],
        cover: Option<&FileUpload>,
    ) -> Result<StudioProject> {
        require_text("title", &draft.title)?;

        let project = self.projects.create(draft, cover).await?;
        let drafts: Vec<NewProjectMilestone> = milestone_titles
            .iter()
            .map(|title| title.trim())
            .filter(|title| !title.is_empty())
            .map(|title| NewProjectMilestone {
                project_id: project.id.clone(),
                title: title.to_string(),
                status: MilestoneStatus::Pending,
                target_date: None,
            })
            .collect();
        self.milestones.create_many(&drafts).await?;

        info!(project = %project.id, milestones = drafts.len(), "added project");
        Ok(project)
    }

    /// A priority or date change without coordinates also clears the
    /// persisted matrix position.
    pub async fn update_project(
        &self,
        id: &str,
        patch: ProjectPatch,
        cover: Option<&FileUpload>,
    ) -> Result<StudioProject> {
        if let Some(title) = &patch.title {
            require_text("title", title)?;
        }
        let patch = patch.reset_stale_position();
        self.projects.update(id, &patch, cover).await
    }

    /// Persist a matrix drop: priority, date and the raw coordinates.
    pub async fn move_project(&self, id: &str, drop: MatrixDrop) -> Result<StudioProject> {
        self.projects.update(id, &drop.into_patch(), None).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<()> {
        self.projects.delete(id).await
    }

    /// Resolve a soft project reference. Dangling ids read as unlinked.
    pub fn project_for(&self, project_id: Option<&str>) -> Option<StudioProject> {
        project_id.and_then(|id| self.projects.get(id))
    }

    pub fn matrix_projects(&self, today: NaiveDate, filter: &MatrixFilter) -> Vec<StudioProject> {
        let projects = self.projects.items();
        matrix::visible(&projects, today, filter)
            .into_iter()
            .cloned()
            .collect()
    }

    // Milestones

    pub async fn add_milestone(&self, draft: &NewProjectMilestone) -> Result<ProjectMilestone> {
        require_text("title", &draft.title)?;
        self.milestones.create(draft, None).await
    }

    pub async fn complete_milestone(&self, id: &str, done: bool) -> Result<ProjectMilestone> {
        let patch = ProjectMilestonePatch::completion(done, Utc::now());
        self.milestones.update(id, &patch, None).await
    }

    pub async fn delete_milestone(&self, id: &str) -> Result<()> {
        self.milestones.delete(id).await
    }

    /// Oldest first.
    pub fn milestones_for_project(&self, project_id: &str) -> Vec<ProjectMilestone> {
        self.milestones
            .items()
            .iter()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect()
    }

    // Sparks

    pub async fn add_spark(&self, draft: &NewSpark) -> Result<StudioSpark> {
        require_text("title", &draft.title)?;
        self.sparks.create(draft, None).await
    }

    pub async fn update_spark(&self, id: &str, patch: &SparkPatch) -> Result<StudioSpark> {
        if let Some(title) = &patch.title {
            require_text("title", title)?;
        }
        self.sparks.update(id, patch, None).await
    }

    pub async fn delete_spark(&self, id: &str) -> Result<()> {
        self.sparks.delete(id).await
    }

    // Content

    pub async fn add_content(&self, draft: &NewContent) -> Result<StudioContent> {
        require_text("title", &draft.title)?;
        self.content.create(draft, None).await
    }

    pub async fn update_content(&self, id: &str, patch: &ContentPatch) -> Result<StudioContent> {
        if let Some(title) = &patch.title {
            require_text("title", title)?;
        }
        self.content.update(id, patch, None).await
    }

    pub async fn delete_content(&self, id: &str) -> Result<()> {
        self.content.delete(id).await
    }

    pub fn content_for_project(&self, project_id: &str) -> Vec<StudioContent> {
        self.content
            .items()
            .iter()
            .filter(|c| c.project_id.as_deref() == Some(project_id))
            .cloned()
            .collect()
    }

    // Press

    pub async fn add_press(&self, draft: &NewPress) -> Result<StudioPress> {
        require_text("title", &draft.title)?;
        require_text("organization", &draft.organization)?;
        self.press.create(draft, None).await
    }

    pub async fn update_press(&self, id: &str, patch: &PressPatch) -> Result<StudioPress> {
        if let Some(title) = &patch.title {
            require_text("title", title)?;
        }
        if let Some(organization) = &patch.organization {
            require_text("organization", organization)?;
        }
        self.press.update(id, patch, None).await
    }

    pub async fn delete_press(&self, id: &str) -> Result<()> {
        self.press.delete(id).await
    }

    // Networks

    pub async fn add_network(&self, draft: &NewNetwork) -> Result<StudioNetwork> {
        require_text("name", &draft.name)?;
        self.networks.create(draft, None).await
    }

    pub async fn update_network(&self, id: &str, patch: &NetworkPatch) -> Result<StudioNetwork> {
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }
        self.networks.update(id, patch, None).await
    }

    pub async fn delete_network(&self, id: &str) -> Result<()> {
        self.networks.delete(id).await
    }
}
