use std::env;
use std::io;
use std::path::Path;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::commands::{
    ClipAction, ContentAction, GoalAction, MilestoneAction, NetworkAction, PressAction,
    ProjectAction, SecretAction, SparkAction, Switch, VaultAction,
};
use crate::config::{BackendKind, Config, Project};
use crate::demo::DataSource;
use crate::entity::{
    Goal, GoalPatch, MilestoneStatus, NewContent, NewGoal, NewNetwork, NewPress, NewProject,
    NewProjectMilestone, NewSpark, PriorityLevel, Record, Secret, StudioProject,
};
use crate::error::{KarrosError, Result};
use crate::features::{CreateGoal, Goals, Studio, Vault};
use crate::matrix::{self, MatrixDrop, MatrixFilter};
use crate::prefs::Prefs;
use crate::store::{FileUpload, RestConfig};

/// Shortest id prefix accepted in place of a full id.
pub const MIN_PREFIX: usize = 4;

/// Where a command reads and writes.
struct Context {
    source: Arc<DataSource>,
    prefs: Prefs,
}

/// Open the current project. `--demo` also works outside any project.
fn open_context(demo: bool) -> Result<Context> {
    let project = match Project::discover() {
        Ok(project) => Some(project),
        Err(KarrosError::NotInitialized) if demo => None,
        Err(e) => return Err(e),
    };
    match project {
        Some(project) => Ok(Context {
            source: Arc::new(project.data_source(demo)?),
            prefs: project.prefs(),
        }),
        None => Ok(Context {
            source: Arc::new(DataSource::demo()),
            prefs: Prefs::ephemeral(),
        }),
    }
}

impl Context {
    fn note_demo_write(&self) {
        if self.source.is_demo() {
            eprintln!("(demo mode: changes are not saved)");
        }
    }
}

fn ensure_loaded(error: Option<String>) -> Result<()> {
    match error {
        Some(message) => Err(KarrosError::Load(message)),
        None => Ok(()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn due(date: Option<NaiveDate>) -> String {
    date.map(|d| format!(" due:{}", d)).unwrap_or_default()
}

fn priority_label(priority: Option<PriorityLevel>) -> &'static str {
    priority.map(|p| p.as_str()).unwrap_or("-")
}

/// Find a record by full id or by a unique prefix of at least
/// [`MIN_PREFIX`] characters.
pub fn resolve<'a, T: Record>(items: &'a [T], id: &str) -> Result<&'a T> {
    if let Some(exact) = items.iter().find(|item| item.id() == id) {
        return Ok(exact);
    }
    if id.chars().count() < MIN_PREFIX {
        return Err(KarrosError::ShortId(id.to_string()));
    }
    let mut matches = items.iter().filter(|item| item.id().starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(item), None) => Ok(item),
        (None, _) => Err(KarrosError::NoMatch {
            kind: T::COLLECTION.short_name(),
            id: id.to_string(),
        }),
        (Some(_), Some(_)) => Err(KarrosError::AmbiguousId(id.to_string())),
    }
}

/// Ask before deleting unless `force` is set. Refuses to guess when stdin
/// is not a terminal.
fn confirm(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    eprintln!("{} [y/N] ", prompt);
    if !atty::is(atty::Stream::Stdin) {
        return Err(KarrosError::NonInteractive);
    }
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn read_upload(path: Option<&Path>) -> Result<Option<FileUpload>> {
    Ok(path.map(FileUpload::from_path).transpose()?)
}

fn project_ref(studio: &Studio, prefix: Option<&str>) -> Result<Option<String>> {
    match prefix {
        Some(prefix) => {
            let projects = studio.projects().items();
            Ok(Some(resolve(&projects, prefix)?.id.clone()))
        }
        None => Ok(None),
    }
}

pub fn handle_init(
    backend: BackendKind,
    url: Option<String>,
    anon_key: Option<String>,
    user: Option<String>,
) -> Result<()> {
    let root = env::current_dir()?;

    let rest = match (backend, url, anon_key) {
        (BackendKind::Rest, Some(url), Some(anon_key)) => Some(RestConfig::new(url, anon_key)),
        (BackendKind::Rest, _, _) => {
            return Err(KarrosError::Config(
                "the rest backend needs --url and --anon-key".to_string(),
            ))
        }
        (BackendKind::Sqlite, _, _) => None,
    };
    let config = Config {
        backend,
        demo_mode: false,
        user_id: user,
        rest,
    };

    let project = Project::init(&root, config)?;
    if backend == BackendKind::Sqlite {
        project.backend()?;
    }

    println!("Initialized karros project in {}", root.display());
    Ok(())
}

// Goals

fn print_goal(goal: &Goal) {
    println!(
        "  ({}) [{}|{}]{} {}  {}/{}",
        short_id(&goal.id),
        goal.status,
        goal.priority,
        due(goal.target_date),
        goal.title,
        goal.completed_milestones(),
        goal.milestones.len()
    );
    for m in &goal.milestones {
        let mark = if m.is_completed { "x" } else { " " };
        println!("      [{}] ({}) {}", mark, short_id(&m.id), m.title);
    }
}

pub async fn handle_goal(action: GoalAction, demo: bool) -> Result<()> {
    let ctx = open_context(demo)?;
    let goals = Goals::load(ctx.source.clone()).await;
    ensure_loaded(goals.error())?;

    match action {
        GoalAction::List { json } => {
            let all = goals.goals();
            if json {
                print_json(&all)?;
            } else if all.is_empty() {
                println!("No goals found.");
            } else {
                println!("Goals:\n");
                for goal in &all {
                    print_goal(goal);
                }
            }
        }
        GoalAction::Add {
            title,
            description,
            category,
            priority,
            target,
            milestones,
            vision,
            json,
        } => {
            let vision = read_upload(vision.as_deref())?;
            let input = CreateGoal {
                goal: NewGoal {
                    title,
                    description,
                    category,
                    priority,
                    target_date: target,
                    vision_image_url: None,
                },
                milestones,
            };
            let goal = goals.create_goal(&input, vision.as_ref()).await?;
            ctx.note_demo_write();
            if json {
                print_json(&goal)?;
            } else {
                println!(
                    "Created goal ({}) - {} with {} milestone(s)",
                    short_id(&goal.id),
                    goal.title,
                    goal.milestones.len()
                );
            }
        }
        GoalAction::Toggle { id, json } => {
            let milestones = goals.milestone_hook().items();
            let milestone = resolve(&milestones, &id)?;
            let toggled = goals
                .toggle_milestone(&milestone.id, !milestone.is_completed)
                .await?;
            ctx.note_demo_write();
            if json {
                print_json(&toggled)?;
            } else {
                let state = if toggled.is_completed { "done" } else { "not done" };
                println!("Milestone ({}) - {} is {}", short_id(&toggled.id), toggled.title, state);
            }
        }
        GoalAction::Update {
            id,
            title,
            description,
            status,
            category,
            priority,
            target,
            clear_target,
            json,
        } => {
            let items = goals.goal_hook().items();
            let goal_id = resolve(&items, &id)?.id.clone();
            let patch = GoalPatch {
                title,
                description: description.map(Some),
                category,
                status,
                target_date: if clear_target { Some(None) } else { target.map(Some) },
                priority,
                vision_image_url: None,
            };
            let updated = goals.update_goal(&goal_id, &patch, None).await?;
            ctx.note_demo_write();
            if json {
                print_json(&updated)?;
            } else {
                println!("Updated goal ({}) - {}", short_id(&updated.id), updated.title);
            }
        }
        GoalAction::Delete { id, force } => {
            let items = goals.goal_hook().items();
            let goal = resolve(&items, &id)?.clone();
            let prompt = format!("Delete goal ({}) - {}?", short_id(&goal.id), goal.title);
            if !confirm(&prompt, force)? {
                println!("Cancelled.");
                return Ok(());
            }
            goals.delete_goal(&goal.id).await?;
            ctx.note_demo_write();
            println!("Deleted goal ({}) - {}", short_id(&goal.id), goal.title);
        }
    }

    Ok(())
}

// Studio

fn print_project(project: &StudioProject) {
    let archived = if project.is_archived { " (archived)" } else { "" };
    println!(
        "  ({}) [{}|{}]{} {}{}",
        short_id(&project.id),
        project.status,
        priority_label(project.priority),
        due(project.target_date),
        project.title,
        archived
    );
}

#[derive(Serialize)]
struct MatrixEntry<'a> {
    id: &'a str,
    title: &'a str,
    priority: Option<PriorityLevel>,
    target_date: Option<NaiveDate>,
    x: f64,
    y: f64,
}

pub async fn handle_project(action: ProjectAction, demo: bool) -> Result<()> {
    let ctx = open_context(demo)?;
    let studio = Studio::load(ctx.source.clone()).await;
    ensure_loaded(studio.error())?;

    match action {
        ProjectAction::List { all, json } => {
            let projects: Vec<StudioProject> = studio
                .projects()
                .items()
                .iter()
                .filter(|p| all || !p.is_archived)
                .cloned()
                .collect();
            if json {
                print_json(&projects)?;
            } else if projects.is_empty() {
                println!("No projects found.");
            } else {
                println!("Projects:\n");
                for project in &projects {
                    print_project(project);
                }
            }
        }
        ProjectAction::Show { id, json } => {
            let items = studio.projects().items();
            let project = resolve(&items, &id)?;
            let milestones = studio.milestones_for_project(&project.id);
            let content = studio.content_for_project(&project.id);
            if json {
                let mut value = serde_json::to_value(project)?;
                value["milestones"] = serde_json::to_value(&milestones)?;
                value["content"] = serde_json::to_value(&content)?;
                print_json(&value)?;
            } else {
                println!("Project ({})", project.id);
                println!("Title: {}", project.title);
                if let Some(tagline) = &project.tagline {
                    println!("Tagline: {}", tagline);
                }
                println!("Status: {}", project.status);
                println!("Priority: {}", priority_label(project.priority));
                if let Some(date) = project.target_date {
                    println!("Target: {}", date);
                }
                if let Some(description) = &project.description {
                    println!("\n{}", description);
                }
                if !milestones.is_empty() {
                    println!("\nMilestones:");
                    for m in &milestones {
                        let mark = if m.status == MilestoneStatus::Completed { "x" } else { " " };
                        println!("  [{}] ({}) {}{}", mark, short_id(&m.id), m.title, due(m.target_date));
                    }
                }
                if !content.is_empty() {
                    println!("\nContent:");
                    for c in &content {
                        println!("  ({}) [{}] {}", short_id(&c.id), c.status, c.title);
                    }
                }
            }
        }
        ProjectAction::Add {
            title,
            tagline,
            description,
            status,
            project_type,
            platforms,
            priority,
            target,
            category,
            milestones,
            cover,
            json,
        } => {
            let cover = read_upload(cover.as_deref())?;
            let draft = NewProject {
                title,
                tagline,
                description,
                status,
                project_type,
                platforms,
                target_date: target,
                priority,
                strategic_category: category,
                ..Default::default()
            };
            let project = studio.add_project(&draft, &milestones, cover.as_ref()).await?;
            ctx.note_demo_write();
            if json {
                print_json(&project)?;
            } else {
                println!("Created project ({}) - {}", short_id(&project.id), project.title);
            }
        }
        ProjectAction::Move { id, x, y, json } => {
            let items = studio.projects().items();
            let project_id = resolve(&items, &id)?.id.clone();
            let drop = MatrixDrop::at(x, y, today());
            let moved = studio.move_project(&project_id, drop).await?;
            ctx.note_demo_write();
            if json {
                print_json(&moved)?;
            } else {
                let when = moved
                    .target_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "no date".to_string());
                println!(
                    "Moved project ({}) - {} to {}, {}",
                    short_id(&moved.id),
                    moved.title,
                    priority_label(moved.priority),
                    when
                );
            }
        }
        ProjectAction::Matrix {
            category,
            project_type,
            search,
            json,
        } => {
            let today = today();
            let filter = MatrixFilter {
                category,
                project_type,
                search,
            };
            let projects = studio.matrix_projects(today, &filter);
            let entries: Vec<MatrixEntry> = projects
                .iter()
                .map(|p| {
                    let pos = matrix::position_of(p, today);
                    MatrixEntry {
                        id: &p.id,
                        title: &p.title,
                        priority: p.priority,
                        target_date: p.target_date,
                        x: pos.x,
                        y: pos.y,
                    }
                })
                .collect();
            if json {
                print_json(&entries)?;
            } else if entries.is_empty() {
                println!("Nothing on the matrix.");
            } else {
                println!("Matrix ({}):\n", today);
                for e in &entries {
                    println!(
                        "  ({}) [{}] x={:.1} y={:.1}{} {}",
                        short_id(e.id),
                        priority_label(e.priority),
                        e.x,
                        e.y,
                        due(e.target_date),
                        e.title
                    );
                }
            }
        }
        ProjectAction::Delete { id, force } => {
            let items = studio.projects().items();
            let project = resolve(&items, &id)?.clone();
            let prompt = format!("Delete project ({}) - {}?", short_id(&project.id), project.title);
            if !confirm(&prompt, force)? {
                println!("Cancelled.");
                return Ok(());
            }
            studio.delete_project(&project.id).await?;
            ctx.note_demo_write();
            println!("Deleted project ({}) - {}", short_id(&project.id), project.title);
        }
    }

    Ok(())
}

pub async fn handle_milestone(action: MilestoneAction, demo: bool) -> Result<()> {
    let ctx = open_context(demo)?;
    let studio = Studio::load(ctx.source.clone()).await;
    ensure_loaded(studio.error())?;

    match action {
        MilestoneAction::Add {
            project,
            title,
            target,
            json,
        } => {
            let project_id = project_ref(&studio, Some(project.as_str()))?.unwrap_or(project);
            let draft = NewProjectMilestone {
                project_id,
                title,
                status: MilestoneStatus::Pending,
                target_date: target,
            };
            let milestone = studio.add_milestone(&draft).await?;
            ctx.note_demo_write();
            if json {
                print_json(&milestone)?;
            } else {
                println!("Created milestone ({}) - {}", short_id(&milestone.id), milestone.title);
            }
        }
        MilestoneAction::Complete { id, undo, json } => {
            let items = studio.milestones().items();
            let milestone_id = resolve(&items, &id)?.id.clone();
            let milestone = studio.complete_milestone(&milestone_id, !undo).await?;
            ctx.note_demo_write();
            if json {
                print_json(&milestone)?;
            } else {
                println!(
                    "Milestone ({}) - {} is {}",
                    short_id(&milestone.id),
                    milestone.title,
                    milestone.status
                );
            }
        }
    }

    Ok(())
}

pub async fn handle_spark(action: SparkAction, demo: bool) -> Result<()> {
    let ctx = open_context(demo)?;
    let studio = Studio::load(ctx.source.clone()).await;
    ensure_loaded(studio.error())?;

    match action {
        SparkAction::List { json } => {
            let sparks = studio.sparks().items();
            if json {
                print_json(sparks.as_slice())?;
            } else if sparks.is_empty() {
                println!("No sparks found.");
            } else {
                println!("Sparks:\n");
                for s in sparks.iter() {
                    let linked = studio
                        .project_for(s.project_id.as_deref())
                        .map(|p| format!(" -> {}", p.title))
                        .unwrap_or_default();
                    println!(
                        "  ({}) [{}|{}] {}{}",
                        short_id(&s.id),
                        s.spark_type,
                        s.status,
                        s.title,
                        linked
                    );
                    if !s.tags.is_empty() {
                        println!("      tags: {}", s.tags.join(", "));
                    }
                }
            }
        }
        SparkAction::Add {
            title,
            spark_type,
            url,
            notes,
            tags,
            project,
            price,
            json,
        } => {
            let draft = NewSpark {
                spark_type,
                title,
                url,
                notes,
                tags,
                project_id: project_ref(&studio, project.as_deref())?,
                price,
            };
            let spark = studio.add_spark(&draft).await?;
            ctx.note_demo_write();
            if json {
                print_json(&spark)?;
            } else {
                println!("Created spark ({}) - {}", short_id(&spark.id), spark.title);
            }
        }
        SparkAction::Delete { id, force } => {
            let items = studio.sparks().items();
            let spark = resolve(&items, &id)?.clone();
            let prompt = format!("Delete spark ({}) - {}?", short_id(&spark.id), spark.title);
            if !confirm(&prompt, force)? {
                println!("Cancelled.");
                return Ok(());
            }
            studio.delete_spark(&spark.id).await?;
            ctx.note_demo_write();
            println!("Deleted spark ({}) - {}", short_id(&spark.id), spark.title);
        }
    }

    Ok(())
}

pub async fn handle_content(action: ContentAction, demo: bool) -> Result<()> {
    let ctx = open_context(demo)?;
    let studio = Studio::load(ctx.source.clone()).await;
    ensure_loaded(studio.error())?;

    match action {
        ContentAction::List { json } => {
            let content = studio.content().items();
            if json {
                print_json(content.as_slice())?;
            } else if content.is_empty() {
                println!("No content found.");
            } else {
                println!("Content:\n");
                for c in content.iter() {
                    let platforms: Vec<&str> = c.platforms.iter().map(|p| p.as_str()).collect();
                    let linked = studio
                        .project_for(c.project_id.as_deref())
                        .map(|p| format!(" -> {}", p.title))
                        .unwrap_or_default();
                    let publish = c
                        .publish_date
                        .map(|d| format!(" publish:{}", d))
                        .unwrap_or_default();
                    println!(
                        "  ({}) [{}] {}{}{}",
                        short_id(&c.id),
                        c.status,
                        c.title,
                        publish,
                        linked
                    );
                    if !platforms.is_empty() {
                        println!("      on: {}", platforms.join(", "));
                    }
                }
            }
        }
        ContentAction::Add {
            title,
            project,
            platforms,
            category,
            status,
            priority,
            publish,
            notes,
            json,
        } => {
            let draft = NewContent {
                title,
                project_id: project_ref(&studio, project.as_deref())?,
                platforms,
                category,
                status,
                priority,
                publish_date: publish,
                notes,
            };
            let content = studio.add_content(&draft).await?;
            ctx.note_demo_write();
            if json {
                print_json(&content)?;
            } else {
                println!("Created content ({}) - {}", short_id(&content.id), content.title);
            }
        }
    }

    Ok(())
}

pub async fn handle_press(action: PressAction, demo: bool) -> Result<()> {
    let ctx = open_context(demo)?;
    let studio = Studio::load(ctx.source.clone()).await;
    ensure_loaded(studio.error())?;

    match action {
        PressAction::List { json } => {
            let press = studio.press().items();
            if json {
                print_json(press.as_slice())?;
            } else if press.is_empty() {
                println!("No press found.");
            } else {
                println!("Press:\n");
                for p in press.iter() {
                    let deadline = p
                        .deadline
                        .map(|d| format!(" deadline:{}", d))
                        .unwrap_or_default();
                    println!(
                        "  ({}) [{}|{}]{} {} - {}",
                        short_id(&p.id),
                        p.press_type,
                        p.status,
                        deadline,
                        p.title,
                        p.organization
                    );
                }
            }
        }
        PressAction::Add {
            title,
            organization,
            press_type,
            status,
            deadline,
            url,
            notes,
            project,
            json,
        } => {
            let draft = NewPress {
                title,
                organization: organization.unwrap_or_default(),
                press_type,
                status,
                deadline,
                url,
                notes,
                project_id: project_ref(&studio, project.as_deref())?,
                ..Default::default()
            };
            let press = studio.add_press(&draft).await?;
            ctx.note_demo_write();
            if json {
                print_json(&press)?;
            } else {
                println!(
                    "Created press ({}) - {} ({})",
                    short_id(&press.id),
                    press.title,
                    press.organization
                );
            }
        }
    }

    Ok(())
}

pub async fn handle_network(action: NetworkAction, demo: bool) -> Result<()> {
    let ctx = open_context(demo)?;
    let studio = Studio::load(ctx.source.clone()).await;
    ensure_loaded(studio.error())?;

    match action {
        NetworkAction::List { json } => {
            let networks = studio.networks().items();
            if json {
                print_json(networks.as_slice())?;
            } else if networks.is_empty() {
                println!("No network entries found.");
            } else {
                println!("Network:\n");
                for n in networks.iter() {
                    let platform = n
                        .platform
                        .as_deref()
                        .map(|p| format!(" ({})", p))
                        .unwrap_or_default();
                    println!(
                        "  ({}) [{}|{}] {}{}",
                        short_id(&n.id),
                        n.network_type,
                        n.status,
                        n.name,
                        platform
                    );
                    if !n.tags.is_empty() {
                        println!("      tags: {}", n.tags.join(", "));
                    }
                }
            }
        }
        NetworkAction::Add {
            name,
            network_type,
            status,
            platform,
            url,
            notes,
            tags,
            event_date,
            json,
        } => {
            let draft = NewNetwork {
                network_type,
                name,
                platform,
                url,
                notes,
                status,
                event_date,
                tags: tags.as_deref().map(NewNetwork::parse_tags).unwrap_or_default(),
            };
            let network = studio.add_network(&draft).await?;
            ctx.note_demo_write();
            if json {
                print_json(&network)?;
            } else {
                println!("Created network entry ({}) - {}", short_id(&network.id), network.name);
            }
        }
    }

    Ok(())
}

// Vault

pub async fn handle_secret(action: SecretAction, demo: bool) -> Result<()> {
    let ctx = open_context(demo)?;
    let vault = Vault::load(ctx.source.clone(), ctx.prefs.clone()).await;
    ensure_loaded(vault.secrets().error())?;

    match action {
        SecretAction::List { json } => {
            let secrets = vault.secrets().items();
            if json {
                let shown: Vec<Secret> = secrets
                    .iter()
                    .map(|s| Secret {
                        password: vault.display_password(s).to_string(),
                        ..s.clone()
                    })
                    .collect();
                print_json(&shown)?;
            } else if secrets.is_empty() {
                println!("No secrets found.");
            } else {
                println!("Secrets:\n");
                for s in secrets.iter() {
                    println!(
                        "  ({}) {}  {}  {}",
                        short_id(&s.id),
                        s.service,
                        s.username.as_deref().unwrap_or("-"),
                        vault.display_password(s)
                    );
                }
            }
        }
        SecretAction::Add {
            service,
            username,
            password,
            notes,
            json,
        } => {
            let secret = vault
                .add_secret(
                    &service,
                    username.as_deref().unwrap_or(""),
                    &password,
                    notes.as_deref().unwrap_or(""),
                )
                .await?;
            ctx.note_demo_write();
            if json {
                let shown = Secret {
                    password: vault.display_password(&secret).to_string(),
                    ..secret.clone()
                };
                print_json(&shown)?;
            } else {
                println!("Stored secret ({}) - {}", short_id(&secret.id), secret.service);
            }
        }
        SecretAction::Delete { id, force } => {
            let items = vault.secrets().items();
            let secret = resolve(&items, &id)?.clone();
            let prompt = format!("Delete secret ({}) - {}?", short_id(&secret.id), secret.service);
            if !confirm(&prompt, force)? {
                println!("Cancelled.");
                return Ok(());
            }
            vault.delete_secret(&secret.id).await?;
            ctx.note_demo_write();
            println!("Deleted secret ({}) - {}", short_id(&secret.id), secret.service);
        }
    }

    Ok(())
}

pub async fn handle_clip(action: ClipAction, demo: bool) -> Result<()> {
    let ctx = open_context(demo)?;
    let vault = Vault::load(ctx.source.clone(), ctx.prefs.clone()).await;
    ensure_loaded(vault.clips().error())?;

    match action {
        ClipAction::List { json } => {
            let clips = vault.clips().items();
            if json {
                print_json(clips.as_slice())?;
            } else if clips.is_empty() {
                println!("Clipboard is empty.");
            } else {
                println!("Clipboard:\n");
                for c in clips.iter() {
                    let kind = if c.image_url.is_some() {
                        "image"
                    } else if c.is_url() {
                        "link"
                    } else {
                        "text"
                    };
                    println!("  ({}) [{}] {}", short_id(&c.id), kind, c.content);
                    if let Some(url) = &c.image_url {
                        println!("      {}", url);
                    }
                }
            }
        }
        ClipAction::Add { text, image, json } => {
            let image = read_upload(image.as_deref())?;
            let clip = vault
                .add_clip(text.as_deref().unwrap_or(""), image.as_ref())
                .await?;
            ctx.note_demo_write();
            if json {
                print_json(&clip)?;
            } else {
                println!("Saved clip ({})", short_id(&clip.id));
            }
        }
        ClipAction::Delete { id, force } => {
            let items = vault.clips().items();
            let clip = resolve(&items, &id)?.clone();
            let prompt = format!("Delete clip ({})?", short_id(&clip.id));
            if !confirm(&prompt, force)? {
                println!("Cancelled.");
                return Ok(());
            }
            vault.delete_clip(&clip.id).await?;
            ctx.note_demo_write();
            println!("Deleted clip ({})", short_id(&clip.id));
        }
    }

    Ok(())
}

pub async fn handle_vault(action: VaultAction, demo: bool) -> Result<()> {
    let ctx = open_context(demo)?;

    match action {
        VaultAction::Privacy { state } => {
            let vault = Vault::load(ctx.source.clone(), ctx.prefs.clone()).await;
            if let Some(state) = state {
                vault.set_private(state == Switch::On)?;
            }
            let label = if vault.is_private() { "on" } else { "off" };
            println!("Vault privacy: {}", label);
        }
    }

    Ok(())
}
