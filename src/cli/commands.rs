use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::BackendKind;
use crate::entity::{
    ContentCategory, ContentStatus, GoalCategory, GoalPriority, GoalStatus, NetworkStatus,
    NetworkType, Platform, PressStatus, PressType, PriorityLevel, ProjectStatus, ProjectType,
    SparkType, StrategicCategory,
};

#[derive(Parser, Debug)]
#[command(name = "karros")]
#[command(version, about = "Goals, studio projects and a personal vault from the terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Work against the built-in demo data. Nothing is saved.
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new karros project in the current directory
    Init {
        /// Where records live (sqlite, rest)
        #[arg(long, default_value = "sqlite")]
        backend: BackendKind,

        /// Base URL of the hosted service (rest backend)
        #[arg(long)]
        url: Option<String>,

        /// Public API key of the hosted service (rest backend)
        #[arg(long)]
        anon_key: Option<String>,

        /// Owner recorded on goals written by the local backend
        #[arg(long)]
        user: Option<String>,
    },

    /// Goals and their milestones
    Goal(GoalCommand),

    /// Studio projects and the priority matrix
    Project(ProjectCommand),

    /// Project milestones
    Milestone(MilestoneCommand),

    /// Captured ideas, tools and resources
    Spark(SparkCommand),

    /// Content pipeline
    Content(ContentCommand),

    /// Competitions, grants, awards and features
    Press(PressCommand),

    /// People, communities and events
    Network(NetworkCommand),

    /// Stored credentials
    Secret(SecretCommand),

    /// Shared clipboard
    Clip(ClipCommand),

    /// Vault settings
    Vault(VaultCommand),
}

#[derive(Args, Debug)]
pub struct GoalCommand {
    #[command(subcommand)]
    pub action: GoalAction,
}

#[derive(Subcommand, Debug)]
pub enum GoalAction {
    /// List goals with their milestones
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a goal
    Add {
        /// Goal title
        title: String,

        #[arg(long, short = 'd')]
        description: Option<String>,

        /// finance, health, career, personal
        #[arg(long, default_value = "personal")]
        category: GoalCategory,

        /// super, high, mid, low
        #[arg(long, default_value = "mid")]
        priority: GoalPriority,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        target: Option<NaiveDate>,

        /// Milestone title (can be specified multiple times, in order)
        #[arg(long = "milestone", short = 'm')]
        milestones: Vec<String>,

        /// Vision board image to upload
        #[arg(long)]
        vision: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Flip a goal milestone between done and not done
    Toggle {
        /// Milestone ID (or unique prefix)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update a goal
    Update {
        /// Goal ID (or unique prefix)
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, short = 'd')]
        description: Option<String>,

        /// active, completed, archived
        #[arg(long)]
        status: Option<GoalStatus>,

        #[arg(long)]
        category: Option<GoalCategory>,

        #[arg(long)]
        priority: Option<GoalPriority>,

        /// Target date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_target")]
        target: Option<NaiveDate>,

        /// Remove the target date
        #[arg(long)]
        clear_target: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a goal
    Delete {
        /// Goal ID (or unique prefix)
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand, Debug)]
pub enum ProjectAction {
    /// List projects, newest first
    List {
        /// Include archived projects
        #[arg(long)]
        all: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a project with its milestones and content
    Show {
        /// Project ID (or unique prefix)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a project
    Add {
        /// Project title
        title: String,

        #[arg(long)]
        tagline: Option<String>,

        #[arg(long, short = 'd')]
        description: Option<String>,

        /// idea, research, active, paused, shipped, archived
        #[arg(long, default_value = "idea")]
        status: ProjectStatus,

        /// Project type, e.g. "Product Design"
        #[arg(long = "type")]
        project_type: Option<ProjectType>,

        /// Platform (can be specified multiple times)
        #[arg(long = "platform")]
        platforms: Vec<Platform>,

        /// urgent, high, mid, low
        #[arg(long)]
        priority: Option<PriorityLevel>,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        target: Option<NaiveDate>,

        #[arg(long)]
        category: Option<StrategicCategory>,

        /// Milestone title (can be specified multiple times)
        #[arg(long = "milestone", short = 'm')]
        milestones: Vec<String>,

        /// Cover image to upload
        #[arg(long)]
        cover: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drop a project onto the priority matrix at (x, y), in percent
    Move {
        /// Project ID (or unique prefix)
        id: String,

        /// Horizontal position: today on the left, two weeks out on the right
        x: f64,

        /// Vertical position: urgent at the top, low at the bottom
        y: f64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the priority matrix
    Matrix {
        /// Only this strategic category
        #[arg(long)]
        category: Option<StrategicCategory>,

        /// Only this project type
        #[arg(long = "type")]
        project_type: Option<ProjectType>,

        /// Match title or tagline (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a project
    Delete {
        /// Project ID (or unique prefix)
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct MilestoneCommand {
    #[command(subcommand)]
    pub action: MilestoneAction,
}

#[derive(Subcommand, Debug)]
pub enum MilestoneAction {
    /// Add a milestone to a project
    Add {
        /// Project ID (or unique prefix)
        project: String,

        /// Milestone title
        title: String,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        target: Option<NaiveDate>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a project milestone completed
    Complete {
        /// Milestone ID (or unique prefix)
        id: String,

        /// Mark it pending again instead
        #[arg(long)]
        undo: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct SparkCommand {
    #[command(subcommand)]
    pub action: SparkAction,
}

#[derive(Subcommand, Debug)]
pub enum SparkAction {
    /// List sparks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Capture a spark
    Add {
        /// Spark title
        title: String,

        /// idea, tool, item, resource, event, person
        #[arg(long = "type", default_value = "idea")]
        spark_type: SparkType,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Tags (can be specified multiple times)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,

        /// Linked project ID (or unique prefix)
        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        price: Option<f64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a spark
    Delete {
        /// Spark ID (or unique prefix)
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct ContentCommand {
    #[command(subcommand)]
    pub action: ContentAction,
}

#[derive(Subcommand, Debug)]
pub enum ContentAction {
    /// List content
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Plan a piece of content
    Add {
        /// Content title
        title: String,

        /// Linked project ID (or unique prefix)
        #[arg(long)]
        project: Option<String>,

        /// Platform (can be specified multiple times)
        #[arg(long = "platform")]
        platforms: Vec<Platform>,

        #[arg(long)]
        category: Option<ContentCategory>,

        #[arg(long, default_value = "idea")]
        status: ContentStatus,

        #[arg(long)]
        priority: Option<PriorityLevel>,

        /// Publish date (YYYY-MM-DD)
        #[arg(long)]
        publish: Option<NaiveDate>,

        #[arg(long)]
        notes: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct PressCommand {
    #[command(subcommand)]
    pub action: PressAction,
}

#[derive(Subcommand, Debug)]
pub enum PressAction {
    /// List press opportunities
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Track a press opportunity
    Add {
        /// Title of the award, grant or feature
        title: String,

        /// Organization running it
        #[arg(long, short = 'o')]
        organization: Option<String>,

        /// competition, grant, award, feature, accelerator, other
        #[arg(long = "type", default_value = "other")]
        press_type: PressType,

        #[arg(long, default_value = "not_started")]
        status: PressStatus,

        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<NaiveDate>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Linked project ID (or unique prefix)
        #[arg(long)]
        project: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct NetworkCommand {
    #[command(subcommand)]
    pub action: NetworkAction,
}

#[derive(Subcommand, Debug)]
pub enum NetworkAction {
    /// List contacts, communities and events
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a contact, community or event
    Add {
        /// Name
        name: String,

        /// person, community, event
        #[arg(long = "type", default_value = "person")]
        network_type: NetworkType,

        #[arg(long, default_value = "interested")]
        status: NetworkStatus,

        #[arg(long)]
        platform: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        event_date: Option<NaiveDate>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct SecretCommand {
    #[command(subcommand)]
    pub action: SecretAction,
}

#[derive(Subcommand, Debug)]
pub enum SecretAction {
    /// List stored credentials
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Store a credential
    Add {
        /// Service name
        service: String,

        #[arg(long, short = 'u')]
        username: Option<String>,

        #[arg(long, short = 'p')]
        password: String,

        #[arg(long)]
        notes: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a credential
    Delete {
        /// Secret ID (or unique prefix)
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct ClipCommand {
    #[command(subcommand)]
    pub action: ClipAction,
}

#[derive(Subcommand, Debug)]
pub enum ClipAction {
    /// List the 20 newest clips
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save text or an image
    Add {
        /// Text to save
        text: Option<String>,

        /// Image to upload
        #[arg(long)]
        image: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a clip
    Delete {
        /// Clip ID (or unique prefix)
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct VaultCommand {
    #[command(subcommand)]
    pub action: VaultAction,
}

#[derive(Subcommand, Debug)]
pub enum VaultAction {
    /// Show or set whether passwords are masked
    Privacy {
        /// Turn masking on or off; omit to show the current setting
        state: Option<Switch>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}
