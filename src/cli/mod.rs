mod commands;
mod handlers;

pub use commands::{
    ClipAction, ClipCommand, Cli, Commands, ContentAction, ContentCommand, GoalAction, GoalCommand,
    MilestoneAction, MilestoneCommand, NetworkAction, NetworkCommand, PressAction, PressCommand,
    ProjectAction, ProjectCommand, SecretAction, SecretCommand, SparkAction, SparkCommand, Switch,
    VaultAction, VaultCommand,
};
pub use handlers::{
    handle_clip, handle_content, handle_goal, handle_init, handle_milestone, handle_network,
    handle_press, handle_project, handle_secret, handle_spark, handle_vault, resolve, MIN_PREFIX,
};
