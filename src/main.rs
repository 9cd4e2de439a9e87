use clap::Parser;
use karros::cli::{
    handle_clip, handle_content, handle_goal, handle_init, handle_milestone, handle_network,
    handle_press, handle_project, handle_secret, handle_spark, handle_vault, Cli, Commands,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("KARROS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let demo = cli.demo;

    let result = match cli.command {
        Commands::Init {
            backend,
            url,
            anon_key,
            user,
        } => handle_init(backend, url, anon_key, user),
        Commands::Goal(cmd) => handle_goal(cmd.action, demo).await,
        Commands::Project(cmd) => handle_project(cmd.action, demo).await,
        Commands::Milestone(cmd) => handle_milestone(cmd.action, demo).await,
        Commands::Spark(cmd) => handle_spark(cmd.action, demo).await,
        Commands::Content(cmd) => handle_content(cmd.action, demo).await,
        Commands::Press(cmd) => handle_press(cmd.action, demo).await,
        Commands::Network(cmd) => handle_network(cmd.action, demo).await,
        Commands::Secret(cmd) => handle_secret(cmd.action, demo).await,
        Commands::Clip(cmd) => handle_clip(cmd.action, demo).await,
        Commands::Vault(cmd) => handle_vault(cmd.action, demo).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
