use anyhow::Result;
use builderd::{cli, config::HostConfig, HostContext};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "builderd",
    about = "AI Builder Host — project persistence and assistant core",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Data directory for projects, config, and the SQLite database
    #[arg(long, env = "BUILDERD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "BUILDERD_LOG")]
    log: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new project seeded with the starter files and design.
    Init {
        #[arg(long, default_value = "ai-builder-project")]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List projects, most recently updated first.
    Projects,
    /// Print a project's file tree, design tree, and message count.
    Show { project_id: String },
    /// Send one chat message and print the assistant's scripted replies.
    Chat { project_id: String, text: String },
    /// Delete a project and all of its records.
    Delete { project_id: String },
    /// Delete projects untouched for --days days, then VACUUM.
    Prune {
        #[arg(long)]
        days: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = HostConfig::load(args.data_dir)?;
    let level = args.log.clone().unwrap_or_else(|| config.log.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let ctx = HostContext::new(config).await?;
    match args.command {
        Some(Command::Init { name, description }) => cli::run_init(&ctx, name, description).await,
        Some(Command::Projects) => cli::run_projects(&ctx).await,
        Some(Command::Show { project_id }) => cli::run_show(&ctx, &project_id).await,
        Some(Command::Chat { project_id, text }) => cli::run_chat(&ctx, &project_id, &text).await,
        Some(Command::Delete { project_id }) => cli::run_delete(&ctx, &project_id).await,
        Some(Command::Prune { days }) => cli::run_prune(&ctx, days).await,
        None => cli::run_status(&ctx).await,
    }
}
