use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "review-suite")]
#[command(
    version,
    about = "Multi-stage code review: three fresh-eyes passes and a synthesis"
)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the review suite once and print the synthesized report
    Review {
        /// What to review: worktree, staged, pr <n>, recent <ref>.
        /// Omit to pick interactively.
        target: Vec<String>,
    },
    /// Chat with the agent; /review starts a suite run
    Chat,
    /// Print the compiled prompt for one stage
    Prompt {
        /// Stage id (correctness, security, design, synthesize)
        #[arg(short, long)]
        stage: String,
        /// What to review
        target: Vec<String>,
    },
    /// List the pipeline stages and where their templates come from
    Stages,
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default config.toml file
    Init,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Review { target } => cmd::cmd_review(&project_dir, cli.verbose, target).await?,
        Commands::Chat => cmd::cmd_chat(&project_dir, cli.verbose).await?,
        Commands::Prompt { stage, target } => cmd::cmd_prompt(&project_dir, stage, target)?,
        Commands::Stages => cmd::cmd_stages(&project_dir)?,
        Commands::Config { command } => cmd::cmd_config(&project_dir, command.clone())?,
    }

    Ok(())
}
