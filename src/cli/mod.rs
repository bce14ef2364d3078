pub mod publish;
pub mod copy;
pub mod check;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gitcopy")]
#[command(about = "Publish processed source trees to git branches")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone the destination repo, copy the processed tree in, commit, push
    Publish {
        /// Path to the tree to publish
        root_path: PathBuf,

        /// Destination repository (path or URL); may also come from gitcopy.toml
        #[arg(long = "to-repo")]
        to_repo: Option<String>,

        /// Target branch; reused if it exists remotely, created otherwise
        #[arg(long)]
        branch: Option<String>,

        /// Ref to branch from, only used when creating a new branch
        #[arg(long = "start-point")]
        start_point: Option<String>,

        /// Commit message
        #[arg(short = 'm', long = "commit-message")]
        commit_message: Option<String>,

        /// Purge the clone (everything but .git) before copying
        #[arg(long = "delete-everything")]
        delete_everything: bool,

        /// Gitignore-style glob to skip; repeatable
        #[arg(long = "ignore", value_name = "PATTERN")]
        ignore: Vec<String>,

        /// Content variant to select in snippet markup
        #[arg(long)]
        state: Option<String>,
    },

    /// Run the copy engine into a local directory, no git involved
    Copy {
        /// Path to the tree to process
        root_path: PathBuf,

        /// Directory to populate
        #[arg(short, long)]
        destination: PathBuf,

        /// Gitignore-style glob to skip; repeatable
        #[arg(long = "ignore", value_name = "PATTERN")]
        ignore: Vec<String>,

        /// Content variant to select in snippet markup
        #[arg(long)]
        state: Option<String>,
    },

    /// Validate snippet markup without writing anywhere permanent
    Check {
        /// Path to the tree to validate
        root_path: PathBuf,

        /// Gitignore-style glob to skip; repeatable
        #[arg(long = "ignore", value_name = "PATTERN")]
        ignore: Vec<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Publish {
                root_path,
                to_repo,
                branch,
                start_point,
                commit_message,
                delete_everything,
                ignore,
                state,
            } => {
                publish::run(
                    root_path,
                    to_repo,
                    branch,
                    start_point,
                    commit_message,
                    delete_everything,
                    ignore,
                    state,
                    self.verbose,
                )
                .await
            }
            Commands::Copy {
                root_path,
                destination,
                ignore,
                state,
            } => copy::run(root_path, destination, ignore, state).await,
            Commands::Check { root_path, ignore } => check::run(root_path, ignore).await,
        }
    }
}
