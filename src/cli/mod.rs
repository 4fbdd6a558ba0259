//! CLI module for Journey
//!
//! Provides commands:
//! - `serve`: Start the HTTP server (default)
//! - `list`: Print the timeline from the configured store

use clap::{Parser, Subcommand, ValueEnum};
use journey_store::MemoryOrder;

pub mod list;

/// Journey memory timeline
#[derive(Parser, Debug)]
#[command(name = "journey")]
#[command(about = "Shared memory timeline server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (default)
    Serve,
    /// Print the memory timeline
    List {
        /// Sort key, newest first
        #[arg(long, value_enum, default_value_t = SortKey::Date)]
        sort: SortKey,
        /// Only memories owned by this user id
        #[arg(long)]
        owner: Option<String>,
    },
}

/// Timeline sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// When the memory happened
    Date,
    /// When it was recorded
    Created,
}

impl From<SortKey> for MemoryOrder {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Date => MemoryOrder::Date,
            SortKey::Created => MemoryOrder::CreatedAt,
        }
    }
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::List { sort, owner }) => list::run(sort.into(), owner).await,
        Some(Commands::Serve) | None => crate::server::run().await,
    }
}
