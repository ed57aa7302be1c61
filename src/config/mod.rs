#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

pub use toml_config::DiagConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "kg-diag")]
#[command(about = "Deployment diagnostics for the knowledge graph service")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Print reports as JSON instead of human readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory to save JSON reports into
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Verify graph database connectivity and run a trivial query
    ConnectDb(GraphArgs),

    /// Re-test cloud graph connectivity and count nodes
    CloudConnection(GraphArgs),

    /// Call the deployment initialization endpoints and read summary stats
    InitCloud(DeploymentArgs),

    /// Call the suggestion endpoint and replay the front-end rendering
    FrontendDisplay {
        /// Suggestion endpoint URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Only replay the built-in sample payload
        #[arg(long)]
        replay_only: bool,
    },

    /// Inspect knowledge points stored in the graph
    KnowledgePoints(GraphArgs),

    /// Check suggestion quality against expected knowledge points
    SuggestionAccuracy {
        #[command(flatten)]
        deployment: DeploymentArgs,

        /// Delay between suggestion requests in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Run every check in order
    All {
        /// Skip live suggestion requests in the front-end display check
        #[arg(long)]
        replay_only: bool,
    },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Args)]
pub struct GraphArgs {
    /// Graph database URI (neo4j+s://, bolt://, http://)
    #[arg(long)]
    pub uri: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub database: Option<String>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Args)]
pub struct DeploymentArgs {
    /// Base URL of the deployed API
    #[arg(long)]
    pub base_url: Option<String>,
}
