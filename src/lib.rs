pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::adapters::{graph_http::HttpGraphClient, http::DeploymentClient, storage::LocalStorage};
pub use crate::config::DiagConfig;
pub use crate::core::runner::{DiagnosticRunner, OutputFormat, RunOutcome};
pub use crate::utils::error::{DiagError, Result};
