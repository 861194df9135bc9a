//! Pipeline error types.

use std::path::PathBuf;
use std::process::ExitStatus;

use crate::graph::GraphError;

/// Errors that stop a build.
///
/// Asset transform failures are not represented here: they are logged and
/// reported as task warnings instead.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    Command { command: String, status: ExitStatus },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Task graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Task {task} did not complete: {message}")]
    Join { task: String, message: String },
}

/// Errors in the pipeline configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid file pattern `{pattern}`: {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("Output directory {} for {category} is not inside site directory {}", output.display(), site.display())]
    OutsideSite {
        category: String,
        output: PathBuf,
        site: PathBuf,
    },

    #[error("Refusing to delete {}: not inside project root", path.display())]
    UnsafeClean { path: PathBuf },

    #[error("Invalid browser targets: {0}")]
    Browsers(String),
}
