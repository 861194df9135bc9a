//! Build pipeline for a generated documentation site.
//!
//! Cleans previous output, runs the external documentation generator, then
//! builds scripts, images, assets, styles and fonts in parallel before
//! assembling the final HTML pages.

pub mod builder;
pub mod config;
pub mod error;
pub mod exec;
pub mod graph;
pub mod paths;
pub mod tasks;

pub use builder::{BuildReport, Pipeline};
pub use config::{CommandSpec, PipelineConfig};
pub use error::{BuildError, ConfigError};
pub use graph::{GraphError, TaskGraph, TaskId, TaskMode};
pub use paths::{Category, FilePattern, PathEntry, PathTable};
pub use tasks::{TaskContext, TaskReport};
