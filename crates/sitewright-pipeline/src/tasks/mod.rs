//! Individual build steps.
//!
//! Asset steps (`styles`, `scripts`, `images`, `copy`, `html`) never fail the
//! build: every problem is logged and recorded on the step's report. Clean
//! and documentation steps return [`BuildError`] and stop the pipeline.

pub mod clean;
pub mod copy;
pub mod docs;
pub mod html;
pub mod images;
pub mod scripts;
pub mod styles;

use std::fs;
use std::path::{Path, PathBuf};

use sitewright_assets::{AssetError, FontRewriter, StyleProcessor};

use crate::config::PipelineConfig;
use crate::error::{BuildError, ConfigError};
use crate::graph::TaskId;
use crate::paths::{FilePattern, PathTable};

/// Resolved configuration shared by all tasks.
#[derive(Debug)]
pub struct TaskContext {
    pub root: PathBuf,
    pub config: PipelineConfig,
    pub paths: PathTable,
    pub(crate) styles: StyleProcessor,
    pub(crate) fonts: FontRewriter,
    pub(crate) bundles: Vec<ScriptBundle>,
}

/// A script bundle with parsed source patterns.
#[derive(Debug, Clone)]
pub struct ScriptBundle {
    pub name: String,
    pub patterns: Vec<FilePattern>,
}

impl TaskContext {
    /// Resolve `config` against the project `root`, validating paths,
    /// patterns and browser targets up front.
    pub fn new(config: PipelineConfig, root: impl Into<PathBuf>) -> Result<Self, BuildError> {
        let root = root.into();
        let paths = PathTable::from_config(&config.paths, &root)?;

        let styles = StyleProcessor::new(config.styles.browsers.as_slice())
            .map_err(|e| ConfigError::Browsers(e.to_string()))?;
        let fonts = FontRewriter::new(
            config.styles.font_service.clone(),
            config.styles.fonts.clone(),
        );

        let bundles = config
            .scripts
            .bundles
            .iter()
            .map(|bundle| {
                let patterns = bundle
                    .sources
                    .iter()
                    .map(|source| FilePattern::parse(source))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok::<_, ConfigError>(ScriptBundle {
                    name: bundle.name.clone(),
                    patterns,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            root,
            config,
            paths,
            styles,
            fonts,
            bundles,
        })
    }

    pub fn bundles(&self) -> &[ScriptBundle] {
        &self.bundles
    }
}

/// Outcome of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub task: TaskId,

    /// Files written (or paths removed, for clean tasks)
    pub files_written: usize,

    /// Non-fatal problems, already logged
    pub warnings: Vec<String>,
}

impl TaskReport {
    pub fn new(task: TaskId) -> Self {
        Self {
            task,
            files_written: 0,
            warnings: Vec::new(),
        }
    }

    /// Log and record a non-fatal error.
    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("[{}] {}", self.task, message);
        self.warnings.push(message);
    }
}

/// Errors inside an asset step; these end up as report warnings.
#[derive(Debug, thiserror::Error)]
pub(crate) enum StepError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, StepError> {
    fs::read(path).map_err(|source| StepError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_text(path: &Path) -> Result<String, StepError> {
    fs::read_to_string(path).map_err(|source| StepError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `contents`, creating parent directories as needed.
pub(crate) fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), StepError> {
    let io_err = |source: std::io::Error| StepError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)
}

/// Copy `source` to `output`, creating parent directories as needed.
pub(crate) fn copy_file(source: &Path, output: &Path) -> Result<(), StepError> {
    let io_err = |path: &Path, source: std::io::Error| StepError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    fs::copy(source, output).map_err(|e| io_err(source, e))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::Path;

    use super::TaskContext;
    use crate::config::PipelineConfig;

    /// Context for the default layout rooted at `root`.
    pub fn context(root: &Path) -> TaskContext {
        TaskContext::new(PipelineConfig::default(), root).unwrap()
    }

    pub fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}
