//! Removal of generated output, one task per category.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::{BuildError, ConfigError};
use crate::graph::TaskId;
use crate::paths::Category;
use crate::tasks::{TaskContext, TaskReport};

/// Paths removed by the clean task `task`. Empty for non-clean tasks.
pub fn targets(ctx: &TaskContext, task: TaskId) -> Vec<PathBuf> {
    let paths = &ctx.paths;
    match task {
        TaskId::CleanDocs => vec![
            paths.entry(Category::Xml).source_dir.clone(),
            paths.entry(Category::Html).source_dir.clone(),
            paths.site_dir().to_path_buf(),
        ],
        TaskId::CleanFonts => vec![paths.entry(Category::Fonts).output_dir.clone()],
        TaskId::CleanImages => vec![paths.entry(Category::Images).output_dir.clone()],
        TaskId::CleanAssets => vec![paths.entry(Category::Assets).output_dir.clone()],
        TaskId::CleanScripts => {
            let out = &paths.entry(Category::Scripts).output_dir;
            ctx.bundles().iter().map(|b| out.join(&b.name)).collect()
        }
        TaskId::CleanStyles => {
            let styles = paths.entry(Category::Styles);
            vec![
                styles.output_dir.join(&ctx.config.styles.main),
                styles.source_dir.join(&ctx.config.styles.critical_output),
            ]
        }
        _ => Vec::new(),
    }
}

/// Run a clean task. Missing paths are skipped; any other failure is fatal.
pub fn clean(ctx: &TaskContext, task: TaskId) -> Result<TaskReport, BuildError> {
    let mut report = TaskReport::new(task);

    for target in targets(ctx, task) {
        ensure_removable(&ctx.root, &target)?;
        if remove(&target)? {
            tracing::debug!("Removed {}", target.display());
            report.files_written += 1;
        }
    }

    Ok(report)
}

/// Refuse to delete the project root itself or anything outside it.
fn ensure_removable(root: &Path, target: &Path) -> Result<(), ConfigError> {
    let safe = target.strip_prefix(root).is_ok_and(|rest| {
        rest.components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
            && rest.components().any(|c| matches!(c, Component::Normal(_)))
    });
    if safe {
        Ok(())
    } else {
        Err(ConfigError::UnsafeClean {
            path: target.to_path_buf(),
        })
    }
}

/// Returns whether something was removed.
fn remove(path: &Path) -> Result<bool, BuildError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(source) => {
            return Err(BuildError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let result = if metadata.is_dir() {
        // Concurrent clean tasks may share a directory (the site folder).
        fs::remove_dir_all(path).or_else(|_| fs::remove_dir_all(path))
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(_) if fs::symlink_metadata(path).is_err() => Ok(false),
        Err(source) => Err(BuildError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
