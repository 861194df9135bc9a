//! Verbatim copies: downloadable assets and font files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::graph::TaskId;
use crate::paths::Category;
use crate::tasks::{copy_file, TaskContext, TaskReport};

/// Copy assets into the site, preserving their relative layout.
pub fn build_assets(ctx: &TaskContext) -> TaskReport {
    let mut report = TaskReport::new(TaskId::Assets);
    let entry = ctx.paths.entry(Category::Assets);

    for source in entry.collect() {
        match copy_file(&source, &entry.mirrored(&source)) {
            Ok(()) => report.files_written += 1,
            Err(e) => report.warn(e.to_string()),
        }
    }

    tracing::info!("Copied {} asset(s)", report.files_written);
    report
}

/// Copy fonts into a single flat folder.
///
/// Files with the same name overwrite each other in path order.
pub fn build_fonts(ctx: &TaskContext) -> TaskReport {
    let mut report = TaskReport::new(TaskId::Fonts);
    let entry = ctx.paths.entry(Category::Fonts);
    let mut written: HashMap<PathBuf, PathBuf> = HashMap::new();

    for source in entry.collect() {
        let Some(output) = flatten_destination(&source, &entry.output_dir) else {
            report.warn(format!("{}: no file name", source.display()));
            continue;
        };

        if let Some(previous) = written.get(&output) {
            tracing::warn!(
                "{} overwrites {} at {}",
                source.display(),
                previous.display(),
                output.display()
            );
        }

        match copy_file(&source, &output) {
            Ok(()) => {
                report.files_written += 1;
                written.insert(output, source);
            }
            Err(e) => report.warn(e.to_string()),
        }
    }

    tracing::info!("Copied {} font file(s)", report.files_written);
    report
}

/// Destination of a font file: its bare name inside `out_dir`.
pub fn flatten_destination(path: &Path, out_dir: &Path) -> Option<PathBuf> {
    path.file_name().map(|name| out_dir.join(name))
}
