//! Script bundling.

use std::collections::HashSet;
use std::path::PathBuf;

use sitewright_assets::{concat_scripts, minify_js};

use crate::graph::TaskId;
use crate::paths::Category;
use crate::tasks::{read_text, write_file, ScriptBundle, StepError, TaskContext, TaskReport};

/// Concatenate and minify every configured bundle into the site JS folder.
pub fn build_scripts(ctx: &TaskContext) -> TaskReport {
    let mut report = TaskReport::new(TaskId::Scripts);

    for bundle in ctx.bundles() {
        let files = bundle_files(ctx, bundle);
        if files.is_empty() {
            report.warn(format!("bundle {} matched no files", bundle.name));
            continue;
        }

        match build_bundle(ctx, bundle, &files, &mut report) {
            Ok(output) => {
                tracing::info!(
                    "Bundled {} script(s) into {}",
                    files.len(),
                    output.display()
                );
                report.files_written += 1;
            }
            Err(e) => report.warn(format!("bundle {}: {}", bundle.name, e)),
        }
    }

    report
}

/// Source files of `bundle` in pattern order, each file at most once.
pub fn bundle_files(ctx: &TaskContext, bundle: &ScriptBundle) -> Vec<PathBuf> {
    let source_dir = &ctx.paths.entry(Category::Scripts).source_dir;
    let mut seen = HashSet::new();
    bundle
        .patterns
        .iter()
        .flat_map(|pattern| pattern.collect(source_dir))
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

fn build_bundle(
    ctx: &TaskContext,
    bundle: &ScriptBundle,
    files: &[PathBuf],
    report: &mut TaskReport,
) -> Result<PathBuf, StepError> {
    let sources = files
        .iter()
        .map(|path| read_text(path))
        .collect::<Result<Vec<_>, _>>()?;
    let joined = concat_scripts(sources.iter().map(String::as_str));

    let code = match minify_js(&joined) {
        Ok(minified) => minified,
        Err(e) => {
            report.warn(format!("bundle {} written unminified: {}", bundle.name, e));
            joined
        }
    };

    let output = ctx
        .paths
        .entry(Category::Scripts)
        .output_dir
        .join(&bundle.name);
    write_file(&output, code)?;
    Ok(output)
}
