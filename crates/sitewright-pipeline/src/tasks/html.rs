//! Final page pass: inline marked resources and collapse whitespace.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use sitewright_assets::{collapse_whitespace, Inlined, Inliner};

use crate::graph::TaskId;
use crate::paths::Category;
use crate::tasks::{read_text, write_file, StepError, TaskContext, TaskReport};

struct PageResult {
    source: PathBuf,
    /// Inlining outcome, with the markup already written out
    outcome: Result<Inlined, StepError>,
}

/// Process every generated page into the site folder.
pub fn build_html(ctx: &TaskContext) -> TaskReport {
    let mut report = TaskReport::new(TaskId::Html);
    let entry = ctx.paths.entry(Category::Html);
    let inliner = Inliner::new(&entry.source_dir).minify(ctx.config.html.minify_inline);
    let collapse = ctx.config.html.collapse_whitespace;

    let results: Vec<PageResult> = entry
        .collect()
        .into_par_iter()
        .map(|source| {
            let output = entry.mirrored(&source);
            let outcome = process_page(&inliner, collapse, &source, &output);
            PageResult { source, outcome }
        })
        .collect();

    let mut inlined = 0;
    for page in results {
        match page.outcome {
            Ok(result) => {
                inlined += result.inlined;
                report.files_written += 1;
                for path in result.missing {
                    report.warn(format!(
                        "{}: cannot inline {}",
                        page.source.display(),
                        path.display()
                    ));
                }
                for path in result.unminified {
                    report.warn(format!(
                        "{}: inlined {} unminified",
                        page.source.display(),
                        path.display()
                    ));
                }
            }
            Err(e) => report.warn(format!("skipped {}: {}", page.source.display(), e)),
        }
    }

    tracing::info!(
        "Wrote {} page(s), {} resource(s) inlined",
        report.files_written,
        inlined
    );
    report
}

fn process_page(
    inliner: &Inliner,
    collapse: bool,
    source: &Path,
    output: &Path,
) -> Result<Inlined, StepError> {
    let html = read_text(source)?;
    let page_dir = source.parent().unwrap_or(Path::new(""));
    let mut result = inliner.inline(&html, page_dir);

    let html = if collapse {
        collapse_whitespace(&result.html)
    } else {
        std::mem::take(&mut result.html)
    };
    write_file(output, html)?;
    Ok(result)
}
