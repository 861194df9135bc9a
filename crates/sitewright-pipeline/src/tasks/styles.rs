//! Stylesheet build: primary and critical sheets, compiled independently.

use std::path::Path;

use crate::graph::TaskId;
use crate::paths::Category;
use crate::tasks::{read_text, write_file, StepError, TaskContext, TaskReport};

/// Build the primary stylesheet into the site CSS folder and the critical
/// stylesheet back into the styles source folder (for later inlining).
pub fn build_styles(ctx: &TaskContext) -> TaskReport {
    let mut report = TaskReport::new(TaskId::Styles);
    let entry = ctx.paths.entry(Category::Styles);
    let config = &ctx.config.styles;

    let main_source = entry.source_dir.join(&config.main);
    let main_output = entry.output_dir.join(&config.main);
    let critical_source = entry.source_dir.join(&config.critical);
    let critical_output = entry.source_dir.join(&config.critical_output);

    let (main, critical) = rayon::join(
        || build_main(ctx, &main_source, &main_output),
        || build_critical(ctx, &critical_source, &critical_output),
    );

    for (result, output) in [(main, &main_output), (critical, &critical_output)] {
        match result {
            Ok(()) => {
                tracing::debug!("Wrote {}", output.display());
                report.files_written += 1;
            }
            Err(e) => report.warn(format!("{}: {}", output.display(), e)),
        }
    }

    report
}

fn build_main(ctx: &TaskContext, source: &Path, output: &Path) -> Result<(), StepError> {
    let css = read_text(source)?;
    let compiled = ctx.styles.process(&css, true)?;
    write_file(output, compiled)
}

fn build_critical(ctx: &TaskContext, source: &Path, output: &Path) -> Result<(), StepError> {
    let css = read_text(source)?;
    let with_fonts = ctx.fonts.rewrite(&css);
    let compiled = ctx.styles.process(&with_fonts, true)?;
    write_file(output, compiled)
}
