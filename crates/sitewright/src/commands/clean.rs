//! Remove generated output.

use std::path::Path;

use anyhow::Result;

pub async fn run(root: &Path, config: &Path) -> Result<()> {
    let report = super::pipeline(root, config)?.clean().await?;
    let removed: usize = report.tasks.iter().map(|t| t.files_written).sum();
    tracing::info!("Removed {} path(s) in {}ms", removed, report.duration_ms);
    Ok(())
}
