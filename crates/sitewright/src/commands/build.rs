//! Full site build.

use std::path::Path;

use anyhow::Result;

/// Run the build command.
pub async fn run(root: &Path, config: &Path) -> Result<()> {
    tracing::info!("Building documentation site...");

    let report = super::pipeline(root, config)?.build().await?;

    tracing::info!(
        "Built {} files in {}ms ({} warnings)",
        report.files_written(),
        report.duration_ms,
        report.warning_count()
    );
    tracing::info!("Output: {}", report.site_dir.display());

    Ok(())
}
