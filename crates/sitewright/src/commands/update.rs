//! Tool dependency refresh.

use std::path::Path;

use anyhow::Result;

pub async fn run(root: &Path, config: &Path) -> Result<()> {
    super::pipeline(root, config)?.update().await?;
    Ok(())
}
