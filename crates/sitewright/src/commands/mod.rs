pub mod build;
pub mod clean;
pub mod graph;
pub mod update;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sitewright_pipeline::{Pipeline, PipelineConfig};

/// Load `config` (relative paths resolve against `root`) if it exists.
/// A missing file means the default pipeline; a malformed one is an error.
pub fn load_config(root: &Path, config: &Path) -> Result<PipelineConfig> {
    let path = root.join(config);
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(PipelineConfig::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed = PipelineConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(parsed)
}

pub fn pipeline(root: &Path, config: &Path) -> Result<Pipeline> {
    let config = load_config(root, config)?;
    Ok(Pipeline::new(config, root)?)
}
