//! External command execution.
//!
//! Commands inherit the terminal so tool output streams straight through.
//! The caller waits for exit; a failed command is always fatal.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::CommandSpec;
use crate::error::BuildError;

/// Run `spec` in `cwd` and wait for it to exit successfully.
pub async fn run_command(spec: &CommandSpec, cwd: &Path) -> Result<(), BuildError> {
    let command_line = spec.to_string();
    tracing::info!("Running `{}`", command_line);

    let status = Command::new(&spec.program)
        .args(&spec.args)
        .current_dir(cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|source| BuildError::Spawn {
            command: command_line.clone(),
            source,
        })?;

    if !status.success() {
        return Err(BuildError::Command {
            command: command_line,
            status,
        });
    }

    tracing::debug!("`{}` finished", command_line);
    Ok(())
}
