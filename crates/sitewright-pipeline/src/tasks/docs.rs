//! Documentation generation through external tools.

use crate::config::CommandSpec;
use crate::error::BuildError;
use crate::exec::run_command;
use crate::graph::TaskId;
use crate::tasks::{TaskContext, TaskReport};

/// Extract the intermediate XML (`doxygen Doxyfile` by default).
pub async fn build_docs_xml(ctx: &TaskContext) -> Result<TaskReport, BuildError> {
    run_docs_command(ctx, TaskId::DocsXml, &ctx.config.docs.extractor).await
}

/// Render the XML into HTML pages (`python make_docs.py` by default).
pub async fn build_docs_html(ctx: &TaskContext) -> Result<TaskReport, BuildError> {
    run_docs_command(ctx, TaskId::DocsHtml, &ctx.config.docs.renderer).await
}

async fn run_docs_command(
    ctx: &TaskContext,
    task: TaskId,
    command: &CommandSpec,
) -> Result<TaskReport, BuildError> {
    let report = TaskReport::new(task);
    if !command.enabled {
        tracing::info!("[{}] `{}` disabled, skipping", task, command);
        return Ok(report);
    }

    run_command(command, &ctx.root).await?;
    Ok(report)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use tempfile::tempdir;

    #[tokio::test]
    async fn disabled_command_is_a_no_op() {
        let temp = tempdir().unwrap();
        let mut config = PipelineConfig::default();
        config.docs.extractor.enabled = false;
        let ctx = TaskContext::new(config, temp.path()).unwrap();

        let report = build_docs_xml(&ctx).await.unwrap();

        assert_eq!(report.task, TaskId::DocsXml);
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn runs_in_the_project_root() {
        let temp = tempdir().unwrap();
        let mut config = PipelineConfig::default();
        config.docs.renderer = CommandSpec::new("sh", &["-c", "mkdir -p Docs/html && echo ok > Docs/html/index.html"]);
        let ctx = TaskContext::new(config, temp.path()).unwrap();

        build_docs_html(&ctx).await.unwrap();

        assert!(temp.path().join("Docs/html/index.html").exists());
    }

    #[tokio::test]
    async fn failing_tool_is_fatal() {
        let temp = tempdir().unwrap();
        let mut config = PipelineConfig::default();
        config.docs.extractor = CommandSpec::new("sh", &["-c", "exit 1"]);
        let ctx = TaskContext::new(config, temp.path()).unwrap();

        let err = build_docs_xml(&ctx).await.unwrap_err();

        assert!(matches!(err, BuildError::Command { .. }));
    }
}
