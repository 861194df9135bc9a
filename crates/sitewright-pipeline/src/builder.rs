//! Pipeline orchestration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;

use crate::config::PipelineConfig;
use crate::error::BuildError;
use crate::exec::run_command;
use crate::graph::{TaskGraph, TaskId};
use crate::tasks::{clean, copy, docs, html, images, scripts, styles, TaskContext, TaskReport};

/// Result of a pipeline run.
#[derive(Debug)]
pub struct BuildReport {
    /// One report per task, in stage order
    pub tasks: Vec<TaskReport>,

    /// Total run time in milliseconds
    pub duration_ms: u64,

    /// Site output directory
    pub site_dir: PathBuf,
}

impl BuildReport {
    /// All non-fatal problems, tagged with their task.
    pub fn warnings(&self) -> impl Iterator<Item = (TaskId, &str)> {
        self.tasks
            .iter()
            .flat_map(|r| r.warnings.iter().map(move |w| (r.task, w.as_str())))
    }

    pub fn warning_count(&self) -> usize {
        self.tasks.iter().map(|r| r.warnings.len()).sum()
    }

    pub fn files_written(&self) -> usize {
        self.tasks
            .iter()
            .filter(|r| !r.task.is_clean())
            .map(|r| r.files_written)
            .sum()
    }

    pub fn task(&self, task: TaskId) -> Option<&TaskReport> {
        self.tasks.iter().find(|r| r.task == task)
    }
}

/// Runs task graphs against one resolved configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    ctx: Arc<TaskContext>,
}

impl Pipeline {
    /// Resolve `config` against the project `root`.
    pub fn new(config: PipelineConfig, root: impl Into<PathBuf>) -> Result<Self, BuildError> {
        Ok(Self {
            ctx: Arc::new(TaskContext::new(config, root)?),
        })
    }

    pub fn context(&self) -> &TaskContext {
        &self.ctx
    }

    /// Clean, generate docs, build every asset, then assemble the pages.
    pub async fn build(&self) -> Result<BuildReport, BuildError> {
        self.run_graph(&TaskGraph::build_graph()).await
    }

    /// Remove all generated output.
    pub async fn clean(&self) -> Result<BuildReport, BuildError> {
        self.run_graph(&TaskGraph::clean_graph()).await
    }

    /// Refresh the project's tool dependencies, one command after another.
    pub async fn update(&self) -> Result<(), BuildError> {
        for command in &self.ctx.config.update.commands {
            if !command.enabled {
                tracing::info!("`{}` disabled, skipping", command);
                continue;
            }
            run_command(command, &self.ctx.root).await?;
        }
        tracing::info!("Bundle update complete");
        Ok(())
    }

    /// Run `graph` stage by stage. Members of a stage run concurrently; the
    /// first fatal error is returned once its stage has finished.
    pub async fn run_graph(&self, graph: &TaskGraph) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        let stages = graph.stages()?;
        let mut tasks = Vec::new();

        for stage in stages {
            let mut set = JoinSet::new();
            let mut spawned = HashMap::new();

            for task in stage {
                let ctx = Arc::clone(&self.ctx);
                let handle = set.spawn(async move {
                    tracing::info!("Starting '{}'...", task);
                    let started = Instant::now();
                    let result = run_task(ctx, task).await;
                    if result.is_ok() {
                        tracing::info!(
                            "Finished '{}' after {} ms",
                            task,
                            started.elapsed().as_millis()
                        );
                    }
                    result
                });
                spawned.insert(handle.id(), task);
            }

            let mut reports = Vec::new();
            let mut failures: Vec<(TaskId, BuildError)> = Vec::new();

            while let Some(joined) = set.join_next_with_id().await {
                match joined {
                    Ok((_, Ok(report))) => reports.push(report),
                    Ok((id, Err(e))) => {
                        let task = spawned[&id];
                        tracing::error!("'{}' failed: {}", task, e);
                        failures.push((task, e));
                    }
                    Err(e) => {
                        let task = spawned[&e.id()];
                        failures.push((
                            task,
                            BuildError::Join {
                                task: task.to_string(),
                                message: e.to_string(),
                            },
                        ));
                    }
                }
            }

            reports.sort_by_key(|r| r.task);
            tasks.extend(reports);

            failures.sort_by_key(|(task, _)| *task);
            if let Some((_, e)) = failures.into_iter().next() {
                return Err(e);
            }
        }

        let report = BuildReport {
            tasks,
            duration_ms: start.elapsed().as_millis() as u64,
            site_dir: self.ctx.paths.site_dir().to_path_buf(),
        };

        tracing::info!(
            "Done in {} ms: {} file(s), {} warning(s)",
            report.duration_ms,
            report.files_written(),
            report.warning_count()
        );
        Ok(report)
    }
}

async fn run_task(ctx: Arc<TaskContext>, task: TaskId) -> Result<TaskReport, BuildError> {
    match task {
        TaskId::CleanDocs
        | TaskId::CleanFonts
        | TaskId::CleanImages
        | TaskId::CleanAssets
        | TaskId::CleanScripts
        | TaskId::CleanStyles => blocking(ctx, task, move |ctx| clean::clean(ctx, task)).await,
        TaskId::DocsXml => docs::build_docs_xml(&ctx).await,
        TaskId::DocsHtml => docs::build_docs_html(&ctx).await,
        TaskId::Scripts => blocking(ctx, task, |ctx| Ok(scripts::build_scripts(ctx))).await,
        TaskId::Images => blocking(ctx, task, |ctx| Ok(images::build_images(ctx))).await,
        TaskId::Assets => blocking(ctx, task, |ctx| Ok(copy::build_assets(ctx))).await,
        TaskId::Styles => blocking(ctx, task, |ctx| Ok(styles::build_styles(ctx))).await,
        TaskId::Fonts => blocking(ctx, task, |ctx| Ok(copy::build_fonts(ctx))).await,
        TaskId::Html => blocking(ctx, task, |ctx| Ok(html::build_html(ctx))).await,
    }
}

/// Run CPU and filesystem work off the async workers.
async fn blocking<F>(ctx: Arc<TaskContext>, task: TaskId, f: F) -> Result<TaskReport, BuildError>
where
    F: FnOnce(&TaskContext) -> Result<TaskReport, BuildError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&ctx))
        .await
        .map_err(|e| BuildError::Join {
            task: task.to_string(),
            message: e.to_string(),
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommandSpec;
    use crate::tasks::test_support::write;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    /// Sources live outside the generated docs folder so the clean stage
    /// leaves them alone.
    fn config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.paths.styles_dir = PathBuf::from("web");
        config.paths.scripts_dir = PathBuf::from("web");
        config.paths.images_dir = PathBuf::from("web/img");
        config.paths.assets_dir = PathBuf::from("web/files");
        config.paths.image_folder = PathBuf::from("img");
        config.paths.asset_folder = PathBuf::from("files");
        config.docs.extractor.enabled = false;
        config.docs.renderer.enabled = false;
        config
    }

    fn seed_sources(root: &Path) {
        write(
            &root.join("web/style.css"),
            "body {\n    margin: 0;\n}\n\n.content {\n    color: #ff0000;\n}\n",
        );
        write(
            &root.join("web/critical.css"),
            "body { font-family: 'Anonymous Pro', monospace; }\n",
        );
        write(&root.join("web/lib/jquery.js"), "var jq = 1;\n");
        write(&root.join("web/app.js"), "console.log(jq);\n");
        write(&root.join("web/img/logo.svg"), "<svg/>");
        write(&root.join("web/img/figures/chart.png"), "png");
        write(&root.join("web/files/manual.pdf"), "pdf");
        write(&root.join("fonts/font-awesome/a/fa.woff"), "woff");
        write(&root.join("fonts/font-awesome/b/fa.ttf"), "ttf");
    }

    #[tokio::test]
    async fn builds_every_output() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        seed_sources(root);

        let pipeline = Pipeline::new(config(), root).unwrap();
        let report = pipeline.build().await.unwrap();

        let site = root.join("Docs/compiled_html");
        assert_eq!(report.site_dir, site);
        assert_eq!(report.warning_count(), 0, "{:?}", report.warnings().collect::<Vec<_>>());

        let css = fs::read_to_string(site.join("css/style.css")).unwrap();
        assert!(!css.contains('\n'));
        assert!(!css.contains("    "));
        assert!(root.join("web/compiled_critical.css").exists());

        assert!(site.join("js/script.js").exists());
        assert!(site.join("img/logo.svg").exists());
        assert!(site.join("img/figures/chart.png").exists());
        assert!(site.join("files/manual.pdf").exists());
        assert!(site.join("fonts/fa.woff").exists());
        assert!(site.join("fonts/fa.ttf").exists());

        assert_eq!(report.tasks.len(), 14);
        assert_eq!(report.tasks.last().map(|r| r.task), Some(TaskId::Html));
    }

    #[tokio::test]
    async fn rebuild_replaces_previous_output() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        seed_sources(root);
        write(&root.join("Docs/compiled_html/stale.txt"), "old");

        let pipeline = Pipeline::new(config(), root).unwrap();
        pipeline.build().await.unwrap();
        pipeline.build().await.unwrap();

        assert!(!root.join("Docs/compiled_html/stale.txt").exists());
        assert!(root.join("Docs/compiled_html/css/style.css").exists());
    }

    #[tokio::test]
    async fn clean_only_runs_clean_tasks() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        seed_sources(root);
        write(&root.join("Docs/compiled_html/css/style.css"), "a{}");

        let pipeline = Pipeline::new(config(), root).unwrap();
        let report = pipeline.clean().await.unwrap();

        assert!(report.tasks.iter().all(|r| r.task.is_clean()));
        assert!(!root.join("Docs/compiled_html").exists());
        assert!(root.join("web/style.css").exists());

        pipeline.clean().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_docs_tool_stops_the_build() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        seed_sources(root);
        let mut config = config();
        config.docs.extractor = CommandSpec::new("sh", &["-c", "exit 2"]);

        let pipeline = Pipeline::new(config, root).unwrap();
        let err = pipeline.build().await.unwrap_err();

        assert!(matches!(err, BuildError::Command { .. }));
        assert!(!root.join("Docs/compiled_html/css/style.css").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn generated_pages_are_assembled() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        seed_sources(root);
        let mut config = config();
        config.docs.renderer = CommandSpec::new(
            "sh",
            &[
                "-c",
                "mkdir -p Docs/html && printf '<div>\\n  <p>Hi</p>\\n</div>\\n' > Docs/html/index.html",
            ],
        );

        let pipeline = Pipeline::new(config, root).unwrap();
        let report = pipeline.build().await.unwrap();

        assert_eq!(report.task(TaskId::Html).map(|r| r.files_written), Some(1));
        let page = fs::read_to_string(root.join("Docs/compiled_html/index.html")).unwrap();
        assert!(page.contains("<div><p>Hi</p></div>"), "{}", page);
        assert!(!page.contains('\n'));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn update_runs_commands_in_order() {
        let temp = tempdir().unwrap();
        let mut config = PipelineConfig::default();
        config.update.commands = vec![
            CommandSpec::new("sh", &["-c", "echo install >> log"]),
            CommandSpec::new("sh", &["-c", "echo update >> log"]),
        ];

        Pipeline::new(config, temp.path()).unwrap().update().await.unwrap();

        let log = fs::read_to_string(temp.path().join("log")).unwrap();
        assert_eq!(log, "install\nupdate\n");
    }
}
