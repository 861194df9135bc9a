//! Task graph: which build steps must finish before others start.
//!
//! The graph is fixed at compile time; [`TaskGraph::stages`] layers it
//! topologically so each stage can run its members concurrently.

use std::collections::HashMap;
use std::fmt;

/// Every step the pipeline knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskId {
    CleanDocs,
    CleanFonts,
    CleanImages,
    CleanAssets,
    CleanScripts,
    CleanStyles,
    DocsXml,
    DocsHtml,
    Scripts,
    Images,
    Assets,
    Styles,
    Fonts,
    Html,
}

impl TaskId {
    pub const CLEAN: [TaskId; 6] = [
        TaskId::CleanDocs,
        TaskId::CleanFonts,
        TaskId::CleanImages,
        TaskId::CleanAssets,
        TaskId::CleanScripts,
        TaskId::CleanStyles,
    ];

    /// Asset generation steps that may run side by side.
    pub const ASSETS: [TaskId; 5] = [
        TaskId::Scripts,
        TaskId::Images,
        TaskId::Assets,
        TaskId::Styles,
        TaskId::Fonts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaskId::CleanDocs => "clean_docs",
            TaskId::CleanFonts => "clean_fonts",
            TaskId::CleanImages => "clean_images",
            TaskId::CleanAssets => "clean_assets",
            TaskId::CleanScripts => "clean_scripts",
            TaskId::CleanStyles => "clean_styles",
            TaskId::DocsXml => "build_docs_xml",
            TaskId::DocsHtml => "build_docs_html",
            TaskId::Scripts => "build_scripts",
            TaskId::Images => "build_images",
            TaskId::Assets => "build_assets",
            TaskId::Styles => "build_styles",
            TaskId::Fonts => "build_fonts",
            TaskId::Html => "html",
        }
    }

    pub fn is_clean(self) -> bool {
        Self::CLEAN.contains(&self)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a task is scheduled relative to the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskMode {
    /// No prerequisites
    Independent,
    /// Starts once all listed tasks complete
    After(Vec<TaskId>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("Edge references task {0} which is not in the graph")]
    UnknownTask(TaskId),

    #[error("Cycle detected among tasks: {}", join_names(.0))]
    Cycle(Vec<TaskId>),
}

fn join_names(tasks: &[TaskId]) -> String {
    tasks.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
}

/// Directed graph of tasks; an edge `(a, b)` means `a` completes before `b`.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: Vec<TaskId>,
    edges: Vec<(TaskId, TaskId)>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full site build:
    /// clean → docs xml → docs html → {scripts, images, assets, styles, fonts} → html.
    pub fn build_graph() -> Self {
        let mut graph = Self::clean_graph();

        graph.add_task(TaskId::DocsXml);
        graph.add_task(TaskId::DocsHtml);
        for clean in TaskId::CLEAN {
            graph.add_edge(clean, TaskId::DocsXml);
        }
        graph.add_edge(TaskId::DocsXml, TaskId::DocsHtml);

        graph.add_task(TaskId::Html);
        for task in TaskId::ASSETS {
            graph.add_task(task);
            graph.add_edge(TaskId::DocsHtml, task);
            graph.add_edge(task, TaskId::Html);
        }

        graph
    }

    /// Only the clean tasks, all independent.
    pub fn clean_graph() -> Self {
        let mut graph = Self::new();
        for task in TaskId::CLEAN {
            graph.add_task(task);
        }
        graph
    }

    pub fn add_task(&mut self, task: TaskId) {
        if !self.tasks.contains(&task) {
            self.tasks.push(task);
        }
    }

    pub fn add_edge(&mut self, before: TaskId, after: TaskId) {
        if !self.edges.contains(&(before, after)) {
            self.edges.push((before, after));
        }
    }

    /// Direct prerequisites of `task`.
    pub fn dependencies(&self, task: TaskId) -> Vec<TaskId> {
        self.edges
            .iter()
            .filter(|(_, after)| *after == task)
            .map(|(before, _)| *before)
            .collect()
    }

    pub fn mode(&self, task: TaskId) -> TaskMode {
        let deps = self.dependencies(task);
        if deps.is_empty() {
            TaskMode::Independent
        } else {
            TaskMode::After(deps)
        }
    }

    /// Topological layering (Kahn's algorithm). Each stage only depends on
    /// earlier stages; members keep insertion order.
    pub fn stages(&self) -> Result<Vec<Vec<TaskId>>, GraphError> {
        let mut indegree: HashMap<TaskId, usize> = self.tasks.iter().map(|&t| (t, 0)).collect();
        for &(before, after) in &self.edges {
            if !indegree.contains_key(&before) {
                return Err(GraphError::UnknownTask(before));
            }
            match indegree.get_mut(&after) {
                Some(count) => *count += 1,
                None => return Err(GraphError::UnknownTask(after)),
            }
        }

        let mut remaining: Vec<TaskId> = self.tasks.clone();
        let mut stages = Vec::new();

        while !remaining.is_empty() {
            let (ready, blocked): (Vec<TaskId>, Vec<TaskId>) = std::mem::take(&mut remaining)
                .into_iter()
                .partition(|t| indegree[t] == 0);
            if ready.is_empty() {
                return Err(GraphError::Cycle(blocked));
            }

            for &(before, after) in &self.edges {
                if ready.contains(&before) {
                    if let Some(count) = indegree.get_mut(&after) {
                        *count -= 1;
                    }
                }
            }

            stages.push(ready);
            remaining = blocked;
        }

        Ok(stages)
    }
}
