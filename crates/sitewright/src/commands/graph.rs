//! Print the build stages.

use anyhow::Result;
use sitewright_pipeline::{TaskGraph, TaskMode};

pub fn run() -> Result<()> {
    let graph = TaskGraph::build_graph();
    for (i, stage) in graph.stages()?.iter().enumerate() {
        println!("stage {}:", i + 1);
        for &task in stage {
            match graph.mode(task) {
                TaskMode::Independent => println!("  {}", task),
                TaskMode::After(deps) => {
                    let deps: Vec<&str> = deps.iter().map(|d| d.name()).collect();
                    println!("  {} (after {})", task, deps.join(", "));
                }
            }
        }
    }
    Ok(())
}
