//! Workspace statistics command

use std::collections::HashMap;

use anyhow::Result;
use chrono::Local;

use super::output::Output;
use crate::domain::{Priority, TaskId, TaskStatus};
use crate::storage::{TaskRepository, Workspace};

pub fn run(output: &Output) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let tasks = workspace.task_store().all()?;
    let projects = workspace.project_store().all()?;

    let today = Local::now().date_naive();
    let total = tasks.len();

    let mut todo = 0;
    let mut in_progress = 0;
    let mut done = 0;
    let mut low = 0;
    let mut medium = 0;
    let mut high = 0;
    for task in &tasks {
        match task.status {
            TaskStatus::Todo => todo += 1,
            TaskStatus::InProgress => in_progress += 1,
            TaskStatus::Done => done += 1,
        }
        match task.priority {
            Priority::Low => low += 1,
            Priority::Medium => medium += 1,
            Priority::High => high += 1,
        }
    }

    let statuses: HashMap<TaskId, TaskStatus> =
        tasks.iter().map(|t| (t.id.clone(), t.status)).collect();

    let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();
    let blocked = tasks.iter().filter(|t| t.is_blocked(&statuses)).count();
    let with_dependencies = tasks.iter().filter(|t| !t.dependencies.is_empty()).count();
    let total_dependencies: usize = tasks.iter().map(|t| t.dependencies.len()).sum();

    let completion_rate = if total > 0 {
        done as f64 / total as f64
    } else {
        0.0
    };
    let avg_dependencies = if total > 0 {
        total_dependencies as f64 / total as f64
    } else {
        0.0
    };

    let active_projects = projects.iter().filter(|p| !p.archived).count();
    let archived_projects = projects.len() - active_projects;

    if output.is_json() {
        output.data(&serde_json::json!({
            "total": total,
            "by_status": {
                "todo": todo,
                "in_progress": in_progress,
                "done": done,
            },
            "by_priority": {
                "low": low,
                "medium": medium,
                "high": high,
            },
            "completion_rate": completion_rate,
            "overdue": overdue,
            "blocked": blocked,
            "with_dependencies": with_dependencies,
            "avg_dependencies": avg_dependencies,
            "projects": {
                "active": active_projects,
                "archived": archived_projects,
            },
        }));
    } else {
        println!("Workspace statistics");
        println!();
        println!("Tasks: {} total", total);
        println!("  [ ] todo         {}", todo);
        println!("  [~] in-progress  {}", in_progress);
        println!("  [x] done         {}", done);
        println!();
        println!("Priority:");
        println!("  high    {}", high);
        println!("  medium  {}", medium);
        println!("  low     {}", low);
        println!();
        println!("Completion rate: {:.0}%", completion_rate * 100.0);
        println!("Overdue: {}", overdue);
        println!("Blocked: {}", blocked);
        println!(
            "With dependencies: {} (avg {:.1} per task)",
            with_dependencies, avg_dependencies
        );
        println!(
            "Projects: {} active, {} archived",
            active_projects, archived_projects
        );
    }

    Ok(())
}
