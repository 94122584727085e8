//! Project CLI commands

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;

use super::output::Output;
use super::require;
use crate::domain::{Permission, Project, ProjectId};
use crate::storage::{TaskRepository, Workspace};

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a new project
    New {
        /// Project name
        name: String,

        /// Longer description
        #[arg(long)]
        description: Option<String>,

        /// Display color as a hex string (e.g., "#4f46e5")
        #[arg(long)]
        color: Option<String>,
    },

    /// List projects
    List {
        /// Include archived projects
        #[arg(long)]
        archived: bool,
    },

    /// Show project details with its tasks
    Show {
        /// Project ID
        id: String,
    },

    /// Archive a project, hiding it from default listings
    Archive {
        /// Project ID
        id: String,
    },

    /// Restore an archived project
    Restore {
        /// Project ID
        id: String,
    },
}

pub fn run(cmd: ProjectCommands, output: &Output) -> Result<()> {
    match cmd {
        ProjectCommands::New {
            name,
            description,
            color,
        } => new_project(output, &name, description, color),
        ProjectCommands::List { archived } => list_projects(output, archived),
        ProjectCommands::Show { id } => show_project(output, &id),
        ProjectCommands::Archive { id } => set_archived(output, &id, true),
        ProjectCommands::Restore { id } => set_archived(output, &id, false),
    }
}

fn new_project(
    output: &Output,
    name: &str,
    description: Option<String>,
    color: Option<String>,
) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let store = workspace.project_store();

    let now = Utc::now();
    let mut project = Project::new(ProjectId::new(name, now), name, now);
    project.description = description;
    project.color = color;

    let project = store.create(project)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": project.id.to_string(),
            "name": project.name,
            "archived": project.archived,
        }));
    } else {
        output.success(&format!("Created project: {} - {}", project.id, project.name));
    }

    Ok(())
}

fn list_projects(output: &Output, include_archived: bool) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let store = workspace.project_store();

    let projects: Vec<Project> = store
        .all()?
        .into_iter()
        .filter(|p| include_archived || !p.archived)
        .collect();

    if output.is_json() {
        let items: Vec<_> = projects
            .iter()
            .map(|p| {
                serde_json::json!({
                    "id": p.id.to_string(),
                    "name": p.name,
                    "color": p.color,
                    "archived": p.archived,
                })
            })
            .collect();
        output.data(&items);
    } else if projects.is_empty() {
        println!("No projects found.");
    } else {
        println!("{:<12} {:<10} NAME", "ID", "STATE");
        println!("{}", "-".repeat(60));
        for project in &projects {
            let state = if project.archived { "archived" } else { "active" };
            println!("{:<12} {:<10} {}", project.id, state, project.name);
        }
    }

    Ok(())
}

fn show_project(output: &Output, id_str: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let store = workspace.project_store();
    let task_store = workspace.task_store();

    let id: ProjectId = id_str.parse()?;
    let project = store
        .get(&id)?
        .ok_or_else(|| anyhow::anyhow!("Project not found: {}", id))?;

    let tasks: Vec<_> = task_store
        .all()?
        .into_iter()
        .filter(|t| t.project.as_ref() == Some(&id))
        .collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": project.id.to_string(),
            "name": project.name,
            "description": project.description,
            "color": project.color,
            "archived": project.archived,
            "created_at": project.created_at,
            "updated_at": project.updated_at,
            "tasks": tasks.iter().map(|t| serde_json::json!({
                "id": t.id.to_string(),
                "title": t.title,
                "status": t.status,
            })).collect::<Vec<_>>(),
        }));
    } else {
        println!("Project: {}", project.id);
        println!("Name: {}", project.name);
        if let Some(desc) = &project.description {
            println!("Description: {}", desc);
        }
        if let Some(color) = &project.color {
            println!("Color: {}", color);
        }
        if project.archived {
            println!("State: archived");
        }
        println!("Created: {}", project.created_at.format("%Y-%m-%d %H:%M"));

        if !tasks.is_empty() {
            println!("\nTasks ({}):", tasks.len());
            for task in &tasks {
                println!("  {} {} ({})", task.id, task.title, task.status);
            }
        }
    }

    Ok(())
}

fn set_archived(output: &Output, id_str: &str, archived: bool) -> Result<()> {
    let workspace = Workspace::open_current()?;
    if archived {
        // Archiving is the destructive end of the project lifecycle
        require(workspace.config(), Permission::Delete)?;
    }
    let store = workspace.project_store();

    let id: ProjectId = id_str.parse()?;
    let mut project = store
        .get(&id)?
        .ok_or_else(|| anyhow::anyhow!("Project not found: {}", id))?;

    let now = Utc::now();
    if archived {
        project.archive(now);
    } else {
        project.restore(now);
    }
    store.save(&project)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": project.id.to_string(),
            "archived": project.archived,
        }));
    } else if archived {
        output.success(&format!("Archived project: {}", project.id));
    } else {
        output.success(&format!("Restored project: {}", project.id));
    }

    Ok(())
}
