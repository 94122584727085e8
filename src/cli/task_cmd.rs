//! Task CLI commands

use std::collections::HashMap;

use anyhow::Result;
use chrono::{Local, Utc};
use clap::Subcommand;

use super::output::Output;
use super::{parse_date, require};
use crate::domain::{
    Comment, Constraints, Permission, Priority, ProjectId, Task, TaskId, TaskKind, TaskStatus,
};
use crate::query::{self, DueWindow, SortKey, SortOrder, TaskQuery};
use crate::schedule;
use crate::storage::{TaskPatch, TaskRepository, Workspace};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    ///
    /// Examples:
    ///   taskflow task add "Fix typo"
    ///   taskflow task add "Build API" --start 2024-06-10 --due 2024-06-14
    ///   taskflow task add "Launch" --kind milestone --due 2024-06-21
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(long)]
        description: Option<String>,

        /// Priority: low, medium, high
        #[arg(long, short, default_value = "medium")]
        priority: String,

        /// Kind: task, milestone
        #[arg(long, short, default_value = "task")]
        kind: String,

        /// Project ID this task belongs to
        #[arg(long)]
        project: Option<String>,

        /// Assignee name
        #[arg(long, short)]
        assignee: Option<String>,

        /// Scheduled start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Scheduled due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Mark the due date as a hard deadline
        #[arg(long)]
        deadline: bool,

        /// Latest start date a reschedule may push this task to (YYYY-MM-DD)
        #[arg(long)]
        max_start: Option<String>,

        /// Latest end date a reschedule may push this task to (YYYY-MM-DD)
        #[arg(long)]
        max_end: Option<String>,
    },

    /// List tasks with optional filters
    List {
        /// Filter by status: todo, in-progress, done
        #[arg(long, short)]
        status: Option<String>,

        /// Filter by priority: low, medium, high
        #[arg(long, short)]
        priority: Option<String>,

        /// Filter by assignee name
        #[arg(long, short)]
        assignee: Option<String>,

        /// Filter by project ID
        #[arg(long)]
        project: Option<String>,

        /// Filter by kind: task, milestone
        #[arg(long, short)]
        kind: Option<String>,

        /// Show deadline tasks only
        #[arg(long)]
        deadline: bool,

        /// Filter by due window: overdue, today, this-week, next-week, no-due-date
        #[arg(long)]
        due: Option<String>,

        /// Fuzzy text filter over title, description, comments, assignee
        #[arg(long)]
        search: Option<String>,

        /// Sort key: due, priority, title, status, assignee, deps, created
        #[arg(long, default_value = "due")]
        sort: String,

        /// Sort direction: asc, desc
        #[arg(long, default_value = "asc")]
        order: String,
    },

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },

    /// Mark task as in progress
    Start {
        /// Task ID
        id: String,
    },

    /// Mark task as done
    Done {
        /// Task ID
        id: String,
    },

    /// Move a done task back to todo
    Reopen {
        /// Task ID
        id: String,
    },

    /// Assign a task (or clear the assignee)
    Assign {
        /// Task ID
        id: String,

        /// Assignee name (omit together with --clear to unassign)
        assignee: Option<String>,

        /// Remove the current assignee
        #[arg(long)]
        clear: bool,
    },

    /// Add a comment to a task
    Comment {
        /// Task ID
        id: String,

        /// Comment text
        text: String,
    },

    /// Move a task to a new start date, keeping its duration
    Move {
        /// Task ID
        id: String,

        /// New start date (YYYY-MM-DD)
        start: String,
    },

    /// Set or clear reschedule bounds on a task
    Constrain {
        /// Task ID
        id: String,

        /// Latest allowed start date (YYYY-MM-DD)
        #[arg(long)]
        max_start: Option<String>,

        /// Latest allowed end date (YYYY-MM-DD)
        #[arg(long)]
        max_end: Option<String>,

        /// Remove all bounds
        #[arg(long)]
        clear: bool,
    },

    /// Add a dependency between tasks
    Dep {
        /// Task that must wait
        task: String,

        /// Task that must end first
        depends_on: String,
    },

    /// Remove a dependency
    Undep {
        /// Task to unblock
        task: String,

        /// Dependency to remove
        depends_on: String,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(cmd: TaskCommands, output: &Output) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            description,
            priority,
            kind,
            project,
            assignee,
            start,
            due,
            deadline,
            max_start,
            max_end,
        } => add_task(
            output,
            &title,
            description,
            &priority,
            &kind,
            project.as_deref(),
            assignee,
            start.as_deref(),
            due.as_deref(),
            deadline,
            max_start.as_deref(),
            max_end.as_deref(),
        ),
        TaskCommands::List {
            status,
            priority,
            assignee,
            project,
            kind,
            deadline,
            due,
            search,
            sort,
            order,
        } => list_tasks(
            output,
            ListArgs {
                status,
                priority,
                assignee,
                project,
                kind,
                deadline,
                due,
                search,
                sort,
                order,
            },
        ),
        TaskCommands::Show { id } => show_task(output, &id),
        TaskCommands::Start { id } => transition(output, &id, TaskStatus::InProgress, "Started"),
        TaskCommands::Done { id } => transition(output, &id, TaskStatus::Done, "Completed"),
        TaskCommands::Reopen { id } => transition(output, &id, TaskStatus::Todo, "Reopened"),
        TaskCommands::Assign {
            id,
            assignee,
            clear,
        } => assign_task(output, &id, assignee, clear),
        TaskCommands::Comment { id, text } => comment_task(output, &id, &text),
        TaskCommands::Move { id, start } => move_task(output, &id, &start),
        TaskCommands::Constrain {
            id,
            max_start,
            max_end,
            clear,
        } => constrain_task(output, &id, max_start.as_deref(), max_end.as_deref(), clear),
        TaskCommands::Dep { task, depends_on } => add_dependency(output, &task, &depends_on),
        TaskCommands::Undep { task, depends_on } => remove_dependency(output, &task, &depends_on),
        TaskCommands::Delete { id } => delete_task(output, &id),
    }
}

#[allow(clippy::too_many_arguments)]
fn add_task(
    output: &Output,
    title: &str,
    description: Option<String>,
    priority_str: &str,
    kind_str: &str,
    project_str: Option<&str>,
    assignee: Option<String>,
    start_str: Option<&str>,
    due_str: Option<&str>,
    deadline: bool,
    max_start_str: Option<&str>,
    max_end_str: Option<&str>,
) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let mut store = workspace.task_store();

    let now = Utc::now();
    let mut task = Task::new(TaskId::new(title, now), title, now);
    task.description = description;
    task.priority = priority_str
        .parse::<Priority>()
        .map_err(|e| anyhow::anyhow!(e))?;
    task.kind = kind_str.parse::<TaskKind>().map_err(|e| anyhow::anyhow!(e))?;
    task.assignee = assignee;
    task.is_deadline = deadline;

    if let Some(project_str) = project_str {
        let project_id: ProjectId = project_str.parse()?;
        let project_store = workspace.project_store();
        if project_store.get(&project_id)?.is_none() {
            anyhow::bail!("Project not found: {}", project_id);
        }
        task.project = Some(project_id);
    }

    if let Some(start) = start_str {
        task.start_date = Some(parse_date(start)?);
    }
    if let Some(due) = due_str {
        task.due_date = Some(parse_date(due)?);
    }
    if let Some(limit) = max_start_str {
        task.constraints.max_start_date = Some(parse_date(limit)?);
    }
    if let Some(limit) = max_end_str {
        task.constraints.max_end_date = Some(parse_date(limit)?);
    }

    let task = store.create(task)?;
    output.verbose_ctx("task", &format!("Created {}", task.id));

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id.to_string(),
            "title": task.title,
            "status": task.status,
            "priority": task.priority,
            "kind": task.kind,
            "start_date": task.start_date,
            "due_date": task.due_date,
        }));
    } else {
        output.success(&format!("Created task: {} - {}", task.id, task.title));
    }

    Ok(())
}

struct ListArgs {
    status: Option<String>,
    priority: Option<String>,
    assignee: Option<String>,
    project: Option<String>,
    kind: Option<String>,
    deadline: bool,
    due: Option<String>,
    search: Option<String>,
    sort: String,
    order: String,
}

impl ListArgs {
    fn to_query(&self) -> Result<TaskQuery> {
        Ok(TaskQuery {
            status: parse_opt::<TaskStatus>(self.status.as_deref())?,
            priority: parse_opt::<Priority>(self.priority.as_deref())?,
            assignee: self.assignee.clone(),
            project: match self.project.as_deref() {
                Some(raw) => Some(raw.parse()?),
                None => None,
            },
            kind: parse_opt::<TaskKind>(self.kind.as_deref())?,
            deadline: self.deadline.then_some(true),
            due: parse_opt::<DueWindow>(self.due.as_deref())?,
            search: self.search.clone(),
        })
    }
}

/// Parses an optional flag value with a `String`-erroring [`FromStr`]
fn parse_opt<T: std::str::FromStr<Err = String>>(raw: Option<&str>) -> Result<Option<T>> {
    match raw {
        Some(raw) => raw.parse().map(Some).map_err(|e: String| anyhow::anyhow!(e)),
        None => Ok(None),
    }
}

fn list_tasks(output: &Output, args: ListArgs) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let store = workspace.task_store();

    let query = args.to_query()?;
    let sort: SortKey = args.sort.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let order: SortOrder = args.order.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let tasks = store.all()?;
    let today = Local::now().date_naive();
    let mut tasks = query::apply(&tasks, &query, today);
    query::sort_tasks(&mut tasks, sort, order);

    output.verbose_ctx("list", &format!("{} task(s) after filtering", tasks.len()));

    if output.is_json() {
        let items: Vec<_> = tasks
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.id.to_string(),
                    "title": t.title,
                    "status": t.status,
                    "priority": t.priority,
                    "kind": t.kind,
                    "assignee": t.assignee,
                    "project": t.project.as_ref().map(|p| p.to_string()),
                    "start_date": t.start_date,
                    "due_date": t.due_date,
                    "dependencies": t.dependencies.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
                })
            })
            .collect();
        output.data(&items);
    } else if tasks.is_empty() {
        println!("No tasks found.");
    } else {
        println!("{:<12} {:<4} {:<8} {:<12} TITLE", "ID", "ST", "PRI", "DUE");
        println!("{}", "-".repeat(60));
        for task in &tasks {
            let due = task
                .due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<12} {:<4} {:<8} {:<12} {}{}",
                task.id,
                status_icon(task.status),
                task.priority,
                due,
                task.title,
                if task.is_overdue(today) { " (overdue)" } else { "" },
            );
        }
    }

    Ok(())
}

fn status_icon(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Done => "[x]",
    }
}

fn show_task(output: &Output, id_str: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let store = workspace.task_store();

    let id: TaskId = id_str.parse()?;
    let tasks = store.all()?;
    let task = tasks
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    let statuses: HashMap<TaskId, TaskStatus> =
        tasks.iter().map(|t| (t.id.clone(), t.status)).collect();
    let is_ready = task.is_ready(&statuses);
    let is_blocked = task.is_blocked(&statuses);

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id.to_string(),
            "title": task.title,
            "description": task.description,
            "status": task.status,
            "priority": task.priority,
            "kind": task.kind,
            "is_deadline": task.is_deadline,
            "project": task.project.as_ref().map(|p| p.to_string()),
            "assignee": task.assignee,
            "start_date": task.start_date,
            "due_date": task.due_date,
            "max_start_date": task.constraints.max_start_date,
            "max_end_date": task.constraints.max_end_date,
            "dependencies": task.dependencies.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
            "comments": task.comments,
            "created_at": task.created_at,
            "updated_at": task.updated_at,
            "completed_at": task.completed_at,
            "is_ready": is_ready,
            "is_blocked": is_blocked,
        }));
    } else {
        println!("Task: {}", task.id);
        println!("Title: {}", task.title);
        println!("Status: {}", task.status);
        println!("Priority: {}", task.priority);
        if task.kind.is_milestone() {
            println!("Kind: milestone");
        }
        if task.is_deadline {
            println!("Deadline: yes");
        }
        if let Some(project) = &task.project {
            println!("Project: {}", project);
        }
        if let Some(assignee) = &task.assignee {
            println!("Assignee: {}", assignee);
        }
        if let Some(start) = task.start_date {
            println!("Start: {}", start);
        }
        if let Some(due) = task.due_date {
            println!("Due: {}", due);
        }
        if let Some(limit) = task.constraints.max_start_date {
            println!("Max start: {}", limit);
        }
        if let Some(limit) = task.constraints.max_end_date {
            println!("Max end: {}", limit);
        }
        println!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"));
        println!("Updated: {}", task.updated_at.format("%Y-%m-%d %H:%M"));
        if let Some(completed) = task.completed_at {
            println!("Completed: {}", completed.format("%Y-%m-%d %H:%M"));
        }

        if !task.dependencies.is_empty() {
            println!("\nDepends on:");
            for dep in &task.dependencies {
                let dep_status = statuses
                    .get(dep)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "?".to_string());
                println!("  {} ({})", dep, dep_status);
            }
        }

        if !task.comments.is_empty() {
            println!("\nComments:");
            for comment in &task.comments {
                println!(
                    "  [{}] {}: {}",
                    comment.created_at.format("%Y-%m-%d %H:%M"),
                    comment.author,
                    comment.content
                );
            }
        }

        if let Some(desc) = &task.description {
            println!("\nDescription:");
            println!("{}", desc);
        }

        println!();
        if is_ready {
            println!("READY (all dependencies complete)");
        } else if is_blocked {
            println!("BLOCKED (waiting on dependencies)");
        }
    }

    Ok(())
}

fn transition(output: &Output, id_str: &str, status: TaskStatus, verb: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let mut store = workspace.task_store();

    let id: TaskId = id_str.parse()?;
    let task = store.update(&id, TaskPatch::transition(status, Utc::now()))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id.to_string(),
            "status": task.status,
            "completed_at": task.completed_at,
        }));
    } else {
        output.success(&format!("{} task: {}", verb, task.id));
    }

    Ok(())
}

fn assign_task(
    output: &Output,
    id_str: &str,
    assignee: Option<String>,
    clear: bool,
) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let mut store = workspace.task_store();

    let id: TaskId = id_str.parse()?;
    let new_assignee = match (assignee, clear) {
        (Some(_), true) => anyhow::bail!("Give an assignee or --clear, not both"),
        (None, false) => anyhow::bail!("Give an assignee or --clear"),
        (Some(name), false) => Some(name),
        (None, true) => None,
    };

    let patch = TaskPatch {
        assignee: Some(new_assignee.clone()),
        ..TaskPatch::default()
    };
    let task = store.update(&id, patch)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id.to_string(),
            "assignee": task.assignee,
        }));
    } else {
        match &task.assignee {
            Some(name) => output.success(&format!("Assigned {} to {}", task.id, name)),
            None => output.success(&format!("Unassigned {}", task.id)),
        }
    }

    Ok(())
}

fn comment_task(output: &Output, id_str: &str, text: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let mut store = workspace.task_store();

    let id: TaskId = id_str.parse()?;
    let task = store
        .get(&id)?
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    let author = workspace.config().workspace.user.effective_name();
    let mut comments = task.comments.clone();
    comments.push(Comment::new(author, text, Utc::now()));

    let patch = TaskPatch {
        comments: Some(comments),
        ..TaskPatch::default()
    };
    let task = store.update(&id, patch)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id.to_string(),
            "comments": task.comments.len(),
        }));
    } else {
        output.success(&format!(
            "Commented on {} ({} comment(s))",
            task.id,
            task.comments.len()
        ));
    }

    Ok(())
}

fn move_task(output: &Output, id_str: &str, start_str: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let mut store = workspace.task_store();

    let id: TaskId = id_str.parse()?;
    let new_start = parse_date(start_str)?;

    let change = schedule::move_task(&mut store, &id, new_start)?;
    output.verbose_ctx(
        "move",
        &format!("{} now spans {}..{}", change.task, change.new_start, change.new_due),
    );

    if output.is_json() {
        output.data(&change);
    } else {
        output.success(&format!(
            "Moved {}: {} - {}",
            change.task, change.new_start, change.new_due
        ));
    }

    Ok(())
}

fn constrain_task(
    output: &Output,
    id_str: &str,
    max_start_str: Option<&str>,
    max_end_str: Option<&str>,
    clear: bool,
) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let mut store = workspace.task_store();

    let id: TaskId = id_str.parse()?;
    let task = store
        .get(&id)?
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    let constraints = if clear {
        Constraints::default()
    } else {
        if max_start_str.is_none() && max_end_str.is_none() {
            anyhow::bail!("Give --max-start, --max-end, or --clear");
        }
        let mut constraints = task.constraints;
        if let Some(limit) = max_start_str {
            constraints.max_start_date = Some(parse_date(limit)?);
        }
        if let Some(limit) = max_end_str {
            constraints.max_end_date = Some(parse_date(limit)?);
        }
        constraints
    };

    let patch = TaskPatch {
        constraints: Some(constraints),
        ..TaskPatch::default()
    };
    let task = store.update(&id, patch)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id.to_string(),
            "max_start_date": task.constraints.max_start_date,
            "max_end_date": task.constraints.max_end_date,
        }));
    } else if task.constraints.is_unconstrained() {
        output.success(&format!("Cleared bounds on {}", task.id));
    } else {
        output.success(&format!("Updated bounds on {}", task.id));
    }

    Ok(())
}

fn add_dependency(output: &Output, task_str: &str, depends_on_str: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let mut store = workspace.task_store();

    let task_id: TaskId = task_str.parse()?;
    let depends_on_id: TaskId = depends_on_str.parse()?;

    let added = schedule::add_dependency(&mut store, &task_id, &depends_on_id)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task_id.to_string(),
            "depends_on": depends_on_id.to_string(),
            "added": added,
        }));
    } else if added {
        output.success(&format!("{} now depends on {}", task_id, depends_on_id));
    } else {
        output.success(&format!(
            "{} already depends on {}",
            task_id, depends_on_id
        ));
    }

    Ok(())
}

fn remove_dependency(output: &Output, task_str: &str, depends_on_str: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let mut store = workspace.task_store();

    let task_id: TaskId = task_str.parse()?;
    let depends_on_id: TaskId = depends_on_str.parse()?;

    let removed = schedule::remove_dependency(&mut store, &task_id, &depends_on_id)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task_id.to_string(),
            "removed_dependency": depends_on_id.to_string(),
            "removed": removed,
        }));
    } else if removed {
        output.success(&format!(
            "Removed dependency: {} no longer depends on {}",
            task_id, depends_on_id
        ));
    } else {
        output.success(&format!(
            "{} does not depend on {}",
            task_id, depends_on_id
        ));
    }

    Ok(())
}

fn delete_task(output: &Output, id_str: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    require(workspace.config(), Permission::Delete)?;

    let mut store = workspace.task_store();
    let id: TaskId = id_str.parse()?;

    if !store.delete(&id)? {
        anyhow::bail!("Task not found: {}", id);
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id.to_string(),
            "deleted": true,
        }));
    } else {
        output.success(&format!("Deleted task: {}", id));
    }

    Ok(())
}

/// Fuzzy search across all tasks, best match first
pub fn search(output: &Output, query: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let store = workspace.task_store();

    let tasks = store.all()?;
    let mut scored: Vec<(f64, &Task)> = tasks
        .iter()
        .filter_map(|task| query::score(task, query).map(|score| (score, task)))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    output.verbose_ctx("search", &format!("{} match(es) for '{}'", scored.len(), query));

    if output.is_json() {
        let items: Vec<_> = scored
            .iter()
            .map(|(score, task)| {
                serde_json::json!({
                    "id": task.id.to_string(),
                    "title": task.title,
                    "status": task.status,
                    "score": score,
                })
            })
            .collect();
        output.data(&items);
    } else if scored.is_empty() {
        println!("No results found for '{}'", query);
    } else {
        println!("Search results for '{}':", query);
        println!("{:<12} {:<4} TITLE", "ID", "ST");
        println!("{}", "-".repeat(60));
        for (_, task) in &scored {
            println!("{:<12} {:<4} {}", task.id, status_icon(task.status), task.title);
        }
        println!();
        println!("Found {} result(s)", scored.len());
    }

    Ok(())
}
