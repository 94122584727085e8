//! Task repository contract
//!
//! The scheduling engine and the CLI talk to storage through the
//! [`TaskRepository`] trait, so the cascade can run against the JSONL
//! store and an in-memory store with identical semantics.
//!
//! Two invariants are enforced on every mutation:
//! - a stored task with both dates has `start_date <= due_date`
//! - a task that other tasks depend on cannot be deleted

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::domain::{
    Comment, Constraints, Dependencies, Priority, ProjectId, Task, TaskId, TaskKind, TaskStatus,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Invalid date range for '{title}': start {start} is after due {due}")]
    InvalidDateRange {
        title: String,
        start: NaiveDate,
        due: NaiveDate,
    },

    #[error("Cannot delete '{title}': {count} task(s) still depend on it")]
    DependencyInUse { title: String, count: usize },

    #[error("Store I/O error at {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse record on line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A partial update to a task
///
/// The outer `Option` marks whether a field is part of the patch; for
/// clearable fields the inner `Option` is the new value, so
/// `start_date: Some(None)` clears the start date while `None` leaves it
/// alone.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub kind: Option<TaskKind>,
    pub is_deadline: Option<bool>,
    pub project: Option<Option<ProjectId>>,
    pub assignee: Option<Option<String>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub constraints: Option<Constraints>,
    pub dependencies: Option<Dependencies>,
    pub comments: Option<Vec<Comment>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    /// Patch that moves a task to a new scheduled span
    pub fn reschedule(start: NaiveDate, due: NaiveDate) -> Self {
        Self {
            start_date: Some(Some(start)),
            due_date: Some(Some(due)),
            ..Self::default()
        }
    }

    /// Patch that changes status, stamping or clearing the completion time
    pub fn transition(status: TaskStatus, now: DateTime<Utc>) -> Self {
        let completed_at = if status.is_complete() {
            Some(Some(now))
        } else {
            Some(None)
        };
        Self {
            status: Some(status),
            completed_at,
            ..Self::default()
        }
    }

    /// Applies the patch to a task, stamping `updated_at`
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(kind) = self.kind {
            task.kind = kind;
        }
        if let Some(is_deadline) = self.is_deadline {
            task.is_deadline = is_deadline;
        }
        if let Some(project) = &self.project {
            task.project = project.clone();
        }
        if let Some(assignee) = &self.assignee {
            task.assignee = assignee.clone();
        }
        if let Some(start_date) = self.start_date {
            task.start_date = start_date;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(constraints) = self.constraints {
            task.constraints = constraints;
        }
        if let Some(dependencies) = &self.dependencies {
            task.dependencies = dependencies.clone();
        }
        if let Some(comments) = &self.comments {
            task.comments = comments.clone();
        }
        if let Some(completed_at) = self.completed_at {
            task.completed_at = completed_at;
        }
        task.updated_at = now;
    }
}

/// Storage contract for tasks
pub trait TaskRepository {
    /// Returns all tasks in creation order
    fn all(&self) -> Result<Vec<Task>, StoreError>;

    /// Returns a single task by ID
    fn get(&self, id: &TaskId) -> Result<Option<Task>, StoreError>;

    /// Persists a new task
    fn create(&mut self, task: Task) -> Result<Task, StoreError>;

    /// Applies a partial update and returns the updated task
    fn update(&mut self, id: &TaskId, patch: TaskPatch) -> Result<Task, StoreError>;

    /// Deletes a task, returning false if it did not exist
    ///
    /// Fails with [`StoreError::DependencyInUse`] while other tasks still
    /// reference the target.
    fn delete(&mut self, id: &TaskId) -> Result<bool, StoreError>;
}

/// Validates the date-range invariant on the resulting record
pub(crate) fn validate_dates(task: &Task) -> Result<(), StoreError> {
    if let (Some(start), Some(due)) = (task.start_date, task.due_date) {
        if start > due {
            return Err(StoreError::InvalidDateRange {
                title: task.title.clone(),
                start,
                due,
            });
        }
    }
    Ok(())
}

/// Fails if any task still references the target as a dependency
pub(crate) fn check_delete_allowed(tasks: &[Task], target: &Task) -> Result<(), StoreError> {
    let count = tasks
        .iter()
        .filter(|t| t.dependencies.contains(&target.id))
        .count();

    if count > 0 {
        return Err(StoreError::DependencyInUse {
            title: target.title.clone(),
            count,
        });
    }
    Ok(())
}

/// In-memory repository backed by a plain Vec
///
/// Shares the full contract with the JSONL store; used by the test suite
/// and anywhere a scheduling run should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: Vec<Task>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Creates a store seeded with tasks
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

impl TaskRepository for MemoryStore {
    fn all(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.tasks.clone())
    }

    fn get(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.iter().find(|t| &t.id == id).cloned())
    }

    fn create(&mut self, task: Task) -> Result<Task, StoreError> {
        validate_dates(&task)?;
        self.tasks.push(task.clone());
        Ok(task)
    }

    fn update(&mut self, id: &TaskId, patch: TaskPatch) -> Result<Task, StoreError> {
        let slot = self
            .tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| StoreError::TaskNotFound(id.clone()))?;

        let mut updated = slot.clone();
        patch.apply_to(&mut updated, Utc::now());
        validate_dates(&updated)?;

        *slot = updated.clone();
        Ok(updated)
    }

    fn delete(&mut self, id: &TaskId) -> Result<bool, StoreError> {
        let target = match self.tasks.iter().find(|t| &t.id == id) {
            Some(t) => t.clone(),
            None => return Ok(false),
        };

        check_delete_allowed(&self.tasks, &target)?;
        self.tasks.retain(|t| &t.id != id);
        Ok(true)
    }
}
