//! Task domain model
//!
//! Tasks are the schedulable units of work. They carry optional start and
//! due dates (day granularity), scheduling constraints, and dependencies on
//! other tasks. Lifecycle timestamps (`created_at`, `updated_at`,
//! `completed_at`) are instants and never participate in schedule math.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::id::{ProjectId, TaskId};

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Returns true if this task is not yet started
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Todo)
    }

    /// Returns true if this task is currently being worked on
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::InProgress)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "in-progress" | "in_progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(format!(
                "Invalid status '{}' (expected: todo, in-progress, done)",
                s
            )),
        }
    }
}

/// Priority of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Numeric rank used for ordering (low = 1, medium = 2, high = 3)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!(
                "Invalid priority '{}' (expected: low, medium, high)",
                s
            )),
        }
    }
}

/// Kind of schedulable item
///
/// Milestones are point-in-time markers; they flow through the same
/// scheduling math as tasks but render differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Task,
    Milestone,
}

impl TaskKind {
    /// Returns true for milestone markers
    pub fn is_milestone(&self) -> bool {
        matches!(self, TaskKind::Milestone)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskKind::Task => "task",
            TaskKind::Milestone => "milestone",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "task" => Ok(TaskKind::Task),
            "milestone" => Ok(TaskKind::Milestone),
            _ => Err(format!("Invalid kind '{}' (expected: task, milestone)", s)),
        }
    }
}

/// Scheduling constraints that bound where a cascade may move a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    /// Latest allowed start date
    #[serde(default, deserialize_with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub max_start_date: Option<NaiveDate>,

    /// Latest allowed end date
    #[serde(default, deserialize_with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub max_end_date: Option<NaiveDate>,
}

impl Constraints {
    /// Returns true if no bound is set
    pub fn is_unconstrained(&self) -> bool {
        self.max_start_date.is_none() && self.max_end_date.is_none()
    }
}

/// Ordered collection of dependency task IDs
///
/// Each entry means "this task cannot be scheduled before that task ends".
/// Insertion order is preserved; duplicates are rejected on add.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dependencies(Vec<TaskId>);

impl Dependencies {
    /// Creates an empty dependencies collection
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds a dependency, returning false if it was already present
    pub fn add(&mut self, task_id: TaskId) -> bool {
        if self.0.contains(&task_id) {
            false
        } else {
            self.0.push(task_id);
            true
        }
    }

    /// Removes a dependency, returning false if it was not present
    pub fn remove(&mut self, task_id: &TaskId) -> bool {
        let len_before = self.0.len();
        self.0.retain(|d| d != task_id);
        self.0.len() != len_before
    }

    /// Checks if a specific task ID exists as a dependency
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.0.contains(task_id)
    }

    /// Returns true if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of dependencies
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over all dependency IDs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &TaskId> {
        self.0.iter()
    }

    /// Returns the IDs as a slice
    pub fn as_slice(&self) -> &[TaskId] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Dependencies {
    type Item = &'a TaskId;
    type IntoIter = std::slice::Iter<'a, TaskId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<TaskId>> for Dependencies {
    fn from(ids: Vec<TaskId>) -> Self {
        Self(ids)
    }
}

/// A comment attached to a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Display name of the comment author
    pub author: String,
    /// Comment body
    pub content: String,
    /// When the comment was written
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a new comment
    pub fn new(author: impl Into<String>, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            created_at: now,
        }
    }
}

/// A schedulable task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Human-readable title
    pub title: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// Priority level
    #[serde(default)]
    pub priority: Priority,

    /// Task or milestone
    #[serde(rename = "type", default)]
    pub kind: TaskKind,

    /// Marks a hard deadline (rendering hint, not a scheduling constraint)
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_deadline: bool,

    /// Project this task belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectId>,

    /// Display name of the assignee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Scheduled start date
    #[serde(default, deserialize_with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// Scheduled due date
    #[serde(default, deserialize_with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Bounds the cascade may not move this task past
    #[serde(default, skip_serializing_if = "Constraints::is_unconstrained")]
    pub constraints: Constraints,

    /// Tasks that must end before this one starts
    #[serde(default, skip_serializing_if = "Dependencies::is_empty")]
    pub dependencies: Dependencies,

    /// Discussion thread
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// When the task was completed (if done)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// Parses a stored date value, accepting plain dates and RFC 3339 instants
pub(crate) fn parse_lenient_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

// Unparseable stored dates become None instead of poisoning the whole load.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_lenient_date))
}

impl Task {
    /// Creates a new task with the given ID and title
    pub fn new(id: TaskId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            priority: Priority::default(),
            kind: TaskKind::default(),
            is_deadline: false,
            project: None,
            assignee: None,
            start_date: None,
            due_date: None,
            constraints: Constraints::default(),
            dependencies: Dependencies::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Returns true if the task carries at least one schedule date
    pub fn has_schedule(&self) -> bool {
        self.start_date.is_some() || self.due_date.is_some()
    }

    /// Returns the inclusive scheduled span, if any
    ///
    /// A task with only one of its two dates set occupies that single day.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.due_date) {
            (None, None) => None,
            (Some(start), None) => Some((start, start)),
            (None, Some(due)) => Some((due, due)),
            (Some(start), Some(due)) => Some((start, due)),
        }
    }

    /// Number of calendar days the task occupies (always at least 1)
    pub fn duration_days(&self) -> i64 {
        match self.span() {
            Some((start, end)) => ((end - start).num_days() + 1).max(1),
            None => 1,
        }
    }

    /// Returns true if the due date has passed and the task is not done
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => due < today && !self.status.is_complete(),
            None => false,
        }
    }

    /// Returns true if all dependencies are complete and this task is not
    pub fn is_ready(&self, statuses: &HashMap<TaskId, TaskStatus>) -> bool {
        if self.status.is_complete() {
            return false;
        }

        self.dependencies.iter().all(|dep_id| {
            statuses
                .get(dep_id)
                .map(|s| s.is_complete())
                .unwrap_or(false)
        })
    }

    /// Returns true if any dependency is incomplete
    pub fn is_blocked(&self, statuses: &HashMap<TaskId, TaskStatus>) -> bool {
        if self.status.is_complete() {
            return false;
        }

        self.dependencies.iter().any(|dep_id| {
            statuses
                .get(dep_id)
                .map(|s| !s.is_complete())
                .unwrap_or(true) // Unknown dependency = blocked
        })
    }
}
