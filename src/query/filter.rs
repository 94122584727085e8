//! Task filtering and sorting
//!
//! Filters compose by logical AND over the task list; the result is then
//! stable-sorted on a selected key, so equal keys keep stored order and
//! the same inputs always produce the same listing.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};

use crate::domain::{Priority, ProjectId, Task, TaskKind, TaskStatus};

use super::search;

/// Combined filter criteria for a task listing
///
/// Every populated field must match for a task to pass.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub assignee: Option<String>,
    pub project: Option<ProjectId>,
    pub kind: Option<TaskKind>,
    /// `Some(true)` keeps deadline tasks only, `Some(false)` keeps the rest
    pub deadline: Option<bool>,
    pub due: Option<DueWindow>,
    pub search: Option<String>,
}

impl TaskQuery {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.assignee.is_none()
            && self.project.is_none()
            && self.kind.is_none()
            && self.deadline.is_none()
            && self.due.is_none()
            && self.search.as_deref().map_or(true, |s| s.trim().is_empty())
    }

    fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if task.kind != kind {
                return false;
            }
        }
        if let Some(deadline) = self.deadline {
            if task.is_deadline != deadline {
                return false;
            }
        }
        if let Some(assignee) = &self.assignee {
            match &task.assignee {
                Some(name) if name.eq_ignore_ascii_case(assignee) => {}
                _ => return false,
            }
        }
        if let Some(project) = &self.project {
            if task.project.as_ref() != Some(project) {
                return false;
            }
        }
        if let Some(window) = self.due {
            if !window.matches(task, today) {
                return false;
            }
        }
        if let Some(text) = &self.search {
            if !text.trim().is_empty() && !search::matches(task, text) {
                return false;
            }
        }
        true
    }
}

/// Due-date windows relative to a reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueWindow {
    Overdue,
    Today,
    ThisWeek,
    NextWeek,
    NoDueDate,
}

impl DueWindow {
    /// Checks the task's due date against the window
    ///
    /// A task without a due date only matches [`DueWindow::NoDueDate`].
    /// Weeks run Monday through Sunday, both ends inclusive. Done tasks
    /// are never overdue.
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        let due = match task.due_date {
            Some(due) => due,
            None => return matches!(self, DueWindow::NoDueDate),
        };

        match self {
            DueWindow::NoDueDate => false,
            DueWindow::Overdue => due < today && !task.status.is_complete(),
            DueWindow::Today => due == today,
            DueWindow::ThisWeek => {
                let monday = week_start(today);
                due >= monday && due <= monday + Duration::days(6)
            }
            DueWindow::NextWeek => {
                let monday = week_start(today) + Duration::days(7);
                due >= monday && due <= monday + Duration::days(6)
            }
        }
    }
}

impl fmt::Display for DueWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DueWindow::Overdue => "overdue",
            DueWindow::Today => "today",
            DueWindow::ThisWeek => "this-week",
            DueWindow::NextWeek => "next-week",
            DueWindow::NoDueDate => "no-due-date",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for DueWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overdue" => Ok(DueWindow::Overdue),
            "today" => Ok(DueWindow::Today),
            "this-week" | "this_week" => Ok(DueWindow::ThisWeek),
            "next-week" | "next_week" => Ok(DueWindow::NextWeek),
            "no-due-date" | "no_due_date" | "none" => Ok(DueWindow::NoDueDate),
            _ => Err(format!(
                "Invalid due window '{}' (expected: overdue, today, this-week, next-week, no-due-date)",
                s
            )),
        }
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Sort key for task listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    DueDate,
    Priority,
    Title,
    Status,
    Assignee,
    Dependencies,
    CreatedAt,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "due" | "due-date" | "due_date" => Ok(SortKey::DueDate),
            "priority" => Ok(SortKey::Priority),
            "title" => Ok(SortKey::Title),
            "status" => Ok(SortKey::Status),
            "assignee" => Ok(SortKey::Assignee),
            "deps" | "dependencies" => Ok(SortKey::Dependencies),
            "created" | "created-at" | "created_at" => Ok(SortKey::CreatedAt),
            _ => Err(format!(
                "Invalid sort key '{}' (expected: due, priority, title, status, assignee, deps, created)",
                s
            )),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid sort order '{}' (expected: asc, desc)", s)),
        }
    }
}

/// Filters the task list, keeping stored order
pub fn apply(tasks: &[Task], query: &TaskQuery, today: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| query.matches(task, today))
        .cloned()
        .collect()
}

/// Stable-sorts tasks in place on the given key
///
/// Missing values sort last under ascending order: tasks without a due
/// date land after every dated task, unassigned tasks after every
/// assigned one. Statuses order by workflow stage, not alphabetically.
pub fn sort_tasks(tasks: &mut [Task], key: SortKey, order: SortOrder) {
    let compare = |a: &Task, b: &Task| match key {
        SortKey::DueDate => {
            let a_due = a.due_date.unwrap_or(NaiveDate::MAX);
            let b_due = b.due_date.unwrap_or(NaiveDate::MAX);
            a_due.cmp(&b_due)
        }
        SortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Status => a.status.cmp(&b.status),
        SortKey::Assignee => {
            let a_name = a.assignee.as_ref().map(|n| n.to_lowercase());
            let b_name = b.assignee.as_ref().map(|n| n.to_lowercase());
            match (a_name, b_name) {
                (Some(a_name), Some(b_name)) => a_name.cmp(&b_name),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        }
        SortKey::Dependencies => a.dependencies.len().cmp(&b.dependencies.len()),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
    };

    match order {
        SortOrder::Asc => tasks.sort_by(compare),
        SortOrder::Desc => tasks.sort_by(|a, b| compare(a, b).reverse()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_task(title: &str) -> Task {
        let now = Utc::now();
        Task::new(TaskId::new(title, now), title, now)
    }

    // 2024-06-12 is a Wednesday
    fn today() -> NaiveDate {
        date(2024, 6, 12)
    }

    #[test]
    fn empty_query_keeps_everything() {
        let tasks = vec![make_task("a"), make_task("b")];
        let query = TaskQuery::default();

        assert!(query.is_empty());
        assert_eq!(apply(&tasks, &query, today()).len(), 2);
    }

    #[test]
    fn status_filter() {
        let mut done = make_task("done");
        done.status = TaskStatus::Done;
        let tasks = vec![make_task("open"), done];

        let query = TaskQuery {
            status: Some(TaskStatus::Done),
            ..TaskQuery::default()
        };
        let result = apply(&tasks, &query, today());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "done");
    }

    #[test]
    fn priority_and_kind_filters() {
        let mut urgent = make_task("urgent");
        urgent.priority = Priority::High;
        let mut marker = make_task("marker");
        marker.kind = TaskKind::Milestone;
        let tasks = vec![make_task("plain"), urgent, marker];

        let high_only = TaskQuery {
            priority: Some(Priority::High),
            ..TaskQuery::default()
        };
        assert_eq!(apply(&tasks, &high_only, today()).len(), 1);

        let milestones_only = TaskQuery {
            kind: Some(TaskKind::Milestone),
            ..TaskQuery::default()
        };
        assert_eq!(apply(&tasks, &milestones_only, today()).len(), 1);

        // Plain tasks only, excluding milestones
        let tasks_only = TaskQuery {
            kind: Some(TaskKind::Task),
            ..TaskQuery::default()
        };
        assert_eq!(apply(&tasks, &tasks_only, today()).len(), 2);
    }

    #[test]
    fn deadline_filter_is_tri_state() {
        let mut hard = make_task("hard");
        hard.is_deadline = true;
        let tasks = vec![make_task("soft"), hard];

        let deadlines = TaskQuery {
            deadline: Some(true),
            ..TaskQuery::default()
        };
        assert_eq!(apply(&tasks, &deadlines, today())[0].title, "hard");

        let normal = TaskQuery {
            deadline: Some(false),
            ..TaskQuery::default()
        };
        assert_eq!(apply(&tasks, &normal, today())[0].title, "soft");
    }

    #[test]
    fn assignee_filter_ignores_case() {
        let mut task = make_task("handoff");
        task.assignee = Some("Morgan".to_string());
        let tasks = vec![task, make_task("unassigned")];

        let query = TaskQuery {
            assignee: Some("morgan".to_string()),
            ..TaskQuery::default()
        };
        let result = apply(&tasks, &query, today());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "handoff");
    }

    #[test]
    fn filters_compose_with_and() {
        let mut both = make_task("both");
        both.status = TaskStatus::InProgress;
        both.priority = Priority::High;
        let mut only_status = make_task("only-status");
        only_status.status = TaskStatus::InProgress;

        let tasks = vec![both, only_status];
        let query = TaskQuery {
            status: Some(TaskStatus::InProgress),
            priority: Some(Priority::High),
            ..TaskQuery::default()
        };
        let result = apply(&tasks, &query, today());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "both");
    }

    #[test]
    fn overdue_window_excludes_done_tasks() {
        let mut late = make_task("late");
        late.due_date = Some(date(2024, 6, 10));
        let mut finished = make_task("finished");
        finished.due_date = Some(date(2024, 6, 10));
        finished.status = TaskStatus::Done;
        let mut upcoming = make_task("upcoming");
        upcoming.due_date = Some(date(2024, 6, 14));

        let tasks = vec![late, finished, upcoming];
        let query = TaskQuery {
            due: Some(DueWindow::Overdue),
            ..TaskQuery::default()
        };
        let result = apply(&tasks, &query, today());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "late");
    }

    #[test]
    fn due_today_window() {
        let mut today_task = make_task("today");
        today_task.due_date = Some(today());
        let mut tomorrow_task = make_task("tomorrow");
        tomorrow_task.due_date = Some(date(2024, 6, 13));

        let tasks = vec![today_task, tomorrow_task];
        let query = TaskQuery {
            due: Some(DueWindow::Today),
            ..TaskQuery::default()
        };

        assert_eq!(apply(&tasks, &query, today())[0].title, "today");
    }

    #[test]
    fn this_week_window_runs_monday_through_sunday() {
        let mut monday = make_task("monday");
        monday.due_date = Some(date(2024, 6, 10));
        let mut sunday = make_task("sunday");
        sunday.due_date = Some(date(2024, 6, 16));
        let mut next_monday = make_task("next-monday");
        next_monday.due_date = Some(date(2024, 6, 17));

        let tasks = vec![monday, sunday, next_monday];
        let query = TaskQuery {
            due: Some(DueWindow::ThisWeek),
            ..TaskQuery::default()
        };
        let titles: Vec<_> = apply(&tasks, &query, today())
            .into_iter()
            .map(|t| t.title)
            .collect();

        assert_eq!(titles, vec!["monday", "sunday"]);
    }

    #[test]
    fn next_week_window() {
        let mut this_sunday = make_task("this-sunday");
        this_sunday.due_date = Some(date(2024, 6, 16));
        let mut next_monday = make_task("next-monday");
        next_monday.due_date = Some(date(2024, 6, 17));
        let mut next_sunday = make_task("next-sunday");
        next_sunday.due_date = Some(date(2024, 6, 23));
        let mut after = make_task("after");
        after.due_date = Some(date(2024, 6, 24));

        let tasks = vec![this_sunday, next_monday, next_sunday, after];
        let query = TaskQuery {
            due: Some(DueWindow::NextWeek),
            ..TaskQuery::default()
        };
        let titles: Vec<_> = apply(&tasks, &query, today())
            .into_iter()
            .map(|t| t.title)
            .collect();

        assert_eq!(titles, vec!["next-monday", "next-sunday"]);
    }

    #[test]
    fn dateless_task_only_matches_no_due_date() {
        let dateless = make_task("someday");
        let mut dated = make_task("dated");
        dated.due_date = Some(today());
        let tasks = vec![dateless, dated];

        let none_window = TaskQuery {
            due: Some(DueWindow::NoDueDate),
            ..TaskQuery::default()
        };
        assert_eq!(apply(&tasks, &none_window, today())[0].title, "someday");

        for window in [DueWindow::Overdue, DueWindow::Today, DueWindow::ThisWeek] {
            let query = TaskQuery {
                due: Some(window),
                ..TaskQuery::default()
            };
            let result = apply(&tasks, &query, today());
            assert!(
                result.iter().all(|t| t.title != "someday"),
                "dateless task leaked into {:?}",
                window
            );
        }
    }

    #[test]
    fn search_composes_with_filters() {
        let mut hit = make_task("deploy website");
        hit.priority = Priority::High;
        let miss_text = make_task("write report");
        let mut miss_priority = make_task("deploy backend");
        miss_priority.priority = Priority::Low;

        let tasks = vec![hit, miss_text, miss_priority];
        let query = TaskQuery {
            priority: Some(Priority::High),
            search: Some("deploy".to_string()),
            ..TaskQuery::default()
        };
        let result = apply(&tasks, &query, today());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "deploy website");
    }

    #[test]
    fn blank_search_is_ignored() {
        let tasks = vec![make_task("a"), make_task("b")];
        let query = TaskQuery {
            search: Some("   ".to_string()),
            ..TaskQuery::default()
        };

        assert!(query.is_empty());
        assert_eq!(apply(&tasks, &query, today()).len(), 2);
    }

    #[test]
    fn sort_by_due_puts_dateless_last() {
        let mut late = make_task("late");
        late.due_date = Some(date(2024, 6, 20));
        let mut early = make_task("early");
        early.due_date = Some(date(2024, 6, 11));
        let dateless = make_task("dateless");

        let mut tasks = vec![dateless, late, early];
        sort_tasks(&mut tasks, SortKey::DueDate, SortOrder::Asc);

        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["early", "late", "dateless"]);
    }

    #[test]
    fn sort_by_priority_desc_puts_high_first() {
        let mut low = make_task("low");
        low.priority = Priority::Low;
        let mut high = make_task("high");
        high.priority = Priority::High;
        let medium = make_task("medium");

        let mut tasks = vec![low, medium, high];
        sort_tasks(&mut tasks, SortKey::Priority, SortOrder::Desc);

        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "medium", "low"]);
    }

    #[test]
    fn sort_by_title_ignores_case() {
        let mut tasks = vec![make_task("beta"), make_task("Alpha"), make_task("gamma")];
        sort_tasks(&mut tasks, SortKey::Title, SortOrder::Asc);

        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn sort_by_status_follows_workflow_order() {
        let mut done = make_task("done");
        done.status = TaskStatus::Done;
        let mut active = make_task("active");
        active.status = TaskStatus::InProgress;
        let todo = make_task("todo");

        let mut tasks = vec![done, todo, active];
        sort_tasks(&mut tasks, SortKey::Status, SortOrder::Asc);

        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["todo", "active", "done"]);
    }

    #[test]
    fn sort_by_assignee_puts_unassigned_last() {
        let mut zoe = make_task("zoe's");
        zoe.assignee = Some("Zoe".to_string());
        let mut adam = make_task("adam's");
        adam.assignee = Some("adam".to_string());
        let unassigned = make_task("unassigned");

        let mut tasks = vec![unassigned, zoe, adam];
        sort_tasks(&mut tasks, SortKey::Assignee, SortOrder::Asc);

        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["adam's", "zoe's", "unassigned"]);
    }

    #[test]
    fn sort_by_dependency_count() {
        let dep_a = make_task("dep-a");
        let dep_b = make_task("dep-b");
        let mut two = make_task("two");
        two.dependencies.add(dep_a.id.clone());
        two.dependencies.add(dep_b.id.clone());
        let mut one = make_task("one");
        one.dependencies.add(dep_a.id.clone());
        let zero = make_task("zero");

        let mut tasks = vec![two, zero, one];
        sort_tasks(&mut tasks, SortKey::Dependencies, SortOrder::Asc);

        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["zero", "one", "two"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut first = make_task("first");
        first.due_date = Some(today());
        let mut second = make_task("second");
        second.due_date = Some(today());

        let mut tasks = vec![first, second];
        sort_tasks(&mut tasks, SortKey::DueDate, SortOrder::Asc);
        assert_eq!(tasks[0].title, "first");

        // Reversing equal keys must not swap them either
        sort_tasks(&mut tasks, SortKey::DueDate, SortOrder::Desc);
        assert_eq!(tasks[0].title, "first");
    }

    #[test]
    fn due_window_parses_from_str() {
        assert_eq!("overdue".parse::<DueWindow>().unwrap(), DueWindow::Overdue);
        assert_eq!(
            "this-week".parse::<DueWindow>().unwrap(),
            DueWindow::ThisWeek
        );
        assert_eq!(
            "no-due-date".parse::<DueWindow>().unwrap(),
            DueWindow::NoDueDate
        );
        assert!("last-year".parse::<DueWindow>().is_err());
    }

    #[test]
    fn sort_key_parses_from_str() {
        assert_eq!("due".parse::<SortKey>().unwrap(), SortKey::DueDate);
        assert_eq!("deps".parse::<SortKey>().unwrap(), SortKey::Dependencies);
        assert_eq!("created".parse::<SortKey>().unwrap(), SortKey::CreatedAt);
        assert!("color".parse::<SortKey>().is_err());
    }
}
