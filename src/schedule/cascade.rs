//! Cascading reschedule
//!
//! Moving a task's end date ripples through every task that transitively
//! depends on it: each dependent is re-dated to start the day after its
//! latest-ending prerequisite, keeping its own duration. Per-task
//! constraints can block individual branches without aborting the rest
//! of the run, so a cascade reports both what moved and what could not.
//!
//! Traversal is breadth-first from the changed task. A dependent reached
//! through several branches (a diamond) is deferred until every one of
//! its prerequisites inside the cascade has settled, then anchored to
//! the latest successful end date among them. A dependent whose
//! prerequisites all failed stays where it is, without a failure record
//! of its own.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{Task, TaskId};
use crate::storage::{StoreError, TaskPatch, TaskRepository};

/// Dependency levels a cascade may descend before a branch is cut off
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// One applied date change
#[derive(Debug, Clone, Serialize)]
pub struct Rescheduled {
    pub task: TaskId,
    pub title: String,
    pub old_start: Option<NaiveDate>,
    pub old_due: Option<NaiveDate>,
    pub new_start: NaiveDate,
    pub new_due: NaiveDate,
}

/// Why a branch could not be rescheduled
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    StartConstraint {
        proposed: NaiveDate,
        limit: NaiveDate,
    },
    EndConstraint {
        proposed: NaiveDate,
        limit: NaiveDate,
    },
    DepthExceeded {
        limit: usize,
    },
}

/// A task the cascade had to leave in place
#[derive(Debug, Clone, Serialize)]
pub struct CascadeFailure {
    pub task: TaskId,
    pub title: String,
    pub reason: FailureReason,
}

impl fmt::Display for CascadeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            FailureReason::StartConstraint { proposed, limit } => write!(
                f,
                "'{}': proposed start {} exceeds max start date {}",
                self.title, proposed, limit
            ),
            FailureReason::EndConstraint { proposed, limit } => write!(
                f,
                "'{}': proposed end {} exceeds max end date {}",
                self.title, proposed, limit
            ),
            FailureReason::DepthExceeded { limit } => write!(
                f,
                "'{}': dependency chain exceeds {} levels",
                self.title, limit
            ),
        }
    }
}

/// Full outcome of a cascade: what moved and what was blocked
///
/// Applied updates stay committed even when failures are present.
#[derive(Debug, Clone, Serialize)]
pub struct CascadeReport {
    pub applied: Vec<Rescheduled>,
    pub failures: Vec<CascadeFailure>,
}

impl fmt::Display for CascadeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} task(s) could not be rescheduled", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  - {}", failure)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum CascadeError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// At least one branch was blocked; the report carries the updates
    /// that were committed anyway
    #[error("{0}")]
    Blocked(CascadeReport),
}

/// Per-node bookkeeping during one cascade run
#[derive(Debug, Clone, Copy, Default)]
struct NodeState {
    /// In-cascade prerequisites that have not settled yet
    prereq_remaining: usize,
    /// Latest end date among successfully rescheduled prerequisites
    anchor: Option<NaiveDate>,
    /// Longest successful prerequisite chain back to the root
    depth: usize,
}

/// Applies an end-date change and ripples it through all dependents
pub struct Cascader<'s, R: TaskRepository> {
    store: &'s mut R,
    max_depth: usize,
}

impl<'s, R: TaskRepository> Cascader<'s, R> {
    pub fn new(store: &'s mut R) -> Self {
        Self {
            store,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(store: &'s mut R, max_depth: usize) -> Self {
        Self { store, max_depth }
    }

    /// Moves `task_id`'s due date to `new_end` and re-dates every
    /// transitive dependent to follow it
    ///
    /// Each dependent keeps its pre-cascade duration and starts the day
    /// after its latest-ending prerequisite. Returns the applied changes
    /// in traversal order. If any branch hits a constraint or the depth
    /// limit the call fails with [`CascadeError::Blocked`], but changes
    /// applied before and beside the blocked branch remain committed.
    pub fn reschedule(
        &mut self,
        task_id: &TaskId,
        new_end: NaiveDate,
    ) -> Result<Vec<Rescheduled>, CascadeError> {
        let tasks = self.store.all()?;

        let root = match tasks.iter().find(|t| &t.id == task_id) {
            Some(task) => task,
            None => return Err(CascadeError::TaskNotFound(task_id.clone())),
        };

        // The trigger task only has its due date moved; its start (and
        // so its duration) is whatever the caller left there.
        let root_patch = TaskPatch {
            due_date: Some(Some(new_end)),
            ..TaskPatch::default()
        };
        self.store.update(task_id, root_patch)?;

        let by_id: HashMap<&TaskId, &Task> = tasks.iter().map(|t| (&t.id, t)).collect();

        // Prerequisite id -> dependent ids, in stored task order so
        // traversal and output order are deterministic.
        let mut dependents_of: HashMap<&TaskId, Vec<&TaskId>> = HashMap::new();
        for task in &tasks {
            for dep in task.dependencies.iter() {
                dependents_of.entry(dep).or_default().push(&task.id);
            }
        }

        // Everything transitively downstream of the root.
        let mut members: HashSet<&TaskId> = HashSet::new();
        members.insert(&root.id);
        let mut discovered: Vec<&TaskId> = Vec::new();
        let mut scan: VecDeque<&TaskId> = VecDeque::new();
        scan.push_back(&root.id);
        while let Some(id) = scan.pop_front() {
            if let Some(dependents) = dependents_of.get(id) {
                for dependent in dependents {
                    if members.insert(dependent) {
                        discovered.push(dependent);
                        scan.push_back(dependent);
                    }
                }
            }
        }

        let mut states: HashMap<&TaskId, NodeState> = HashMap::new();
        for id in &discovered {
            if let Some(task) = by_id.get(id) {
                let prereqs = task
                    .dependencies
                    .iter()
                    .filter(|dep| members.contains(*dep))
                    .count();
                states.insert(
                    *id,
                    NodeState {
                        prereq_remaining: prereqs,
                        ..NodeState::default()
                    },
                );
            }
        }

        let mut ready: VecDeque<&TaskId> = VecDeque::new();
        let mut applied: Vec<Rescheduled> = Vec::new();
        let mut failures: Vec<CascadeFailure> = Vec::new();

        settle(
            &root.id,
            Some((new_end, 0)),
            &dependents_of,
            &mut states,
            &mut ready,
        );

        while let Some(id) = ready.pop_front() {
            let task = match by_id.get(id) {
                Some(task) => *task,
                None => continue,
            };
            let (anchor, depth) = match states.get(id) {
                Some(state) => (state.anchor, state.depth),
                None => continue,
            };

            // No prerequisite of this task was successfully rescheduled,
            // so there is nothing to follow; the branch stays put.
            let anchor = match anchor {
                Some(anchor) => anchor,
                None => {
                    settle(id, None, &dependents_of, &mut states, &mut ready);
                    continue;
                }
            };

            if depth > self.max_depth {
                failures.push(CascadeFailure {
                    task: id.clone(),
                    title: task.title.clone(),
                    reason: FailureReason::DepthExceeded {
                        limit: self.max_depth,
                    },
                });
                settle(id, None, &dependents_of, &mut states, &mut ready);
                continue;
            }

            let duration = task.duration_days();
            let new_start = anchor + Duration::days(1);
            let new_due = new_start + Duration::days(duration - 1);

            if let Some(limit) = task.constraints.max_start_date {
                if new_start > limit {
                    failures.push(CascadeFailure {
                        task: id.clone(),
                        title: task.title.clone(),
                        reason: FailureReason::StartConstraint {
                            proposed: new_start,
                            limit,
                        },
                    });
                    settle(id, None, &dependents_of, &mut states, &mut ready);
                    continue;
                }
            }
            if let Some(limit) = task.constraints.max_end_date {
                if new_due > limit {
                    failures.push(CascadeFailure {
                        task: id.clone(),
                        title: task.title.clone(),
                        reason: FailureReason::EndConstraint {
                            proposed: new_due,
                            limit,
                        },
                    });
                    settle(id, None, &dependents_of, &mut states, &mut ready);
                    continue;
                }
            }

            self.store
                .update(id, TaskPatch::reschedule(new_start, new_due))?;
            applied.push(Rescheduled {
                task: id.clone(),
                title: task.title.clone(),
                old_start: task.start_date,
                old_due: task.due_date,
                new_start,
                new_due,
            });
            settle(
                id,
                Some((new_due, depth)),
                &dependents_of,
                &mut states,
                &mut ready,
            );
        }

        if failures.is_empty() {
            Ok(applied)
        } else {
            Err(CascadeError::Blocked(CascadeReport { applied, failures }))
        }
    }
}

/// Marks one node settled and wakes dependents whose prerequisites are
/// all accounted for
///
/// `outcome` is the node's new end date and depth on success, `None`
/// when the node failed or was skipped.
fn settle<'a>(
    finished: &TaskId,
    outcome: Option<(NaiveDate, usize)>,
    dependents_of: &HashMap<&'a TaskId, Vec<&'a TaskId>>,
    states: &mut HashMap<&'a TaskId, NodeState>,
    ready: &mut VecDeque<&'a TaskId>,
) {
    let dependents = match dependents_of.get(finished) {
        Some(dependents) => dependents,
        None => return,
    };

    for dependent in dependents {
        let state = match states.get_mut(*dependent) {
            Some(state) => state,
            None => continue,
        };

        if let Some((end, depth)) = outcome {
            state.anchor = Some(match state.anchor {
                Some(current) => current.max(end),
                None => end,
            });
            state.depth = state.depth.max(depth + 1);
        }

        state.prereq_remaining = state.prereq_remaining.saturating_sub(1);
        if state.prereq_remaining == 0 {
            ready.push_back(dependent);
        }
    }
}

/// Re-dates one task to a new start, keeping its duration
///
/// This is the plain drag-to-move operation; it touches nothing
/// downstream. Use [`Cascader::reschedule`] to pull dependents along.
pub fn move_task<R: TaskRepository>(
    store: &mut R,
    task_id: &TaskId,
    new_start: NaiveDate,
) -> Result<Rescheduled, CascadeError> {
    let task = match store.get(task_id)? {
        Some(task) => task,
        None => return Err(CascadeError::TaskNotFound(task_id.clone())),
    };

    let new_due = new_start + Duration::days(task.duration_days() - 1);
    store.update(task_id, TaskPatch::reschedule(new_start, new_due))?;

    Ok(Rescheduled {
        task: task.id.clone(),
        title: task.title.clone(),
        old_start: task.start_date,
        old_due: task.due_date,
        new_start,
        new_due,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_task(title: &str) -> Task {
        let now = Utc::now();
        Task::new(TaskId::new(title, now), title, now)
    }

    fn scheduled(title: &str, start: NaiveDate, due: NaiveDate) -> Task {
        let mut task = make_task(title);
        task.start_date = Some(start);
        task.due_date = Some(due);
        task
    }

    fn depends(task: &mut Task, on: &Task) {
        task.dependencies.add(on.id.clone());
    }

    #[test]
    fn cascade_moves_direct_dependent() {
        let mut a = make_task("A");
        a.due_date = Some(date(2024, 6, 14));
        let mut b = scheduled("B", date(2024, 6, 1), date(2024, 6, 3));
        depends(&mut b, &a);

        let mut store = MemoryStore::with_tasks(vec![a.clone(), b.clone()]);
        let applied = Cascader::new(&mut store)
            .reschedule(&a.id, date(2024, 6, 20))
            .unwrap();

        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].task, b.id);
        assert_eq!(applied[0].old_start, Some(date(2024, 6, 1)));
        assert_eq!(applied[0].old_due, Some(date(2024, 6, 3)));
        assert_eq!(applied[0].new_start, date(2024, 6, 21));
        assert_eq!(applied[0].new_due, date(2024, 6, 23));

        let stored_a = store.get(&a.id).unwrap().unwrap();
        assert_eq!(stored_a.due_date, Some(date(2024, 6, 20)));
        let stored_b = store.get(&b.id).unwrap().unwrap();
        assert_eq!(stored_b.start_date, Some(date(2024, 6, 21)));
        assert_eq!(stored_b.due_date, Some(date(2024, 6, 23)));
    }

    #[test]
    fn trigger_keeps_its_start_date() {
        let mut a = scheduled("A", date(2024, 6, 10), date(2024, 6, 14));
        let mut b = scheduled("B", date(2024, 6, 15), date(2024, 6, 16));
        depends(&mut b, &a);

        let mut store = MemoryStore::with_tasks(vec![a.clone(), b]);
        Cascader::new(&mut store)
            .reschedule(&a.id, date(2024, 6, 20))
            .unwrap();

        let stored_a = store.get(&a.id).unwrap().unwrap();
        assert_eq!(stored_a.start_date, Some(date(2024, 6, 10)));
        assert_eq!(stored_a.due_date, Some(date(2024, 6, 20)));
    }

    #[test]
    fn chain_cascades_transitively() {
        let mut a = make_task("A");
        a.due_date = Some(date(2024, 6, 14));
        let mut b = scheduled("B", date(2024, 6, 1), date(2024, 6, 3));
        depends(&mut b, &a);
        let mut c = scheduled("C", date(2024, 6, 4), date(2024, 6, 4));
        depends(&mut c, &b);

        let mut store = MemoryStore::with_tasks(vec![a.clone(), b.clone(), c.clone()]);
        let applied = Cascader::new(&mut store)
            .reschedule(&a.id, date(2024, 6, 20))
            .unwrap();

        assert_eq!(applied.len(), 2);
        // B follows A, C follows B's new end
        assert_eq!(applied[0].new_due, date(2024, 6, 23));
        assert_eq!(applied[1].new_start, date(2024, 6, 24));
        assert_eq!(applied[1].new_due, date(2024, 6, 24));
    }

    #[test]
    fn cascade_preserves_duration() {
        let mut a = make_task("A");
        a.due_date = Some(date(2024, 6, 14));
        let mut b = scheduled("B", date(2024, 6, 1), date(2024, 6, 7));
        depends(&mut b, &a);
        let mut c = scheduled("C", date(2024, 6, 8), date(2024, 6, 9));
        depends(&mut c, &b);

        let mut store = MemoryStore::with_tasks(vec![a.clone(), b.clone(), c.clone()]);
        let applied = Cascader::new(&mut store)
            .reschedule(&a.id, date(2024, 7, 1))
            .unwrap();

        for change in &applied {
            let old_duration = (change.old_due.unwrap() - change.old_start.unwrap()).num_days();
            let new_duration = (change.new_due - change.new_start).num_days();
            assert_eq!(old_duration, new_duration);
        }
    }

    #[test]
    fn cascade_can_pull_dependents_earlier() {
        let mut a = scheduled("A", date(2024, 6, 1), date(2024, 6, 14));
        let mut b = scheduled("B", date(2024, 6, 15), date(2024, 6, 16));
        depends(&mut b, &a);

        let mut store = MemoryStore::with_tasks(vec![a.clone(), b.clone()]);
        Cascader::new(&mut store)
            .reschedule(&a.id, date(2024, 6, 5))
            .unwrap();

        let stored_b = store.get(&b.id).unwrap().unwrap();
        assert_eq!(stored_b.start_date, Some(date(2024, 6, 6)));
        assert_eq!(stored_b.due_date, Some(date(2024, 6, 7)));
    }

    #[test]
    fn dateless_dependent_lands_after_the_trigger() {
        let mut a = make_task("A");
        a.due_date = Some(date(2024, 6, 14));
        let mut b = make_task("B");
        depends(&mut b, &a);

        let mut store = MemoryStore::with_tasks(vec![a.clone(), b.clone()]);
        Cascader::new(&mut store)
            .reschedule(&a.id, date(2024, 6, 20))
            .unwrap();

        let stored_b = store.get(&b.id).unwrap().unwrap();
        assert_eq!(stored_b.start_date, Some(date(2024, 6, 21)));
        assert_eq!(stored_b.due_date, Some(date(2024, 6, 21)));
    }

    #[test]
    fn end_constraint_blocks_branch_but_not_siblings() {
        let mut a = make_task("A");
        a.due_date = Some(date(2024, 6, 14));
        let mut blocked = scheduled("Blocked", date(2024, 6, 1), date(2024, 6, 3));
        blocked.constraints.max_end_date = Some(date(2024, 6, 18));
        depends(&mut blocked, &a);
        let mut downstream = scheduled("Downstream", date(2024, 6, 4), date(2024, 6, 5));
        depends(&mut downstream, &blocked);
        let mut free = scheduled("Free", date(2024, 6, 1), date(2024, 6, 2));
        depends(&mut free, &a);

        let mut store = MemoryStore::with_tasks(vec![
            a.clone(),
            blocked.clone(),
            downstream.clone(),
            free.clone(),
        ]);
        let result = Cascader::new(&mut store).reschedule(&a.id, date(2024, 6, 20));

        let report = match result {
            Err(CascadeError::Blocked(report)) => report,
            other => panic!("expected blocked cascade, got {:?}", other.map(|_| ())),
        };

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].task, blocked.id);
        assert!(matches!(
            report.failures[0].reason,
            FailureReason::EndConstraint { .. }
        ));

        // The sibling branch was still applied and committed
        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.applied[0].task, free.id);
        let stored_free = store.get(&free.id).unwrap().unwrap();
        assert_eq!(stored_free.start_date, Some(date(2024, 6, 21)));

        // The blocked task and everything under it stay put, and the
        // downstream task gets no failure record of its own
        let stored_blocked = store.get(&blocked.id).unwrap().unwrap();
        assert_eq!(stored_blocked.start_date, Some(date(2024, 6, 1)));
        let stored_downstream = store.get(&downstream.id).unwrap().unwrap();
        assert_eq!(stored_downstream.start_date, Some(date(2024, 6, 4)));
    }

    #[test]
    fn start_constraint_blocks_branch() {
        let mut a = make_task("A");
        a.due_date = Some(date(2024, 6, 14));
        let mut b = scheduled("B", date(2024, 6, 1), date(2024, 6, 3));
        b.constraints.max_start_date = Some(date(2024, 6, 15));
        depends(&mut b, &a);

        let mut store = MemoryStore::with_tasks(vec![a.clone(), b.clone()]);
        let result = Cascader::new(&mut store).reschedule(&a.id, date(2024, 6, 20));

        match result {
            Err(CascadeError::Blocked(report)) => {
                assert!(matches!(
                    report.failures[0].reason,
                    FailureReason::StartConstraint {
                        proposed,
                        limit,
                    } if proposed == date(2024, 6, 21) && limit == date(2024, 6, 15)
                ));
            }
            other => panic!("expected blocked cascade, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn diamond_converges_on_latest_prerequisite() {
        let mut a = make_task("A");
        a.due_date = Some(date(2024, 6, 14));
        let mut short = scheduled("Short", date(2024, 6, 1), date(2024, 6, 2));
        depends(&mut short, &a);
        let mut long = scheduled("Long", date(2024, 6, 1), date(2024, 6, 5));
        depends(&mut long, &a);
        let mut joined = scheduled("Joined", date(2024, 6, 6), date(2024, 6, 7));
        depends(&mut joined, &short);
        depends(&mut joined, &long);

        let mut store =
            MemoryStore::with_tasks(vec![a.clone(), short.clone(), long.clone(), joined.clone()]);
        let applied = Cascader::new(&mut store)
            .reschedule(&a.id, date(2024, 6, 20))
            .unwrap();

        // Joined is processed exactly once, after both branches
        let joined_changes: Vec<_> = applied.iter().filter(|r| r.task == joined.id).collect();
        assert_eq!(joined_changes.len(), 1);

        // Short ends 2024-06-22, Long ends 2024-06-25; Joined follows Long
        assert_eq!(joined_changes[0].new_start, date(2024, 6, 26));
        assert_eq!(joined_changes[0].new_due, date(2024, 6, 27));
    }

    #[test]
    fn diamond_with_one_blocked_branch_follows_the_other() {
        let mut a = make_task("A");
        a.due_date = Some(date(2024, 6, 14));
        let mut blocked = scheduled("Blocked", date(2024, 6, 1), date(2024, 6, 2));
        blocked.constraints.max_end_date = Some(date(2024, 6, 10));
        depends(&mut blocked, &a);
        let mut open = scheduled("Open", date(2024, 6, 1), date(2024, 6, 3));
        depends(&mut open, &a);
        let mut joined = scheduled("Joined", date(2024, 6, 6), date(2024, 6, 7));
        depends(&mut joined, &blocked);
        depends(&mut joined, &open);

        let mut store =
            MemoryStore::with_tasks(vec![a.clone(), blocked.clone(), open.clone(), joined.clone()]);
        let result = Cascader::new(&mut store).reschedule(&a.id, date(2024, 6, 20));

        let report = match result {
            Err(CascadeError::Blocked(report)) => report,
            other => panic!("expected blocked cascade, got {:?}", other.map(|_| ())),
        };

        // Joined still moves, anchored to the branch that succeeded
        let joined_change = report
            .applied
            .iter()
            .find(|r| r.task == joined.id)
            .expect("joined should be rescheduled");
        assert_eq!(joined_change.new_start, date(2024, 6, 24));
    }

    #[test]
    fn depth_limit_cuts_off_long_chains() {
        let mut a = make_task("A");
        a.due_date = Some(date(2024, 6, 14));
        let mut tasks = vec![a.clone()];
        let mut previous = a.clone();
        for level in 1..=4 {
            let mut task = make_task(&format!("level-{}", level));
            depends(&mut task, &previous);
            tasks.push(task.clone());
            previous = task;
        }

        let mut store = MemoryStore::with_tasks(tasks.clone());
        let result =
            Cascader::with_max_depth(&mut store, 2).reschedule(&a.id, date(2024, 6, 20));

        let report = match result {
            Err(CascadeError::Blocked(report)) => report,
            other => panic!("expected blocked cascade, got {:?}", other.map(|_| ())),
        };

        // Levels 1 and 2 moved, level 3 was cut off, level 4 is skipped
        // without its own failure record
        assert_eq!(report.applied.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].title, "level-3");
        assert!(matches!(
            report.failures[0].reason,
            FailureReason::DepthExceeded { limit: 2 }
        ));

        let level_4 = store.get(&tasks[4].id).unwrap().unwrap();
        assert!(level_4.start_date.is_none());
    }

    #[test]
    fn default_depth_allows_ten_levels() {
        let mut a = make_task("A");
        a.due_date = Some(date(2024, 6, 14));
        let mut tasks = vec![a.clone()];
        let mut previous = a.clone();
        for level in 1..=11 {
            let mut task = make_task(&format!("level-{}", level));
            depends(&mut task, &previous);
            tasks.push(task.clone());
            previous = task;
        }

        let mut store = MemoryStore::with_tasks(tasks);
        let result = Cascader::new(&mut store).reschedule(&a.id, date(2024, 6, 20));

        let report = match result {
            Err(CascadeError::Blocked(report)) => report,
            other => panic!("expected blocked cascade, got {:?}", other.map(|_| ())),
        };

        assert_eq!(report.applied.len(), 10);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].title, "level-11");
    }

    #[test]
    fn missing_trigger_task_fails() {
        let ghost = make_task("Ghost");
        let mut store = MemoryStore::new();

        let result = Cascader::new(&mut store).reschedule(&ghost.id, date(2024, 6, 20));
        assert!(matches!(result, Err(CascadeError::TaskNotFound(_))));
    }

    #[test]
    fn trigger_with_later_start_is_rejected_before_any_cascade() {
        let mut a = scheduled("A", date(2024, 6, 25), date(2024, 6, 28));
        let mut b = scheduled("B", date(2024, 6, 29), date(2024, 6, 30));
        depends(&mut b, &a);

        let mut store = MemoryStore::with_tasks(vec![a.clone(), b.clone()]);
        let result = Cascader::new(&mut store).reschedule(&a.id, date(2024, 6, 20));

        assert!(matches!(
            result,
            Err(CascadeError::Store(StoreError::InvalidDateRange { .. }))
        ));
        // Nothing moved
        let stored_b = store.get(&b.id).unwrap().unwrap();
        assert_eq!(stored_b.start_date, Some(date(2024, 6, 29)));
    }

    #[test]
    fn report_lists_every_failure_message() {
        let mut a = make_task("A");
        a.due_date = Some(date(2024, 6, 14));
        let mut first = scheduled("First", date(2024, 6, 1), date(2024, 6, 2));
        first.constraints.max_end_date = Some(date(2024, 6, 10));
        depends(&mut first, &a);
        let mut second = scheduled("Second", date(2024, 6, 1), date(2024, 6, 2));
        second.constraints.max_start_date = Some(date(2024, 6, 10));
        depends(&mut second, &a);

        let mut store = MemoryStore::with_tasks(vec![a.clone(), first, second]);
        let err = Cascader::new(&mut store)
            .reschedule(&a.id, date(2024, 6, 20))
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("2 task(s) could not be rescheduled"));
        assert!(message.contains("'First'"));
        assert!(message.contains("'Second'"));
    }

    #[test]
    fn move_task_keeps_duration() {
        let task = scheduled("Move me", date(2024, 6, 12), date(2024, 6, 14));
        let mut store = MemoryStore::with_tasks(vec![task.clone()]);

        let change = move_task(&mut store, &task.id, date(2024, 7, 1)).unwrap();

        assert_eq!(change.old_start, Some(date(2024, 6, 12)));
        assert_eq!(change.new_start, date(2024, 7, 1));
        assert_eq!(change.new_due, date(2024, 7, 3));

        let stored = store.get(&task.id).unwrap().unwrap();
        assert_eq!(stored.due_date, Some(date(2024, 7, 3)));
    }

    #[test]
    fn move_task_missing_fails() {
        let ghost = make_task("Ghost");
        let mut store = MemoryStore::new();

        let result = move_task(&mut store, &ghost.id, date(2024, 7, 1));
        assert!(matches!(result, Err(CascadeError::TaskNotFound(_))));
    }

    #[test]
    fn move_of_unrelated_task_leaves_others_alone() {
        let a = scheduled("A", date(2024, 6, 1), date(2024, 6, 2));
        let b = scheduled("B", date(2024, 6, 3), date(2024, 6, 4));
        let mut store = MemoryStore::with_tasks(vec![a.clone(), b.clone()]);

        move_task(&mut store, &a.id, date(2024, 7, 1)).unwrap();

        let stored_b = store.get(&b.id).unwrap().unwrap();
        assert_eq!(stored_b.start_date, Some(date(2024, 6, 3)));
    }
}
