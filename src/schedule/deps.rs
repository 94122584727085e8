//! Guarded dependency edits
//!
//! Single-edge operations against the store: they load the full task
//! set, validate the edit on a [`DependencyGraph`], and only then write
//! the changed dependency list back. Either the whole edit lands or
//! nothing does.

use thiserror::Error;

use crate::domain::{DependencyGraph, GraphError, TaskId};
use crate::storage::{StoreError, TaskPatch, TaskRepository};

#[derive(Debug, Error)]
pub enum DependencyError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Makes `task` depend on `depends_on` and persists the new edge
///
/// Returns `Ok(false)` without writing anything when the edge already
/// exists. Fails, leaving the store untouched, when either id is
/// unknown, the two ids are equal, or the edge would close a cycle.
pub fn add_dependency<R: TaskRepository>(
    store: &mut R,
    task: &TaskId,
    depends_on: &TaskId,
) -> Result<bool, DependencyError> {
    let tasks = store.all()?;
    let mut graph = DependencyGraph::from_tasks(&tasks);

    if !graph.add_dependency(task, depends_on)? {
        return Ok(false);
    }

    let target = match tasks.iter().find(|t| &t.id == task) {
        Some(target) => target,
        None => return Err(GraphError::TaskNotFound(task.clone()).into()),
    };

    let mut dependencies = target.dependencies.clone();
    dependencies.add(depends_on.clone());

    let patch = TaskPatch {
        dependencies: Some(dependencies),
        ..TaskPatch::default()
    };
    store.update(task, patch)?;

    Ok(true)
}

/// Removes `depends_on` from `task`'s dependency list
///
/// Returns `Ok(false)` when the edge was not present. Removing an edge
/// whose target no longer exists is allowed, so dangling references in
/// hand-edited data can be cleaned up.
pub fn remove_dependency<R: TaskRepository>(
    store: &mut R,
    task: &TaskId,
    depends_on: &TaskId,
) -> Result<bool, DependencyError> {
    let target = match store.get(task)? {
        Some(target) => target,
        None => return Err(GraphError::TaskNotFound(task.clone()).into()),
    };

    let mut dependencies = target.dependencies.clone();
    if !dependencies.remove(depends_on) {
        return Ok(false);
    }

    let patch = TaskPatch {
        dependencies: Some(dependencies),
        ..TaskPatch::default()
    };
    store.update(task, patch)?;

    Ok(true)
}
