//! Dependency graph for tasks
//!
//! Manages task dependencies with cycle detection. Uses petgraph for the
//! underlying directed graph. Edges run dependency -> dependent, so a
//! task's prerequisites are its incoming neighbors.
//!
//! Cycle checks never mutate the graph: a prospective edge is validated by
//! running the DFS against the real adjacency plus one hypothetical edge.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use super::id::TaskId;
use super::task::Task;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Adding dependency would create a cycle: {0} -> {1}")]
    CycleDetected(TaskId, TaskId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Self-dependency not allowed: {0}")]
    SelfDependency(TaskId),
}

/// A dependency graph for tasks
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// The underlying directed graph
    graph: DiGraph<TaskId, ()>,

    /// Map from TaskId to node index
    node_map: HashMap<TaskId, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds a graph from a collection of tasks
    ///
    /// Edges referencing unknown task IDs are skipped. Mutations keep the
    /// stored graph acyclic, so stored data is trusted here; a cycle that
    /// slipped into hand-edited data is still reported by `detect_cycle`.
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut graph = Self::new();

        // First pass: add all nodes
        let tasks: Vec<_> = tasks.into_iter().collect();
        for task in &tasks {
            graph.add_task(task.id.clone());
        }

        // Second pass: add all edges
        for task in &tasks {
            for dep_id in &task.dependencies {
                graph.insert_edge(dep_id, &task.id);
            }
        }

        graph
    }

    /// Adds a task to the graph
    pub fn add_task(&mut self, task_id: TaskId) {
        if !self.node_map.contains_key(&task_id) {
            let idx = self.graph.add_node(task_id.clone());
            self.node_map.insert(task_id, idx);
        }
    }

    /// Inserts an edge without validation, skipping unknown IDs and duplicates
    fn insert_edge(&mut self, depends_on: &TaskId, task: &TaskId) {
        if let (Some(&dep_idx), Some(&task_idx)) =
            (self.node_map.get(depends_on), self.node_map.get(task))
        {
            if self.graph.find_edge(dep_idx, task_idx).is_none() {
                self.graph.add_edge(dep_idx, task_idx, ());
            }
        }
    }

    /// Adds a dependency edge: `task` depends on `depends_on`
    ///
    /// The edge direction is: depends_on -> task
    /// This means "depends_on must end before task starts".
    ///
    /// Returns false if the edge was already present. The graph is left
    /// untouched on any error.
    pub fn add_dependency(&mut self, task: &TaskId, depends_on: &TaskId) -> Result<bool, GraphError> {
        if task == depends_on {
            return Err(GraphError::SelfDependency(task.clone()));
        }

        let task_idx = *self
            .node_map
            .get(task)
            .ok_or_else(|| GraphError::TaskNotFound(task.clone()))?;

        let dep_idx = *self
            .node_map
            .get(depends_on)
            .ok_or_else(|| GraphError::TaskNotFound(depends_on.clone()))?;

        if self.graph.find_edge(dep_idx, task_idx).is_some() {
            return Ok(false);
        }

        // Validate against the hypothetical edge before committing anything
        if self.cycle_from(task_idx, Some((task_idx, dep_idx))) {
            return Err(GraphError::CycleDetected(task.clone(), depends_on.clone()));
        }

        self.graph.add_edge(dep_idx, task_idx, ());
        Ok(true)
    }

    /// Removes a dependency edge
    pub fn remove_dependency(&mut self, task: &TaskId, depends_on: &TaskId) -> bool {
        let task_idx = match self.node_map.get(task) {
            Some(idx) => *idx,
            None => return false,
        };

        let dep_idx = match self.node_map.get(depends_on) {
            Some(idx) => *idx,
            None => return false,
        };

        if let Some(edge) = self.graph.find_edge(dep_idx, task_idx) {
            self.graph.remove_edge(edge);
            true
        } else {
            false
        }
    }

    /// Returns true if adding `task` -> `depends_on` would close a cycle
    ///
    /// Pure check: the graph is never modified.
    pub fn would_create_cycle(
        &self,
        task: &TaskId,
        depends_on: &TaskId,
    ) -> Result<bool, GraphError> {
        if task == depends_on {
            return Err(GraphError::SelfDependency(task.clone()));
        }

        let task_idx = *self
            .node_map
            .get(task)
            .ok_or_else(|| GraphError::TaskNotFound(task.clone()))?;

        let dep_idx = *self
            .node_map
            .get(depends_on)
            .ok_or_else(|| GraphError::TaskNotFound(depends_on.clone()))?;

        Ok(self.cycle_from(task_idx, Some((task_idx, dep_idx))))
    }

    /// Returns true if a cycle is reachable from the given task
    pub fn detect_cycle(&self, task_id: &TaskId) -> bool {
        let idx = match self.node_map.get(task_id) {
            Some(idx) => *idx,
            None => return false,
        };

        self.cycle_from(idx, None)
    }

    /// DFS over dependency edges with an optional hypothetical extra edge
    ///
    /// `overlay` is `(node, extra_dep)`: while walking, `node` is treated as
    /// if it also depended on `extra_dep`. Nodes currently on the visit
    /// stack are gray; re-entering a gray node means a cycle.
    fn cycle_from(&self, start: NodeIndex, overlay: Option<(NodeIndex, NodeIndex)>) -> bool {
        let mut visiting = HashSet::new();
        let mut visited = HashSet::new();
        self.visit(start, overlay, &mut visiting, &mut visited)
    }

    fn visit(
        &self,
        node: NodeIndex,
        overlay: Option<(NodeIndex, NodeIndex)>,
        visiting: &mut HashSet<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        if visiting.contains(&node) {
            return true;
        }
        if visited.contains(&node) {
            return false;
        }

        visiting.insert(node);

        let mut found = self
            .graph
            .neighbors_directed(node, petgraph::Direction::Incoming)
            .any(|dep| self.visit(dep, overlay, visiting, visited));

        if !found {
            if let Some((from, extra_dep)) = overlay {
                if node == from {
                    found = self.visit(extra_dep, overlay, visiting, visited);
                }
            }
        }

        visiting.remove(&node);
        visited.insert(node);
        found
    }

    /// Returns the direct dependencies of a task
    pub fn dependencies(&self, task_id: &TaskId) -> Vec<TaskId> {
        let task_idx = match self.node_map.get(task_id) {
            Some(idx) => *idx,
            None => return vec![],
        };

        self.graph
            .neighbors_directed(task_idx, petgraph::Direction::Incoming)
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect()
    }

    /// Returns the direct dependents of a task (tasks that depend on it)
    pub fn dependents(&self, task_id: &TaskId) -> Vec<TaskId> {
        let task_idx = match self.node_map.get(task_id) {
            Some(idx) => *idx,
            None => return vec![],
        };

        self.graph
            .neighbors_directed(task_idx, petgraph::Direction::Outgoing)
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect()
    }

    /// Returns true if the graph contains the task
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.node_map.contains_key(task_id)
    }

    /// Returns the number of tasks in the graph
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Returns all task IDs in the graph
    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.node_map.keys()
    }
}
