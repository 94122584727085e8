//! Domain models for Taskflow CLI
//!
//! Contains the core business logic without any I/O concerns.

mod graph;
mod id;
mod project;
mod task;
mod user;

pub use graph::{DependencyGraph, GraphError};
pub use id::{IdError, ProjectId, TaskId};
pub use project::Project;
pub use task::{Comment, Constraints, Dependencies, Priority, Task, TaskKind, TaskStatus};
pub use user::{Permission, Role};
