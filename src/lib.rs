//! Taskflow CLI - A local-first task scheduler with dependency-aware timelines
//!
//! Taskflow organizes work as tasks with day-granular schedules and
//! dependencies between them. Moving one task's dates ripples through its
//! dependents, bounded by per-task constraints, and the result renders on
//! a zoomable day/week/month timeline.

pub mod cli;
pub mod domain;
pub mod query;
pub mod schedule;
pub mod storage;

pub use domain::{DependencyGraph, Priority, Project, ProjectId, Task, TaskId, TaskStatus};
pub use schedule::{Cascader, TimelineLayout, ZoomLevel};
