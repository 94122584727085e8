//! # Query Layer
//!
//! Pure filtering, sorting, and text search over the task list. Nothing
//! here touches storage; the CLI loads tasks once and runs queries over
//! the in-memory slice.
//!
//! ## Key Types
//!
//! - [`TaskQuery`] - AND-composed filter criteria
//! - [`DueWindow`] - Relative due-date ranges (`overdue`, `this-week`, ...)
//! - [`SortKey`] / [`SortOrder`] - Stable sort selection

mod filter;
mod search;

pub use filter::{apply, sort_tasks, DueWindow, SortKey, SortOrder, TaskQuery};
pub use search::{matches, score};
