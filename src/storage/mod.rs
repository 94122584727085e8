//! # Storage Layer
//!
//! Persistence layer for Taskflow with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line) | `.taskflow/tasks.jsonl` |
//! | Projects | JSONL | `.taskflow/projects.jsonl` |
//! | Config | TOML | `.taskflow/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`TaskStore`] and [`ProjectStore`] use file locking (`fs2`) for
//!   concurrent access
//! - All writes are atomic (temp file + rename)
//!
//! ## Workspace Structure
//!
//! ```text
//! .taskflow/
//! ├── tasks.jsonl           # All tasks in JSONL format
//! ├── projects.jsonl        # Project records
//! └── config.toml           # Workspace configuration
//! ```
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point for accessing a Taskflow workspace
//! - [`TaskStore`] - Read/write tasks as JSONL
//! - [`TaskRepository`] - Storage contract the scheduling layer works against
//! - [`Config`] - Workspace and global configuration

mod config;
mod jsonl;
mod repo;
mod workspace;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, UserConfig, WorkspaceConfig};
pub use jsonl::{ProjectStore, TaskStore};
pub use repo::{MemoryStore, StoreError, TaskPatch, TaskRepository};
pub use workspace::{Workspace, WorkspaceError};
