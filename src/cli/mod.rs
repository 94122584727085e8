//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Workspace management | `init`, `stats` |
//! | Task | Work item lifecycle | `task add`, `task start`, `task done` |
//! | Project | Grouping and archive | `project new`, `project archive` |
//! | Schedule | Dependency-aware dates | `reschedule`, `task move`, `task dep` |
//! | Timeline | Zoomable date window | `timeline --zoom month` |
//! | Search | Fuzzy text search | `search "deploy"` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! taskflow --verbose reschedule t-9d3e5f2 2024-06-20
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod project_cmd;
mod schedule_cmd;
mod stats_cmd;
mod task_cmd;
mod timeline_cmd;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};

use anyhow::Result;
use chrono::NaiveDate;

use crate::domain::Permission;
use crate::storage::Config;

/// Parses a user-supplied `YYYY-MM-DD` date argument
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{}' (expected YYYY-MM-DD)", raw))
}

/// Fails unless the configured role holds the permission
pub(crate) fn require(config: &Config, permission: Permission) -> Result<()> {
    let role = config.workspace.user.role;
    if !role.can(permission) {
        anyhow::bail!(
            "Role '{}' may not {} (set [user] role in .taskflow/config.toml)",
            role,
            permission
        );
    }
    Ok(())
}
