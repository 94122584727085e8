//! Workspace management
//!
//! Handles workspace initialization and provides access to stores.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, ProjectStore, TaskStore};

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not in a taskflow workspace. Run 'taskflow init' first.")]
    NotInWorkspace,
}

/// A Taskflow workspace
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens an existing workspace at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let taskflow_dir = root.join(".taskflow");

        if !taskflow_dir.is_dir() {
            return Err(WorkspaceError::NotInWorkspace.into());
        }

        let config = Config::for_workspace(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the workspace at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_workspace_root().ok_or(WorkspaceError::NotInWorkspace)?;

        Self::open(root)
    }

    /// Initializes a new workspace at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let taskflow_dir = root.join(".taskflow");

        fs::create_dir_all(&taskflow_dir).with_context(|| {
            format!(
                "Failed to create .taskflow directory: {}",
                taskflow_dir.display()
            )
        })?;

        // Create default config
        let config_path = taskflow_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# Taskflow CLI configuration

# Zoom level the timeline opens at: day, week, month
default_zoom = "week"

# How many dependency levels a reschedule may ripple through
cascade_depth = 10

[user]
# name = "you"
# Role gates destructive operations: admin, manager, member, viewer
role = "admin"
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Self::open(root)
    }

    /// Returns the workspace root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .taskflow directory path
    pub fn taskflow_dir(&self) -> PathBuf {
        self.root.join(".taskflow")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Returns the task store
    pub fn task_store(&self) -> TaskStore {
        TaskStore::for_workspace(&self.root)
    }

    /// Returns the project store
    pub fn project_store(&self) -> ProjectStore {
        ProjectStore::for_workspace(&self.root)
    }
}
