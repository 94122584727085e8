//! JSONL storage for tasks and projects
//!
//! Tasks live in `.taskflow/tasks.jsonl`, projects in
//! `.taskflow/projects.jsonl`, one JSON object per line. File order is
//! creation order and is preserved across rewrites; stable sorts and
//! tie-breaks depend on it. Uses file locking for concurrent access
//! safety.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::repo::{check_delete_allowed, validate_dates, StoreError, TaskPatch, TaskRepository};
use crate::domain::{Project, ProjectId, Task, TaskId};

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads newline-delimited JSON records under a shared lock
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path).map_err(|e| io_err(path, e))?;

    // Shared lock for reading; released when the file is dropped
    file.lock_shared().map_err(|e| io_err(path, e))?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| io_err(path, e))?;

        if line.trim().is_empty() {
            continue;
        }

        let record: T = serde_json::from_str(&line).map_err(|source| StoreError::Parse {
            line: line_num + 1,
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Rewrites the whole file via a temp file and atomic rename
fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let temp_path = path.with_extension("jsonl.tmp");

    {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| io_err(&temp_path, e))?;

        file.lock_exclusive().map_err(|e| io_err(&temp_path, e))?;

        let mut writer = BufWriter::new(&file);
        for record in records {
            let line = serde_json::to_string(record)?;
            writeln!(writer, "{}", line).map_err(|e| io_err(&temp_path, e))?;
        }

        writer.flush().map_err(|e| io_err(&temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

/// Appends a single record without rewriting the file
fn append_record<T: Serialize>(path: &Path, record: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_err(path, e))?;

    file.lock_exclusive().map_err(|e| io_err(path, e))?;

    let mut writer = BufWriter::new(&file);
    let line = serde_json::to_string(record)?;
    writeln!(writer, "{}", line).map_err(|e| io_err(path, e))?;

    writer.flush().map_err(|e| io_err(path, e))?;
    Ok(())
}

/// Store for task data in JSONL format
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    /// Creates a new task store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a workspace
    pub fn for_workspace(workspace_root: &Path) -> Self {
        Self::new(workspace_root.join(".taskflow").join("tasks.jsonl"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all tasks in file order, keeping the last record per ID
    fn read_all(&self) -> Result<Vec<Task>, StoreError> {
        let records: Vec<Task> = read_records(&self.path)?;

        // A crash between append and rewrite can leave a duplicate line;
        // the later record wins but keeps the original position.
        let mut tasks: Vec<Task> = Vec::with_capacity(records.len());
        let mut positions: HashMap<TaskId, usize> = HashMap::new();

        for task in records {
            match positions.get(&task.id) {
                Some(&pos) => tasks[pos] = task,
                None => {
                    positions.insert(task.id.clone(), tasks.len());
                    tasks.push(task);
                }
            }
        }

        Ok(tasks)
    }
}

impl TaskRepository for TaskStore {
    fn all(&self) -> Result<Vec<Task>, StoreError> {
        self.read_all()
    }

    fn get(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.read_all()?.into_iter().find(|t| &t.id == id))
    }

    fn create(&mut self, task: Task) -> Result<Task, StoreError> {
        validate_dates(&task)?;
        append_record(&self.path, &task)?;
        Ok(task)
    }

    fn update(&mut self, id: &TaskId, patch: TaskPatch) -> Result<Task, StoreError> {
        let mut tasks = self.read_all()?;

        let pos = tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| StoreError::TaskNotFound(id.clone()))?;

        let mut updated = tasks[pos].clone();
        patch.apply_to(&mut updated, Utc::now());
        validate_dates(&updated)?;

        tasks[pos] = updated.clone();
        write_records(&self.path, &tasks)?;
        Ok(updated)
    }

    fn delete(&mut self, id: &TaskId) -> Result<bool, StoreError> {
        let mut tasks = self.read_all()?;

        let target = match tasks.iter().find(|t| &t.id == id) {
            Some(t) => t.clone(),
            None => return Ok(false),
        };

        check_delete_allowed(&tasks, &target)?;

        tasks.retain(|t| &t.id != id);
        write_records(&self.path, &tasks)?;
        Ok(true)
    }
}

/// Store for project data in JSONL format
pub struct ProjectStore {
    path: PathBuf,
}

impl ProjectStore {
    /// Creates a new project store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a workspace
    pub fn for_workspace(workspace_root: &Path) -> Self {
        Self::new(workspace_root.join(".taskflow").join("projects.jsonl"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all projects in creation order
    pub fn all(&self) -> Result<Vec<Project>, StoreError> {
        read_records(&self.path)
    }

    /// Returns a single project by ID
    pub fn get(&self, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.all()?.into_iter().find(|p| &p.id == id))
    }

    /// Persists a new project
    pub fn create(&self, project: Project) -> Result<Project, StoreError> {
        append_record(&self.path, &project)?;
        Ok(project)
    }

    /// Writes back a modified project, or appends it if unknown
    pub fn save(&self, project: &Project) -> Result<(), StoreError> {
        let mut projects = self.all()?;

        match projects.iter().position(|p| p.id == project.id) {
            Some(pos) => {
                projects[pos] = project.clone();
                write_records(&self.path, &projects)
            }
            None => {
                append_record(&self.path, project)?;
                Ok(())
            }
        }
    }
}
