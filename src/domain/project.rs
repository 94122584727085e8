//! Project domain model
//!
//! Projects group related tasks. Archiving a project hides it from the
//! default listings without touching its tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ProjectId;

/// A project grouping tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,

    /// Human-readable name
    pub name: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Display color as a hex string (e.g., "#4f46e5")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Archived projects are hidden from default listings
    #[serde(default, skip_serializing_if = "is_false")]
    pub archived: bool,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl Project {
    /// Creates a new active project
    pub fn new(id: ProjectId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            color: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Hides the project from default listings
    pub fn archive(&mut self, now: DateTime<Utc>) {
        if !self.archived {
            self.archived = true;
            self.updated_at = now;
        }
    }

    /// Brings an archived project back
    pub fn restore(&mut self, now: DateTime<Utc>) {
        if self.archived {
            self.archived = false;
            self.updated_at = now;
        }
    }
}
