//! User roles and permissions
//!
//! Permissions are derived from the role alone; there are no per-user
//! grants. The CLI reads the active role from workspace configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of the active user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Admin,
    Manager,
    Member,
    Viewer,
}

/// A single capability a role may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Create,
    Read,
    Update,
    Delete,
    Assign,
    ManageUsers,
}

impl Role {
    /// Returns the permission set for this role
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Admin => &[
                Permission::Create,
                Permission::Read,
                Permission::Update,
                Permission::Delete,
                Permission::Assign,
                Permission::ManageUsers,
            ],
            Role::Manager => &[
                Permission::Create,
                Permission::Read,
                Permission::Update,
                Permission::Assign,
            ],
            Role::Member => &[Permission::Read, Permission::Update],
            Role::Viewer => &[Permission::Read],
        }
    }

    /// Returns true if this role holds the given permission
    pub fn can(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Member => "member",
            Role::Viewer => "viewer",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "member" => Ok(Role::Member),
            "viewer" => Ok(Role::Viewer),
            _ => Err(format!(
                "Unknown role: {} (expected: admin, manager, member, viewer)",
                s
            )),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Permission::Create => "create",
            Permission::Read => "read",
            Permission::Update => "update",
            Permission::Delete => "delete",
            Permission::Assign => "assign",
            Permission::ManageUsers => "manage_users",
        };
        write!(f, "{}", label)
    }
}
