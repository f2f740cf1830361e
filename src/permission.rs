//! Per-origin plugin permissions.
//!
//! The host keeps a permission manager that the user updates by acting on
//! the click-to-play notification. [`PermissionStore`] isolates that
//! collaborator so the activation logic can be exercised without a host.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stored user decision for an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Plugins from the origin may run.
    Allowed,
    /// Plugins from the origin stay blocked without prompting again.
    Blocked,
}

impl Permission {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allowed" | "allow" => Ok(Self::Allowed),
            "blocked" | "block" => Ok(Self::Blocked),
            other => Err(format!("unknown permission: {other}")),
        }
    }
}

/// Storage for per-origin plugin permissions.
pub trait PermissionStore {
    /// Look up the entry for `origin`, if any.
    fn get(&self, origin: &str) -> Option<Permission>;

    /// Record a decision for `origin`, replacing any previous entry.
    fn set(&mut self, origin: &str, permission: Permission);

    /// Remove every entry, returning the origins that had one.
    fn clear(&mut self) -> Vec<String>;
}

/// Process-local permission store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPermissions {
    entries: HashMap<String, Permission>,
}

impl InMemoryPermissions {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PermissionStore for InMemoryPermissions {
    fn get(&self, origin: &str) -> Option<Permission> {
        self.entries.get(origin).copied()
    }

    fn set(&mut self, origin: &str, permission: Permission) {
        self.entries.insert(origin.to_owned(), permission);
    }

    fn clear(&mut self) -> Vec<String> {
        self.entries.drain().map(|(origin, _)| origin).collect()
    }
}
