//! Serializable back stack for OS state restoration
//!
//! Entries are stored as paths rather than typed routes so a snapshot taken by
//! one build can still be read after routes gain fields. Entries whose path no
//! longer resolves are dropped on restore.

use serde::{Deserialize, Serialize};

use super::error::Result;
use super::route::RouteKind;
use super::stack::{EntryId, SavedViewState};

/// One back-stack entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySnapshot {
    /// Entry key, kept across restore
    pub id: EntryId,
    /// Canonical path of the route
    pub path: String,
    /// Opaque view state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_state: Option<SavedViewState>,
}

/// A saved stack kept for `restore_state`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedStackSnapshot {
    /// Destination the stack is keyed by
    pub kind: RouteKind,
    /// Entries, bottom to top
    pub entries: Vec<EntrySnapshot>,
}

/// The whole navigation state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSnapshot {
    /// Back stack, bottom to top
    pub entries: Vec<EntrySnapshot>,
    /// Saved stacks, ordered by kind
    #[serde(default)]
    pub saved_stacks: Vec<SavedStackSnapshot>,
}

impl NavigationSnapshot {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Paths of the back stack, bottom to top
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.path.as_str()).collect()
    }
}
