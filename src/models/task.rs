//! Task record and its mutable subset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status given to tasks created without one.
pub const DEFAULT_STATUS: i32 = 1;

// == Task ==
/// The unit of storage.
///
/// `version` is authoritative only in the primary store; a cached copy is a
/// snapshot that may be stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub name: String,
    pub content: String,
    pub tag: Option<String>,
    pub status: i32,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Copies the caller-mutable fields from `draft`. Identity, version and
    /// timestamps are left alone.
    pub fn apply(&mut self, draft: &TaskDraft) {
        self.name = draft.name.clone();
        self.content = draft.content.clone();
        self.tag = draft.tag.clone();
        self.status = draft.status;
    }

    /// Tag as a string, empty when absent.
    pub fn tag_str(&self) -> &str {
        self.tag.as_deref().unwrap_or("")
    }
}

// == Task Draft ==
/// Validated caller input for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub content: String,
    pub tag: Option<String>,
    pub status: i32,
}

impl TaskDraft {
    /// Builds a draft, normalising an empty tag to `None`.
    pub fn new(
        name: impl Into<String>,
        content: impl Into<String>,
        tag: Option<String>,
        status: i32,
    ) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            tag: tag.filter(|t| !t.is_empty()),
            status,
        }
    }

    /// Uniqueness condition: name, plus tag when the draft carries one.
    pub fn condition(&self) -> TaskCondition {
        TaskCondition {
            name: self.name.clone(),
            tag: self.tag.clone(),
        }
    }
}

// == Task Condition ==
/// Lookup condition for `find_one` on the primary store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCondition {
    pub name: String,
    /// Only constrains the match when present
    pub tag: Option<String>,
}

impl TaskCondition {
    pub fn matches(&self, task: &Task) -> bool {
        task.name == self.name
            && match &self.tag {
                Some(tag) => task.tag.as_deref() == Some(tag.as_str()),
                None => true,
            }
    }
}
