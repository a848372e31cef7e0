//! # Domain Model
//!
//! The store holds untyped JSON. This module defines the typed records the rest of
//! the crate works with, and the boundary where JSON becomes one of them:
//!
//! - [`Node`]: a folder or file in the tree, validated from a [`StoredNode`] record.
//! - [`LogEntry`]: one activity log line.
//! - [`Note`]: the content attached to a file node.
//!
//! ## Stored Node Shape
//!
//! ```text
//! folders/<id> = {
//!   "name": "Docs",
//!   "type": "folder" | "file",
//!   "locked": true,          # folders only, omitted when false
//!   "password": "...",       # only while locked
//!   "children": { <id>: {...}, ... }   # folders only, omitted when empty
//! }
//! ```
//!
//! ## Quarantine
//!
//! Records that do not fit this shape are never trusted. Examples are a missing
//! name, an unknown type, or a file that has children. [`Node::from_record`]
//! rejects them with a reason, and listings skip them with a warning.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Folder => write!(f, "folder"),
            NodeKind::File => write!(f, "file"),
        }
    }
}

/// Wire shape of a tree record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Map<String, Value>>,
}

impl StoredNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            locked: false,
            password: None,
            children: None,
        }
    }
}

/// A validated folder or file.
///
/// Only the immediate record is carried. Children are listed through the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub locked: bool,
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl Node {
    /// Validates a raw record found under `id`.
    pub fn from_record(id: &str, value: &Value) -> std::result::Result<Node, String> {
        let stored: StoredNode = serde_json::from_value(value.clone())
            .map_err(|e| format!("record {} is not a node: {}", id, e))?;

        if stored.name.trim().is_empty() {
            return Err(format!("record {} has an empty name", id));
        }

        let has_children = stored.children.as_ref().is_some_and(|c| !c.is_empty());
        if stored.kind == NodeKind::File && has_children {
            return Err(format!("file record {} has children", id));
        }

        // Files never lock. An empty password is the same as none.
        let locked = stored.kind == NodeKind::Folder && stored.locked;
        let password = if locked {
            stored.password.filter(|p| !p.is_empty())
        } else {
            None
        };

        Ok(Node {
            id: id.to_string(),
            name: stored.name,
            kind: stored.kind,
            locked,
            password,
        })
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }
}

/// One immutable line of the activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(skip)]
    pub id: String,
    pub user: String,
    pub action: String,
    #[serde(default)]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl LogEntry {
    pub fn from_record(id: &str, value: &Value) -> std::result::Result<LogEntry, String> {
        let mut entry: LogEntry = serde_json::from_value(value.clone())
            .map_err(|e| format!("log record {} is malformed: {}", id, e))?;
        entry.id = id.to_string();
        Ok(entry)
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Content attached to a file node, keyed by the file's id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl Note {
    pub fn last_edited_at(&self) -> Option<DateTime<Utc>> {
        self.last_edited
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn folder_record_round_trips_through_node() {
        let node = Node::from_record(
            "f1",
            &json!({"name": "Docs", "type": "folder", "locked": true, "password": "p1"}),
        )
        .unwrap();
        assert_eq!(node.id, "f1");
        assert!(node.is_folder());
        assert!(node.locked);
        assert_eq!(node.password.as_deref(), Some("p1"));
    }

    #[test]
    fn stored_node_omits_defaults() {
        let value = serde_json::to_value(StoredNode::new("a.txt", NodeKind::File)).unwrap();
        assert_eq!(value, json!({"name": "a.txt", "type": "file"}));
    }

    #[test]
    fn quarantines_malformed_records() {
        assert!(Node::from_record("x", &json!({"type": "folder"})).is_err());
        assert!(Node::from_record("x", &json!({"name": "A", "type": "link"})).is_err());
        assert!(Node::from_record("x", &json!({"name": " ", "type": "file"})).is_err());
        assert!(Node::from_record("x", &json!("just a string")).is_err());
        assert!(Node::from_record(
            "x",
            &json!({"name": "a", "type": "file", "children": {"c": {"name": "c", "type": "file"}}})
        )
        .is_err());
    }

    #[test]
    fn files_never_carry_lock_state() {
        let node = Node::from_record(
            "x",
            &json!({"name": "a", "type": "file", "locked": true, "password": "p"}),
        )
        .unwrap();
        assert!(!node.locked);
        assert_eq!(node.password, None);
    }

    #[test]
    fn empty_password_counts_as_none() {
        let node = Node::from_record(
            "x",
            &json!({"name": "A", "type": "folder", "locked": true, "password": ""}),
        )
        .unwrap();
        assert!(node.locked);
        assert_eq!(node.password, None);
    }

    #[test]
    fn note_uses_camel_case_fields() {
        let note: Note = serde_json::from_value(
            json!({"content": "<b>hi</b>", "lastEdited": 1_700_000_000_000i64, "fileName": "a"}),
        )
        .unwrap();
        assert_eq!(note.file_name.as_deref(), Some("a"));
        assert!(note.last_edited_at().is_some());
    }

    #[test]
    fn log_entry_takes_id_from_key() {
        let entry = LogEntry::from_record(
            "k1",
            &json!({
                "user": "Anonymous",
                "action": "Rename",
                "target": "B",
                "extra": null,
                "timestamp": 5
            }),
        )
        .unwrap();
        assert_eq!(entry.id, "k1");
        assert_eq!(entry.extra, None);
    }
}
