//! # Activity Log
//!
//! Append-only audit trail under `logs/<id>`. Entries are written once and never
//! changed. Reading fetches the whole container and sorts client-side, newest
//! first, with ties broken by entry id.

use crate::error::Result;
use crate::model::LogEntry;
use crate::store::{join_key, TreeStore, LOGS};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Entries per page when the caller does not say otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateFolder,
    CreateFile,
    Rename,
    Delete,
    Move,
    Lock,
    Unlock,
    SaveNote,
    Login,
    Logout,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateFolder => "Create folder",
            Action::CreateFile => "Create file",
            Action::Rename => "Rename",
            Action::Delete => "Delete",
            Action::Move => "Move",
            Action::Lock => "Lock",
            Action::Unlock => "Unlock",
            Action::SaveNote => "Save note",
            Action::Login => "Login",
            Action::Logout => "Logout",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One window of the log, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogPage {
    pub entries: Vec<LogEntry>,
    /// Cursor for the next older page. Set only when this page came back full.
    pub next_before: Option<i64>,
}

pub struct ActivityLog<'a, S: TreeStore> {
    store: &'a S,
}

impl<'a, S: TreeStore> ActivityLog<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn record(
        &self,
        user: &str,
        action: Action,
        target: &str,
        extra: Option<Value>,
    ) -> Result<LogEntry> {
        self.record_at(user, action, target, extra, Utc::now().timestamp_millis())
    }

    pub fn record_at(
        &self,
        user: &str,
        action: Action,
        target: &str,
        extra: Option<Value>,
        timestamp: i64,
    ) -> Result<LogEntry> {
        let id = self.store.push_key(LOGS)?;
        let entry = LogEntry {
            id: id.clone(),
            user: user.to_string(),
            action: action.as_str().to_string(),
            target: target.to_string(),
            extra: extra.filter(|v| !v.is_null()),
            timestamp,
        };
        self.store
            .write(&join_key(LOGS, &id), serde_json::to_value(&entry)?)?;
        tracing::debug!(%id, action = %action, user, "recorded activity");
        Ok(entry)
    }

    pub fn recent(&self, limit: usize) -> Result<LogPage> {
        self.page(None, limit)
    }

    /// Entries strictly older than `timestamp`.
    pub fn before(&self, timestamp: i64, limit: usize) -> Result<LogPage> {
        self.page(Some(timestamp), limit)
    }

    fn page(&self, before: Option<i64>, limit: usize) -> Result<LogPage> {
        let mut entries = self.load()?;
        if let Some(cutoff) = before {
            entries.retain(|e| e.timestamp < cutoff);
        }
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        entries.truncate(limit);

        let next_before = if limit > 0 && entries.len() == limit {
            entries.last().map(|e| e.timestamp)
        } else {
            None
        };
        Ok(LogPage {
            entries,
            next_before,
        })
    }

    fn load(&self) -> Result<Vec<LogEntry>> {
        let Some(Value::Object(raw)) = self.store.read(LOGS)? else {
            return Ok(Vec::new());
        };
        Ok(raw
            .iter()
            .filter_map(|(id, value)| match LogEntry::from_record(id, value) {
                Ok(entry) => Some(entry),
                Err(reason) => {
                    tracing::warn!(%reason, "skipping log record");
                    None
                }
            })
            .collect())
    }
}
