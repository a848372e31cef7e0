//! # Command Layer
//!
//! The mutating operations of desk. Each command lives in its own submodule as a
//! plain `run` function over a [`TreeStore`](crate::store::TreeStore), and returns
//! a [`CmdResult`]:
//!
//! - `affected_nodes`: nodes the command changed, as they are afterwards
//! - `listed_nodes`: nodes to display
//! - `messages`: leveled messages for the client to render
//!
//! Every successful mutation appends one activity log entry, attributed to the
//! `actor` the caller passes in.
//!
//! Commands do no I/O beyond the store and know nothing about terminals. Password
//! challenges happen here, before any write.
//!
//! ## Command Modules
//!
//! - [`create`]: new folders and files
//! - [`list`]: children of a folder
//! - [`rename`]: rename a node
//! - [`delete`]: delete a node with its subtree and notes
//! - [`move_node`]: move a node to another folder
//! - [`locking`]: lock and unlock folders
//! - [`note`]: save note content

use crate::model::Node;
use serde::Serialize;

pub mod create;
pub mod delete;
pub mod list;
pub mod locking;
pub mod move_node;
pub mod note;
pub mod rename;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct CmdResult {
    pub affected_nodes: Vec<Node>,
    pub listed_nodes: Vec<Node>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.affected_nodes = nodes;
        self
    }

    pub fn with_listed_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.listed_nodes = nodes;
        self
    }
}
