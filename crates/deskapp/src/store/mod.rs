//! # Storage Layer
//!
//! Everything desk keeps lives in one hierarchical key-value document, addressed by
//! slash-joined keys. The [`TreeStore`] trait is the whole contract the rest of the
//! crate relies on:
//!
//! - `read`: one-shot point read
//! - `subscribe` / `unsubscribe`: subscribed read that is pushed on every change
//! - `write`: replace the value at a key (a null value deletes)
//! - `update`: merge fields into the value at a key (null fields are removed)
//! - `delete`: remove a key and everything beneath it
//! - `push_key`: allocate a fresh child key under a parent
//!
//! ## Containers
//!
//! ```text
//! folders/<id>/children/<id>/...   # the folder/file tree
//! notes/<file-id>                  # note content of a file node
//! files/<file-id>                  # file-name index used by Find
//! logs/<entry-id>                  # activity log
//! ```
//!
//! ## Semantics Shared By All Stores
//!
//! - Null and empty objects are never stored. Writing one deletes the key, and a
//!   container left empty by a delete disappears with it.
//! - Object keys keep insertion order, so children list in creation order.
//! - A subscription fires once when registered and then after every mutation that
//!   touches its key, an ancestor, or a descendant. Listeners run after the store
//!   has released its internal borrows, so they may read from the store.
//! - There are no transactions. Multi-step operations are independent calls.
//!
//! ## Implementations
//!
//! - [`memory::MemTreeStore`]: in-memory, for tests and embedding.
//! - [`fs::FileTreeStore`]: the same document persisted to a JSON file after each
//!   mutation.

use crate::error::Result;
use serde_json::{Map, Value};

pub mod document;
pub mod fs;
pub mod memory;

/// Container for the folder/file tree.
pub const FOLDERS: &str = "folders";
/// Container for note content, keyed by file id.
pub const NOTES: &str = "notes";
/// Container indexing file names by file id.
pub const FILES: &str = "files";
/// Container for activity log entries.
pub const LOGS: &str = "logs";

/// Callback invoked with the current value at a subscribed key.
pub type Listener = Box<dyn FnMut(Option<&Value>)>;

/// Identifies a live subscription so its owner can release it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(pub(crate) u64);

/// Abstract interface for the hierarchical key-path store.
///
/// All methods take `&self`: desk is single-threaded and implementations use
/// interior mutability.
pub trait TreeStore {
    /// Read the value at `path` once.
    fn read(&self, path: &str) -> Result<Option<Value>>;

    /// Register a listener for `path`. It is called immediately with the current
    /// value and again after every change affecting `path`.
    fn subscribe(&self, path: &str, listener: Listener) -> Result<SubscriptionHandle>;

    /// Release a subscription. Unknown handles are ignored.
    fn unsubscribe(&self, handle: SubscriptionHandle);

    /// Replace the value at `path`.
    fn write(&self, path: &str, value: Value) -> Result<()>;

    /// Merge `fields` into the object at `path`. Null fields are removed.
    fn update(&self, path: &str, fields: Map<String, Value>) -> Result<()>;

    /// Remove `path` and its subtree.
    fn delete(&self, path: &str) -> Result<()>;

    /// Allocate a key that is unique among the children of `parent_path`.
    fn push_key(&self, parent_path: &str) -> Result<String>;
}

/// Joins a parent key and a child key.
pub fn join_key(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}/{}", parent, child)
    }
}

/// Fresh key for a child record. Time-ordered, so later keys sort after earlier ones.
pub(crate) fn fresh_key() -> String {
    uuid::Uuid::now_v7().simple().to_string()
}
