//! # Desk Architecture
//!
//! Desk is a **UI-agnostic workspace library**: a folder/file tree with
//! password-lockable folders, notes attached to files, a one-line command terminal,
//! and an activity log. Everything is kept in one hierarchical key-path store.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client (the `desk` binary, or any other UI)                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Session: current folder, signed-in user                  │
//! │  - Resolves names to node paths, dispatches                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands (commands/*.rs) and Terminal (terminal.rs)        │
//! │  - Mutations with password challenges and activity entries  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Components                                                 │
//! │  tree.rs, lock.rs, moving.rs, navigation.rs, notes.rs,      │
//! │  activity.rs, path.rs                                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - TreeStore trait                                          │
//! │  - FileTreeStore (production), MemTreeStore (testing)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout or stderr and never exits the
//! process. Diagnostics go through `tracing`, and the client decides where they end
//! up.
//!
//! ## Single-Threaded
//!
//! Stores and identity use interior mutability behind `&self` and are not `Sync`.
//! Subscriptions are callbacks invoked synchronously after each write.
//!
//! ## Testing Strategy
//!
//! 1. **Components and commands**: unit tests against `MemTreeStore`.
//! 2. **API**: dispatch and session behavior.
//! 3. **Integration** (`tests/`): end-to-end workspace flows against the file store.

pub mod activity;
pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod identity;
pub mod init;
pub mod lock;
pub mod model;
pub mod moving;
pub mod navigation;
pub mod notes;
pub mod path;
pub mod store;
pub mod terminal;
pub mod tree;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
