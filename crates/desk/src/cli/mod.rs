//! # CLI Behavior
//!
//! This is **one possible UI client** for desk, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes, and output formatting.
//!
//! For the overall architecture, see the crate-level documentation in [`crate`].
//!
//! ## Paths
//!
//! Paths are display paths. `/Root/Docs/a.txt`, `root/Docs/a.txt` and
//! `Docs/a.txt` all name the same file, since each invocation starts at the root.
//!
//! ### Locked Folders
//!
//! `--password` answers every password challenge on the way: locked folders the
//! path passes through, and the target itself for `rename`, `rm` and `mv`.
//!
//! ### Naked Execution (`desk`)
//!
//! Running `desk` with no arguments lists the root folder.
//!
//! ### Sessions
//!
//! `desk login` stores the signed-in user in the data directory so later
//! invocations are attributed to them. `--user` acts as someone for a single
//! invocation without touching the stored session.
//!
//! ## Module Structure
//!
//! - `commands`: context setup and per-command handlers that call the API
//! - `render`: output formatting (listings, logs, messages, JSON)
//! - `setup`: argument parsing via clap

mod commands;
mod render;
pub mod setup;

pub use commands::run;
