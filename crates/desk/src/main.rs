//! # Desk CLI Architecture
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, and this file
//! only invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/deskapp/`: the library, with all workspace behavior
//! - `crates/desk/`: this CLI, one client of that library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/desk/src/cli/)                           │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring + dispatch (commands.rs)                  │
//! │  - Text and JSON rendering (render.rs)                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/deskapp/src/api.rs)                      │
//! │  - Holds the navigator, resolves names in the current folder│
//! │  - Dispatches to command modules                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (crates/deskapp/src/commands/*)              │
//! │  - Business rules, password challenges, activity log        │
//! │  - No knowledge of stdout/stderr or process exits           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every invocation starts at the root folder. Commands that take a path walk to
//! its parent first, then address the last segment by name.
//!
//! ## Testing Approach
//!
//! - **Library**: unit tests next to each component, flow tests in
//!   `crates/deskapp/tests/`.
//! - **CLI**: rendering helpers are unit tested; end-to-end behavior runs the
//!   real binary against a temporary `DESK_DATA` directory.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
