//! # Initialization
//!
//! Wires a [`DeskContext`] from the data directory:
//!
//! ```text
//! <data>/
//!   desk.toml      # optional configuration (see config.rs)
//!   desk.json      # the tree store document
//!   session.json   # signed-in user, absent when signed out
//! ```
//!
//! ## Data Directory
//!
//! - `DESK_DATA`, when set, is the data directory. Tests use it to isolate state.
//! - Otherwise the OS-appropriate data directory from the `directories` crate.
//!
//! The store file can be pointed elsewhere with `store_override`. Configuration
//! and session still come from the data directory.
//!
//! ## Session
//!
//! Identity is in-memory per process. The session file carries the signed-in user
//! from one invocation to the next. Without one, the configured `user` acts as the
//! signed-in user.

use crate::api::DeskApi;
use crate::config::DeskConfig;
use crate::error::{DeskError, Result};
use crate::identity::{IdentityProvider, LocalIdentity, User};
use crate::store::fs::FileTreeStore;
use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_ENV: &str = "DESK_DATA";
pub const CONFIG_FILE: &str = "desk.toml";
pub const STORE_FILE: &str = "desk.json";
pub const SESSION_FILE: &str = "session.json";

pub struct DeskContext {
    pub api: DeskApi<FileTreeStore, LocalIdentity>,
    pub config: DeskConfig,
    pub data_dir: PathBuf,
}

impl DeskContext {
    /// Writes the current session so the next invocation sees it.
    pub fn persist_session(&self) -> Result<()> {
        save_session(&self.data_dir, self.api.identity().current_user().as_ref())
    }
}

pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_ENV) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "desk", "desk")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| DeskError::Store("Could not determine data directory".to_string()))
}

/// Reads `desk.toml` from the data directory. `DESK_*` variables are not config
/// overrides: they name the data directory and the log filter.
pub fn load_config(data_dir: &Path) -> DeskConfig {
    Clapfig::builder()
        .app_name("desk")
        .file_name(CONFIG_FILE)
        .search_paths(vec![SearchPath::Path(data_dir.to_path_buf())])
        .search_mode(SearchMode::Merge)
        .no_env()
        .load()
        .unwrap_or_default()
}

pub fn load_session(data_dir: &Path) -> Result<Option<User>> {
    let path = data_dir.join(SESSION_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

pub fn save_session(data_dir: &Path, user: Option<&User>) -> Result<()> {
    let path = data_dir.join(SESSION_FILE);
    match user {
        Some(user) => {
            fs::create_dir_all(data_dir)?;
            fs::write(&path, serde_json::to_string_pretty(user)?)?;
        }
        None if path.exists() => fs::remove_file(&path)?,
        None => {}
    }
    Ok(())
}

/// The user a configured name stands for when no session is stored.
fn configured_user(config: &DeskConfig) -> Option<User> {
    config.user().map(|name| User {
        display_name: name.to_string(),
        email: None,
        uid: format!("local:{}", name),
    })
}

pub fn initialize(store_override: Option<PathBuf>) -> Result<DeskContext> {
    let data_dir = data_dir()?;
    initialize_in(data_dir, store_override)
}

/// [`initialize`] against an explicit data directory.
pub fn initialize_in(data_dir: PathBuf, store_override: Option<PathBuf>) -> Result<DeskContext> {
    let config = load_config(&data_dir);
    let store_path = store_override.unwrap_or_else(|| data_dir.join(STORE_FILE));
    let store = FileTreeStore::open(store_path)?;

    let session = load_session(&data_dir)?.or_else(|| configured_user(&config));
    let identity = LocalIdentity::with_user(session);
    tracing::debug!(data_dir = %data_dir.display(), "initialized desk");

    Ok(DeskContext {
        api: DeskApi::new(store, identity),
        config,
        data_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn initializes_empty_workspace() {
        let dir = TempDir::new().unwrap();
        let ctx = initialize_in(dir.path().to_path_buf(), None).unwrap();
        assert_eq!(ctx.config, DeskConfig::default());
        assert!(ctx.api.list().unwrap().listed_nodes.is_empty());
        assert_eq!(ctx.api.actor(), "Anonymous");
    }

    #[test]
    fn config_file_is_read_from_data_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "user = \"Ada\"\nlog_page_size = 5\n",
        )
        .unwrap();
        let ctx = initialize_in(dir.path().to_path_buf(), None).unwrap();
        assert_eq!(ctx.config.page_size(), 5);
        assert_eq!(ctx.api.actor(), "Ada");
    }

    #[test]
    fn session_round_trips_and_clears() {
        let dir = TempDir::new().unwrap();
        let mut ctx = initialize_in(dir.path().to_path_buf(), None).unwrap();
        ctx.api.sign_in("Bob", None).unwrap();
        ctx.persist_session().unwrap();

        let mut ctx = initialize_in(dir.path().to_path_buf(), None).unwrap();
        assert_eq!(ctx.api.actor(), "Bob");
        ctx.api.sign_out().unwrap();
        ctx.persist_session().unwrap();
        assert!(!dir.path().join(SESSION_FILE).exists());
    }

    #[test]
    fn store_override_points_elsewhere() {
        let dir = TempDir::new().unwrap();
        let other = dir.path().join("elsewhere.json");
        let mut ctx = initialize_in(dir.path().to_path_buf(), Some(other.clone())).unwrap();
        ctx.api.create_folder("Docs").unwrap();
        assert!(other.exists());
        assert!(!dir.path().join(STORE_FILE).exists());
    }
}
