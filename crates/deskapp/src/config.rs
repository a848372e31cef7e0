//! # Configuration
//!
//! Desk configuration is managed by [`clapfig`], which loads `desk.toml` from the
//! data directory and falls back to compiled defaults.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `user` | none | Name to act as when no session is stored |
//! | `log_page_size` | `10` | Entries per page for `desk logs` |
//! | `log_level` | `warn` | Tracing filter when `DESK_LOG` is not set |

use crate::activity::DEFAULT_PAGE_SIZE;
use confique::Config;
use serde::{Deserialize, Serialize};

/// Configuration for desk, stored in `desk.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeskConfig {
    /// Display name used for attribution when nobody has signed in.
    pub user: Option<String>,

    /// Activity log entries per page.
    #[config(default = 10)]
    pub log_page_size: usize,

    /// Tracing filter directive, e.g. "warn" or "deskapp=debug".
    #[config(default = "warn")]
    pub log_level: String,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            user: None,
            log_page_size: DEFAULT_PAGE_SIZE,
            log_level: "warn".to_string(),
        }
    }
}

impl DeskConfig {
    /// Page size, never zero.
    pub fn page_size(&self) -> usize {
        self.log_page_size.max(1)
    }

    /// Configured user name, ignoring blanks.
    pub fn user(&self) -> Option<&str> {
        self.user
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}
