//! # Terminal
//!
//! A small fixed command language for operating on the workspace from one line of
//! text. Parsing is pure ([`parse`]). Execution ([`Terminal::execute`]) talks to
//! the store and returns what to show plus an optional action for the host.
//!
//! ## Grammar
//!
//! Input is split on whitespace and dispatched on the first token, which is case
//! sensitive:
//!
//! ```text
//! /help
//! /clear
//! FloatConsole:True | FloatConsole:False
//! Lock <Path> <Password...>
//! Unlock <Path> <Password...>
//! Find <FileName...>
//! ```
//!
//! Passwords and search keywords are the remaining tokens joined by single spaces.
//! Paths go through [`path::normalize`] and are resolved by folder name.
//!
//! ## Output
//!
//! The first log line always echoes the input as `> input`. The one exception is
//! `/clear`, whose empty log list tells the host to clear what it shows.
//!
//! `Lock` here writes the lock fields directly. It does not ask for an existing
//! password, unlike unlocking.

use crate::activity::{Action, ActivityLog};
use crate::error::Result;
use crate::model::Node;
use crate::notes::{self, FileMatch};
use crate::path;
use crate::store::TreeStore;
use crate::tree::{FolderEntry, FolderTree};
use serde::Serialize;
use serde_json::{json, Map, Value};

pub const LOCK_USAGE: &str = "Usage: Lock <Path> <Password>";
pub const UNLOCK_USAGE: &str = "Usage: Unlock <Path> <Password>";
pub const FIND_USAGE: &str = "Usage: Find <FileName>";

pub const HELP_LINES: [&str; 7] = [
    "Available commands:",
    "- /help",
    "- /clear",
    "- FloatConsole:True / FloatConsole:False",
    "- Lock <Path> <Password>",
    "- Unlock <Path> <Password>",
    "- Find <FileName>",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    FloatConsole(bool),
    Lock { path: String, password: String },
    Unlock { path: String, password: String },
    Find { keyword: String },
    /// A known command with missing arguments.
    Usage(&'static str),
    Unknown,
}

pub fn parse(line: &str) -> Command {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = tokens.split_first() else {
        return Command::Unknown;
    };

    match head {
        "/help" => Command::Help,
        "/clear" => Command::Clear,
        "FloatConsole:True" => Command::FloatConsole(true),
        "FloatConsole:False" => Command::FloatConsole(false),
        "Lock" | "Unlock" => {
            let [target, password @ ..] = args else {
                return Command::Usage(if head == "Lock" { LOCK_USAGE } else { UNLOCK_USAGE });
            };
            if password.is_empty() {
                return Command::Usage(if head == "Lock" { LOCK_USAGE } else { UNLOCK_USAGE });
            }
            let path = path::normalize(target);
            let password = password.join(" ");
            if head == "Lock" {
                Command::Lock { path, password }
            } else {
                Command::Unlock { path, password }
            }
        }
        "Find" if args.is_empty() => Command::Usage(FIND_USAGE),
        "Find" => Command::Find {
            keyword: args.join(" "),
        },
        _ => Command::Unknown,
    }
}

/// Something the host should do besides printing logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum TerminalAction {
    ToggleTerminal { visible: bool },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TerminalOutput {
    pub logs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<TerminalAction>,
    /// Files found by `Find`, for the host to offer.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<FileMatch>,
}

impl TerminalOutput {
    fn echo(input: &str) -> Self {
        Self {
            logs: vec![format!("> {}", input)],
            ..Self::default()
        }
    }

    fn line(mut self, line: impl Into<String>) -> Self {
        self.logs.push(line.into());
        self
    }

    /// True when the host should clear its visible history.
    pub fn is_clear(&self) -> bool {
        self.logs.is_empty()
    }
}

pub struct Terminal<'a, S: TreeStore> {
    store: &'a S,
    actor: String,
}

impl<'a, S: TreeStore> Terminal<'a, S> {
    /// `actor` is the name recorded in the activity log for lock changes.
    pub fn new(store: &'a S, actor: impl Into<String>) -> Self {
        Self {
            store,
            actor: actor.into(),
        }
    }

    pub fn run(&self, input: &str) -> Result<TerminalOutput> {
        self.execute(input, parse(input))
    }

    pub fn execute(&self, input: &str, command: Command) -> Result<TerminalOutput> {
        let name = match &command {
            Command::Help => "help",
            Command::Clear => "clear",
            Command::FloatConsole(_) => "float_console",
            Command::Lock { .. } => "lock",
            Command::Unlock { .. } => "unlock",
            Command::Find { .. } => "find",
            Command::Usage(_) => "usage",
            Command::Unknown => "unknown",
        };
        // Lock and Unlock carry passwords, so only the command name is logged.
        tracing::debug!(command = name, "terminal command");
        let out = TerminalOutput::echo(input);
        let out = match command {
            Command::Help => HELP_LINES.iter().fold(out, |out, line| out.line(*line)),
            Command::Clear => TerminalOutput::default(),
            Command::FloatConsole(visible) => {
                let mut out = out.line(if visible {
                    "Floating console enabled."
                } else {
                    "Floating console disabled."
                });
                out.action = Some(TerminalAction::ToggleTerminal { visible });
                out
            }
            Command::Lock { path, password } => self.lock(out, &path, &password)?,
            Command::Unlock { path, password } => self.unlock(out, &path, &password)?,
            Command::Find { keyword } => {
                let mut out = out.line(format!(
                    "Searching for note with name \"{}\"...",
                    keyword.to_lowercase()
                ));
                out.matches = notes::search(self.store, &keyword)?;
                out
            }
            Command::Usage(usage) => out.line(usage),
            Command::Unknown => out.line("Command not found."),
        };
        Ok(out)
    }

    fn folder(&self, display: &str) -> Result<Option<FolderEntry>> {
        Ok(FolderTree::new(self.store)
            .load_whole_tree()?
            .resolve(display)
            .cloned())
    }

    fn lock(&self, out: TerminalOutput, display: &str, password: &str) -> Result<TerminalOutput> {
        let Some(entry) = self.folder(display)? else {
            return Ok(out.line(format!("Folder {} not found.", display)));
        };
        if entry.id.is_none() {
            return Ok(out.line("Root cannot be locked."));
        }

        let mut fields = Map::new();
        fields.insert("locked".to_string(), json!(true));
        fields.insert("password".to_string(), json!(password));
        self.store.update(&entry.path.store_key(), fields)?;
        ActivityLog::new(self.store).record(&self.actor, Action::Lock, &entry.name, None)?;
        Ok(out.line(format!("Folder {} locked.", display)))
    }

    fn unlock(&self, out: TerminalOutput, display: &str, password: &str) -> Result<TerminalOutput> {
        const NOT_LOCKED: &str = "Folder is not locked or does not exist.";

        let Some(entry) = self.folder(display)? else {
            return Ok(out.line(NOT_LOCKED));
        };
        let Some(id) = entry.id.as_deref() else {
            return Ok(out.line(NOT_LOCKED));
        };
        let node = match self.store.read(&entry.path.store_key())? {
            Some(value) => Node::from_record(id, &value).ok(),
            None => None,
        };
        let Some(node) = node.filter(|n| n.locked) else {
            return Ok(out.line(NOT_LOCKED));
        };

        if node.password.as_deref() != Some(password) {
            return Ok(out.line("Incorrect password."));
        }
        let mut fields = Map::new();
        fields.insert("locked".to_string(), json!(false));
        fields.insert("password".to_string(), Value::Null);
        self.store.update(&entry.path.store_key(), fields)?;
        ActivityLog::new(self.store).record(&self.actor, Action::Unlock, &entry.name, None)?;
        Ok(out.line(format!("Folder {} unlocked.", display)))
    }
}
