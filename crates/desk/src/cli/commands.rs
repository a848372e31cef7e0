//! # CLI Layer
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr, stdin)
//! - Uses `std::process::exit` (through `main`)
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: shell arguments become typed commands via clap
//! 2. **Context Setup**: tracing, configuration, store and session
//! 3. **Dispatch**: each command walks to the folder it addresses, then calls the API
//! 4. **Output Formatting**: text through `render`, or JSON
//!
//! Errors bubble up as `anyhow::Error` and are printed by `main`.

use super::render;
use super::setup::{
    Cli, Commands, CoreCommands, MiscCommands, NodeCommands, NoteCommands, OutputFormat,
};
use anyhow::{anyhow, bail, Context as _, Result};
use clap::Parser;
use deskapp::api::DeskApi;
use deskapp::config::DeskConfig;
use deskapp::identity::{IdentityProvider, LocalIdentity};
use deskapp::init::{self, DeskContext};
use deskapp::navigation::EnterOutcome;
use deskapp::path;
use deskapp::store::fs::FileTreeStore;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::io::{BufRead, IsTerminal, Read, Write};
use tracing_subscriber::EnvFilter;

/// Tracing filter override, e.g. `DESK_LOG=deskapp=debug`.
pub const LOG_ENV: &str = "DESK_LOG";

type Api = DeskApi<FileTreeStore, LocalIdentity>;

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = init::data_dir()?;
    let config = init::load_config(&data_dir);
    init_tracing(cli.verbose, &config);

    let mut ctx = init::initialize_in(data_dir, cli.data.clone())?;
    if let Some(user) = cli.user.as_deref() {
        // Per-invocation identity: no login entry, no stored session.
        ctx.api.identity().sign_in(user, None)?;
    }

    let out = Output { format: cli.output };
    let command = cli.command.unwrap_or(Commands::Core(CoreCommands::Ls {
        path: None,
        password: None,
    }));
    tracing::debug!(format = ?out.format, "dispatching");

    match command {
        Commands::Core(cmd) => core(&mut ctx.api, &out, cmd),
        Commands::Node(cmd) => node(&mut ctx.api, &out, cmd),
        Commands::Note { action } => note(&mut ctx.api, &out, action),
        Commands::Misc(cmd) => misc(&mut ctx, &out, cmd),
    }
}

fn init_tracing(verbose: bool, config: &DeskConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    });
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

struct Output {
    format: OutputFormat,
}

impl Output {
    fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints `value` as JSON, or the text from `text` otherwise.
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) {
        if self.is_json() {
            print!("{}", render::render_json(value));
        } else {
            print!("{}", text());
        }
    }
}

/// Walks from the root to the folder at `target`.
fn walk_to(api: &mut Api, target: &str, password: Option<&str>) -> Result<()> {
    match api.navigate(target, password)? {
        EnterOutcome::Entered => Ok(()),
        EnterOutcome::ChallengeRequired { name } => {
            bail!("{} is locked. Pass --password to open it", name)
        }
    }
}

/// Walks to the parent of `target` and returns the last name on it.
fn walk_to_parent(api: &mut Api, target: &str, password: Option<&str>) -> Result<String> {
    let (parent, name) = path::split_target(target)
        .ok_or_else(|| anyhow!("{} names the root folder", target.trim()))?;
    walk_to(api, &parent, password)?;
    Ok(name)
}

/// Like [`walk_to_parent`], but `inside` names the folder when given and `name`
/// is taken as is.
fn walk_to_target(
    api: &mut Api,
    name: &str,
    inside: Option<&str>,
    password: Option<&str>,
) -> Result<String> {
    match inside {
        Some(folder) => {
            walk_to(api, folder, password)?;
            Ok(name.to_string())
        }
        None => walk_to_parent(api, name, password),
    }
}

fn core(api: &mut Api, out: &Output, cmd: CoreCommands) -> Result<()> {
    match cmd {
        CoreCommands::Ls { path, password } => {
            walk_to(api, path.as_deref().unwrap_or(""), password.as_deref())?;
            let result = api.list()?;
            let display = api.display_path()?;
            out.emit(&result, || render::render_listing(&display, &result));
        }
        CoreCommands::Mkdir {
            path,
            inside,
            password,
        } => {
            let name = walk_to_target(api, &path, inside.as_deref(), password.as_deref())?;
            let result = api.create_folder(&name)?;
            out.emit(&result, || render::render_messages(&result.messages));
        }
        CoreCommands::Touch {
            path,
            inside,
            password,
        } => {
            let name = walk_to_target(api, &path, inside.as_deref(), password.as_deref())?;
            let result = api.create_file(&name)?;
            out.emit(&result, || render::render_messages(&result.messages));
        }
        CoreCommands::Tree => {
            let folders = api.tree()?;
            let files = api.files()?;
            if out.is_json() {
                out.emit(&json!({ "folders": folders, "files": files }), String::new);
                return Ok(());
            }
            let mut entries: Vec<(Vec<String>, bool)> = folders
                .display_paths()
                .map(|p| (path::display_segments(p), true))
                .filter(|(segments, _)| !segments.is_empty())
                .chain(
                    files
                        .iter()
                        .map(|f| (path::display_segments(&f.display_path), false)),
                )
                .collect();
            entries.sort();
            print!("{}", render::render_tree(&entries));
        }
        CoreCommands::Find { text } => {
            let keyword = text.join(" ");
            let matches = api.find_files(&keyword)?;
            let paths = file_paths(api)?;
            let found: Vec<(String, Option<String>)> = matches
                .iter()
                .map(|m| (m.file_name.clone(), paths.get(&m.id).cloned()))
                .collect();
            out.emit(&matches, || render::render_matches(&keyword, &found));
        }
    }
    Ok(())
}

fn node(api: &mut Api, out: &Output, cmd: NodeCommands) -> Result<()> {
    let result = match cmd {
        NodeCommands::Rename {
            path,
            new_name,
            password,
        } => {
            let name = walk_to_parent(api, &path, password.as_deref())?;
            api.rename(&name, &new_name, password.as_deref())?
        }
        NodeCommands::Rm { path, password } => {
            let name = walk_to_parent(api, &path, password.as_deref())?;
            api.delete(&name, password.as_deref())?
        }
        NodeCommands::Mv {
            path,
            destination,
            password,
        } => {
            let name = walk_to_parent(api, &path, password.as_deref())?;
            api.move_to(&name, &path::normalize(&destination), password.as_deref())?
        }
        NodeCommands::Lock { path, password } => {
            let name = walk_to_parent(api, &path, None)?;
            api.lock(&name, &password)?
        }
        NodeCommands::Unlock { path, password } => {
            let name = walk_to_parent(api, &path, None)?;
            api.unlock(&name, &password)?
        }
    };
    out.emit(&result, || render::render_messages(&result.messages));
    Ok(())
}

fn note(api: &mut Api, out: &Output, cmd: NoteCommands) -> Result<()> {
    match cmd {
        NoteCommands::Show { path, password } => {
            let name = walk_to_parent(api, &path, password.as_deref())?;
            let note = api.read_note(&name)?;
            out.emit(&note, || render::render_note(note.as_ref()));
        }
        NoteCommands::Save {
            path,
            title,
            content,
            password,
        } => {
            let name = walk_to_parent(api, &path, password.as_deref())?;
            let content = match content {
                Some(content) => content,
                None => read_stdin()?,
            };
            let title = title.unwrap_or_else(|| name.clone());
            let result = api.save_note(&name, &title, &content)?;
            out.emit(&result, || render::render_messages(&result.messages));
        }
    }
    Ok(())
}

fn misc(ctx: &mut DeskContext, out: &Output, cmd: MiscCommands) -> Result<()> {
    match cmd {
        MiscCommands::Logs { before, limit } => {
            let limit = limit.unwrap_or_else(|| ctx.config.page_size()).max(1);
            let page = match before {
                Some(before) => ctx.api.logs_before(before, limit)?,
                None => ctx.api.recent_logs(limit)?,
            };
            out.emit(&page, || render::render_logs(&page));
        }
        MiscCommands::Login { name, email } => {
            let user = ctx.api.sign_in(&name, email.as_deref())?;
            ctx.persist_session()?;
            out.emit(&user, || format!("Signed in as {}\n", user.display_name));
        }
        MiscCommands::Logout => {
            let previous = ctx.api.sign_out()?;
            ctx.persist_session()?;
            out.emit(&previous, || match &previous {
                Some(user) => format!("Signed out {}\n", user.display_name),
                None => "Nobody is signed in.\n".to_string(),
            });
        }
        MiscCommands::Whoami => {
            let user = ctx.api.identity().current_user();
            let actor = ctx.api.actor();
            out.emit(&user, || format!("{}\n", actor));
        }
        MiscCommands::Term { line } => {
            if line.is_empty() {
                terminal_session(&ctx.api, out)?;
            } else {
                terminal_line(&ctx.api, out, &line.join(" "))?;
            }
        }
    }
    Ok(())
}

fn terminal_line(api: &Api, out: &Output, line: &str) -> Result<()> {
    let output = api.terminal(line)?;
    if out.is_json() {
        out.emit(&output, String::new);
    } else if output.is_clear() {
        // Failing to clear a non-terminal is fine.
        let _ = console::Term::stdout().clear_screen();
    } else {
        let paths = if output.matches.is_empty() {
            HashMap::new()
        } else {
            file_paths(api)?
        };
        print!("{}", render::render_terminal(&output, &paths));
    }
    Ok(())
}

/// Reads terminal lines until end of input or `exit`.
fn terminal_session(api: &Api, out: &Output) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();
    if interactive && !out.is_json() {
        println!("Type /help for commands, exit to leave.");
    }
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("> ");
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let trimmed = line.trim();
        if trimmed == "exit" || trimmed == "quit" {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }
        terminal_line(api, out, trimmed)?;
    }
    Ok(())
}

/// File id → display path, for showing where search results live.
fn file_paths(api: &Api) -> Result<HashMap<String, String>> {
    Ok(api
        .files()?
        .into_iter()
        .map(|f| (f.id, f.display_path))
        .collect())
}

fn read_stdin() -> Result<String> {
    if std::io::stdin().is_terminal() {
        bail!("Pass --content or pipe the note on stdin");
    }
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read note from stdin")?;
    Ok(content)
}
