//! # Rendering Module
//!
//! Turns API results into text. Every function here returns a `String` and never
//! prints, so the handlers in `commands.rs` decide where output goes.
//!
//! ## Layout
//!
//! - Listings: one node per line, names padded to a common display width so the
//!   lock markers line up. Folders end in `/`.
//! - Logs: relative age, user, action and target in aligned columns.
//! - Messages: colored by level.
//!
//! Widths are measured with `unicode-width`, since names may hold wide characters.
//! Structured output (`--output json`) bypasses all of this and serializes the
//! API values directly.

use chrono::Utc;
use console::style;
use deskapp::activity::LogPage;
use deskapp::commands::{CmdMessage, CmdResult, MessageLevel};
use deskapp::model::{Node, Note};
use deskapp::terminal::TerminalOutput;
use serde::Serialize;
use std::collections::HashMap;
use unicode_width::UnicodeWidthStr;

pub const LOCK_MARKER: &str = "[locked]";
pub const EMPTY_NOTE: &str = "(empty note)";

/// Pads `text` with spaces to `width` display columns.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let mut out = text.to_string();
    out.push_str(&" ".repeat(width.saturating_sub(text.width())));
    out
}

pub fn render_json<T: Serialize>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(json) => format!("{}\n", json),
        Err(e) => format!("{{\"error\": \"{}\"}}\n", e),
    }
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    messages
        .iter()
        .map(|msg| {
            let line = match msg.level {
                MessageLevel::Info => style(&msg.content),
                MessageLevel::Success => style(&msg.content).green(),
                MessageLevel::Warning => style(&msg.content).yellow(),
            };
            format!("{}\n", line)
        })
        .collect()
}

fn node_label(node: &Node) -> String {
    if node.is_folder() {
        format!("{}/", node.name)
    } else {
        node.name.clone()
    }
}

/// A folder listing under a header naming the folder.
pub fn render_listing(display_path: &str, result: &CmdResult) -> String {
    let mut out = format!("{}\n", style(display_path).bold());
    let labels: Vec<String> = result.listed_nodes.iter().map(node_label).collect();
    let width = labels.iter().map(|l| l.width()).max().unwrap_or(0);

    for (node, label) in result.listed_nodes.iter().zip(&labels) {
        let name = if node.is_folder() {
            style(pad_to_width(label, width)).blue().bold().to_string()
        } else {
            pad_to_width(label, width)
        };
        if node.locked {
            out.push_str(&format!("  {}  {}\n", name, style(LOCK_MARKER).dim()));
        } else {
            out.push_str(&format!("  {}\n", name.trim_end()));
        }
    }
    out.push_str(&render_messages(&result.messages));
    out
}

/// One line per display path, indented by depth. Folders end in `/`.
pub fn render_tree(entries: &[(Vec<String>, bool)]) -> String {
    let mut out = String::from("/Root\n");
    for (segments, is_folder) in entries {
        let Some(name) = segments.last() else {
            continue;
        };
        let indent = "  ".repeat(segments.len());
        if *is_folder {
            out.push_str(&format!("{}{}\n", indent, style(format!("{}/", name)).blue()));
        } else {
            out.push_str(&format!("{}{}\n", indent, name));
        }
    }
    out
}

/// Search results with the display path of each match, when known.
pub fn render_matches(keyword: &str, paths: &[(String, Option<String>)]) -> String {
    if paths.is_empty() {
        return format!("No files match \"{}\".\n", keyword);
    }
    paths
        .iter()
        .map(|(name, path)| match path {
            Some(path) => format!("{}  {}\n", name, style(path).dim()),
            None => format!("{}\n", name),
        })
        .collect()
}

pub fn render_note(note: Option<&Note>) -> String {
    match note {
        Some(note) if !note.content.is_empty() => {
            let mut out = note.content.clone();
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out
        }
        _ => format!("{}\n", style(EMPTY_NOTE).dim()),
    }
}

fn age(timestamp_ms: i64) -> String {
    let elapsed = Utc::now().timestamp_millis().saturating_sub(timestamp_ms);
    let elapsed = std::time::Duration::from_millis(elapsed.max(0) as u64);
    timeago::Formatter::new().convert(elapsed)
}

pub fn render_logs(page: &LogPage) -> String {
    if page.entries.is_empty() {
        return "No activity yet.\n".to_string();
    }

    let rows: Vec<[String; 4]> = page
        .entries
        .iter()
        .map(|e| {
            [
                age(e.timestamp),
                e.user.clone(),
                e.action.clone(),
                e.target.clone(),
            ]
        })
        .collect();
    let widths: [usize; 3] = std::array::from_fn(|col| {
        rows.iter().map(|row| row[col].width()).max().unwrap_or(0)
    });

    let mut out = String::new();
    for row in &rows {
        out.push_str(&format!(
            "{}  {}  {}  {}\n",
            style(pad_to_width(&row[0], widths[0])).dim(),
            pad_to_width(&row[1], widths[1]),
            style(pad_to_width(&row[2], widths[2])).cyan(),
            row[3]
        ));
    }
    if let Some(before) = page.next_before {
        out.push_str(&format!(
            "{}\n",
            style(format!("More: desk logs --before {}", before)).dim()
        ));
    }
    out
}

/// Terminal output as the host shows it, including found files.
pub fn render_terminal(output: &TerminalOutput, paths: &HashMap<String, String>) -> String {
    let mut out: String = output.logs.iter().map(|l| format!("{}\n", l)).collect();
    for found in &output.matches {
        match paths.get(&found.id) {
            Some(path) => out.push_str(&format!("  {}  {}\n", found.file_name, style(path).dim())),
            None => out.push_str(&format!("  {}\n", found.file_name)),
        }
    }
    out
}
