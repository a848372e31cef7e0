use crate::activity::{Action, ActivityLog};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::moving::MoveEngine;
use crate::path::NodePath;
use crate::store::TreeStore;
use crate::tree::FolderTree;
use serde_json::json;

pub fn run<S: TreeStore>(
    store: &S,
    actor: &str,
    path: &NodePath,
    destination: &str,
    password: Option<&str>,
) -> Result<CmdResult> {
    let report = MoveEngine::new(store).move_node(path, destination, password)?;
    let mut result = CmdResult::default();

    if !report.moved {
        result.add_message(CmdMessage::warning(format!(
            "{} is already in {}",
            report.name, destination
        )));
        return Ok(result);
    }

    ActivityLog::new(store).record(
        actor,
        Action::Move,
        &report.name,
        Some(json!({
            "from": report.from.joined(),
            "to": report.to.joined(),
        })),
    )?;
    result.add_message(CmdMessage::success(format!(
        "Moved {} to {}",
        report.name, destination
    )));
    let moved = FolderTree::new(store).node(&report.new_path())?;
    Ok(result.with_affected_nodes(vec![moved]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create;
    use crate::error::DeskError;
    use crate::model::NodeKind;
    use crate::store::memory::MemTreeStore;

    fn folder(store: &MemTreeStore, parent: &NodePath, name: &str) -> NodePath {
        let created = create::run(store, "u", parent, name, NodeKind::Folder).unwrap();
        parent.child(created.affected_nodes[0].id.clone())
    }

    #[test]
    fn move_logs_from_and_to() {
        let store = MemTreeStore::new();
        let root = NodePath::root();
        let docs = folder(&store, &root, "Docs");
        let archive = folder(&store, &root, "Archive");

        let result = run(&store, "u", &docs, "/Root/Archive", None).unwrap();
        assert_eq!(result.affected_nodes[0].name, "Docs");

        let page = ActivityLog::new(&store).recent(10).unwrap();
        let entry = page.entries.iter().find(|e| e.action == "Move").unwrap();
        assert_eq!(entry.target, "Docs");
        assert_eq!(
            entry.extra,
            Some(json!({"from": "", "to": archive.joined()}))
        );
    }

    #[test]
    fn illegal_move_logs_nothing() {
        let store = MemTreeStore::new();
        let docs = folder(&store, &NodePath::root(), "Docs");
        let logged = ActivityLog::new(&store).recent(10).unwrap().entries.len();

        assert!(matches!(
            run(&store, "u", &docs, "/Root/Docs", None),
            Err(DeskError::IllegalMove(_))
        ));
        assert_eq!(ActivityLog::new(&store).recent(10).unwrap().entries.len(), logged);
    }

    #[test]
    fn same_parent_is_reported_not_logged() {
        let store = MemTreeStore::new();
        let docs = folder(&store, &NodePath::root(), "Docs");
        let result = run(&store, "u", &docs, "/Root", None).unwrap();
        assert!(result.affected_nodes.is_empty());
        assert_eq!(result.messages[0].level, crate::commands::MessageLevel::Warning);
        assert_eq!(result.messages[0].content, "Docs is already in /Root");
    }
}
