use crate::activity::{Action, ActivityLog};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::NodeKind;
use crate::path::NodePath;
use crate::store::TreeStore;
use crate::tree::FolderTree;

pub fn run<S: TreeStore>(
    store: &S,
    actor: &str,
    parent: &NodePath,
    name: &str,
    kind: NodeKind,
) -> Result<CmdResult> {
    let tree = FolderTree::new(store);
    let id = tree.create(parent, name, kind)?;
    let node = tree.node(&parent.child(id))?;

    let action = match kind {
        NodeKind::Folder => Action::CreateFolder,
        NodeKind::File => Action::CreateFile,
    };
    ActivityLog::new(store).record(actor, action, &node.name, None)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Created {}: {}", kind, node.name)));
    Ok(result.with_affected_nodes(vec![node]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeskError;
    use crate::store::memory::MemTreeStore;

    #[test]
    fn creates_and_logs() {
        let store = MemTreeStore::new();
        let result = run(&store, "Ada", &NodePath::root(), "Docs", NodeKind::Folder).unwrap();
        assert_eq!(result.affected_nodes[0].name, "Docs");
        assert_eq!(result.messages[0].content, "Created folder: Docs");

        let page = ActivityLog::new(&store).recent(10).unwrap();
        assert_eq!(page.entries[0].action, "Create folder");
        assert_eq!(page.entries[0].user, "Ada");
        assert_eq!(page.entries[0].target, "Docs");
    }

    #[test]
    fn trims_the_name() {
        let store = MemTreeStore::new();
        let result = run(&store, "u", &NodePath::root(), "  a.txt ", NodeKind::File).unwrap();
        assert_eq!(result.affected_nodes[0].name, "a.txt");
    }

    #[test]
    fn empty_name_writes_nothing() {
        let store = MemTreeStore::new();
        let result = run(&store, "u", &NodePath::root(), "", NodeKind::File);
        assert!(matches!(result, Err(DeskError::Validation(_))));
        assert_eq!(store.snapshot(), serde_json::json!({}));
    }

    #[test]
    fn store_failure_propagates() {
        let store = MemTreeStore::new();
        store.set_simulate_write_error(true);
        let result = run(&store, "u", &NodePath::root(), "Docs", NodeKind::Folder);
        assert!(matches!(result, Err(DeskError::Store(_))));
    }
}
