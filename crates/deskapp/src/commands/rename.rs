use crate::activity::{Action, ActivityLog};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{DeskError, Result};
use crate::lock;
use crate::path::NodePath;
use crate::store::TreeStore;
use crate::tree::FolderTree;

pub fn run<S: TreeStore>(
    store: &S,
    actor: &str,
    path: &NodePath,
    new_name: &str,
    password: Option<&str>,
) -> Result<CmdResult> {
    let new_name = new_name.trim();
    if new_name.is_empty() {
        return Err(DeskError::Validation("Name cannot be empty".to_string()));
    }

    let tree = FolderTree::new(store);
    let node = tree.node(path)?;
    lock::require(&node, password)?;
    tree.rename(path, new_name)?;
    ActivityLog::new(store).record(actor, Action::Rename, new_name, None)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Renamed {} to {}",
        node.name, new_name
    )));
    let renamed = tree.node(path)?;
    Ok(result.with_affected_nodes(vec![renamed]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, locking};
    use crate::model::NodeKind;
    use crate::store::memory::MemTreeStore;

    fn docs(store: &MemTreeStore) -> NodePath {
        let created = create::run(store, "u", &NodePath::root(), "Docs", NodeKind::Folder).unwrap();
        NodePath::root().child(created.affected_nodes[0].id.clone())
    }

    #[test]
    fn renames_in_place() {
        let store = MemTreeStore::new();
        let path = docs(&store);
        let result = run(&store, "u", &path, "Papers", None).unwrap();
        assert_eq!(result.affected_nodes[0].name, "Papers");
        assert_eq!(result.affected_nodes[0].id, path.last_id().unwrap());
    }

    #[test]
    fn locked_folder_needs_password() {
        let store = MemTreeStore::new();
        let path = docs(&store);
        locking::lock(&store, "u", &path, "p1").unwrap();

        assert!(matches!(
            run(&store, "u", &path, "Papers", None),
            Err(DeskError::WrongPassword)
        ));
        assert_eq!(FolderTree::new(&store).node(&path).unwrap().name, "Docs");
        run(&store, "u", &path, "Papers", Some("p1")).unwrap();
        assert_eq!(FolderTree::new(&store).node(&path).unwrap().name, "Papers");
    }

    #[test]
    fn missing_node_is_not_found() {
        let store = MemTreeStore::new();
        let result = run(&store, "u", &NodePath::root().child("nope"), "x", None);
        assert!(matches!(result, Err(DeskError::NotFound(_))));
    }
}
