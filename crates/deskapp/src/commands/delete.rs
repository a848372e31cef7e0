use crate::activity::{Action, ActivityLog};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::lock;
use crate::path::NodePath;
use crate::store::TreeStore;
use crate::tree::FolderTree;

pub fn run<S: TreeStore>(
    store: &S,
    actor: &str,
    path: &NodePath,
    password: Option<&str>,
) -> Result<CmdResult> {
    let tree = FolderTree::new(store);
    let node = tree.node(path)?;
    lock::require(&node, password)?;
    tree.remove(path)?;
    ActivityLog::new(store).record(actor, Action::Delete, &node.name, None)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Deleted {}: {}", node.kind, node.name)));
    Ok(result.with_affected_nodes(vec![node]))
}
