use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::path::NodePath;
use crate::store::TreeStore;
use crate::tree::FolderTree;

pub fn run<S: TreeStore>(store: &S, folder: &NodePath) -> Result<CmdResult> {
    let nodes = FolderTree::new(store).children(folder)?;
    let mut result = CmdResult::default();
    if nodes.is_empty() {
        result.add_message(CmdMessage::info("This folder is empty."));
    }
    Ok(result.with_listed_nodes(nodes))
}
