//! # Move Engine
//!
//! Relocates a node under another folder, addressed by display path.
//!
//! The destination is resolved against a fresh whole-tree scan. A move into the
//! node itself or anywhere beneath it is refused before anything is written.
//!
//! ## Not Atomic
//!
//! A move is three independent store calls: read the subtree, write it under a
//! fresh id at the destination, delete the source. If the delete fails the
//! subtree exists twice. The error is returned and logged, and nothing is rolled
//! back.
//!
//! Only the moved node gets a new id. Descendants keep theirs, so notes of files
//! inside a moved folder stay attached. A moved file has its note re-keyed.

use crate::error::{DeskError, Result};
use crate::lock;
use crate::notes;
use crate::path::NodePath;
use crate::store::{join_key, TreeStore};
use crate::tree::FolderTree;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveReport {
    /// Id at the destination, or the unchanged id when nothing moved.
    pub new_id: String,
    pub name: String,
    pub from: NodePath,
    pub to: NodePath,
    /// False when the destination already was the parent.
    pub moved: bool,
}

impl MoveReport {
    pub fn new_path(&self) -> NodePath {
        self.to.child(self.new_id.clone())
    }
}

pub struct MoveEngine<'a, S: TreeStore> {
    store: &'a S,
}

impl<'a, S: TreeStore> MoveEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn move_node(
        &self,
        item: &NodePath,
        destination: &str,
        supplied: Option<&str>,
    ) -> Result<MoveReport> {
        if destination.trim().is_empty() {
            return Err(DeskError::Validation(
                "Destination cannot be empty".to_string(),
            ));
        }
        let Some(from) = item.parent() else {
            return Err(DeskError::Validation("Root cannot be moved".to_string()));
        };

        let tree = FolderTree::new(self.store);
        let node = tree.node(item)?;
        lock::require(&node, supplied)?;

        let folders = tree.load_whole_tree()?;
        let target = folders
            .resolve(destination)
            .ok_or_else(|| DeskError::NotFound("Destination folder not found!".to_string()))?;
        let to = target.path.clone();

        if item.is_self_or_ancestor_of(&to) {
            return Err(DeskError::IllegalMove(
                "Cannot move folder into itself or its own subfolder".to_string(),
            ));
        }
        if to == from {
            return Ok(MoveReport {
                new_id: node.id,
                name: node.name,
                from,
                to,
                moved: false,
            });
        }

        let subtree = self
            .store
            .read(&item.store_key())?
            .ok_or_else(|| DeskError::NotFound(format!("Item not found: {}", node.id)))?;
        let container = to.children_key();
        let new_id = self.store.push_key(&container)?;
        self.store.write(&join_key(&container, &new_id), subtree)?;

        if let Err(e) = self.store.delete(&item.store_key()) {
            tracing::warn!(
                source = %item,
                copy = %to.child(new_id.clone()),
                error = %e,
                "move copied the subtree but could not delete the source"
            );
            return Err(e);
        }
        if node.is_file() {
            notes::rekey(self.store, &node.id, &new_id)?;
        }

        tracing::info!(old_id = %node.id, %new_id, from = %from, to = %to, "moved node");
        Ok(MoveReport {
            new_id,
            name: node.name,
            from,
            to,
            moved: true,
        })
    }
}
