//! # Lock Gate
//!
//! Password gating for folders. A locked folder with a password challenges every
//! sensitive operation on it: entering, renaming, deleting, moving, and unlocking.
//!
//! A node without a password never challenges. This holds even when its `locked`
//! flag is set, which only happens with records written outside desk.
//!
//! Locking overwrites an existing password without asking for the old one.

use crate::error::{DeskError, Result};
use crate::model::Node;
use crate::path::NodePath;
use crate::store::TreeStore;
use crate::tree::FolderTree;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Challenge {
    Passed,
    WrongPassword,
}

pub fn is_locked(node: &Node) -> bool {
    node.locked
}

/// Compares `supplied` against the node's password, if it has one.
pub fn challenge(node: &Node, supplied: Option<&str>) -> Challenge {
    match node.password.as_deref() {
        None => Challenge::Passed,
        Some(expected) if supplied == Some(expected) => Challenge::Passed,
        Some(_) => Challenge::WrongPassword,
    }
}

/// [`challenge`] as a `Result`, for operations that stop on a wrong password.
pub fn require(node: &Node, supplied: Option<&str>) -> Result<()> {
    match challenge(node, supplied) {
        Challenge::Passed => Ok(()),
        Challenge::WrongPassword => Err(DeskError::WrongPassword),
    }
}

pub struct LockGate<'a, S: TreeStore> {
    store: &'a S,
}

impl<'a, S: TreeStore> LockGate<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn lock(&self, path: &NodePath, password: &str) -> Result<Node> {
        if password.trim().is_empty() {
            return Err(DeskError::Validation(
                "Password cannot be empty".to_string(),
            ));
        }
        if path.is_root() {
            return Err(DeskError::Validation(
                "Root cannot be locked".to_string(),
            ));
        }
        let node = FolderTree::new(self.store).node(path)?;
        if !node.is_folder() {
            return Err(DeskError::Validation(
                "Only folders can be locked".to_string(),
            ));
        }

        let mut fields = Map::new();
        fields.insert("locked".to_string(), json!(true));
        fields.insert("password".to_string(), json!(password));
        self.store.update(&path.store_key(), fields)?;
        tracing::info!(id = %node.id, "locked folder");

        Ok(Node {
            locked: true,
            password: Some(password.to_string()),
            ..node
        })
    }

    pub fn unlock(&self, path: &NodePath, supplied: &str) -> Result<Node> {
        let node = FolderTree::new(self.store).node(path)?;
        if !is_locked(&node) {
            return Err(DeskError::Validation(format!(
                "{} is not locked",
                node.name
            )));
        }
        require(&node, Some(supplied))?;

        let mut fields = Map::new();
        fields.insert("locked".to_string(), json!(false));
        fields.insert("password".to_string(), Value::Null);
        self.store.update(&path.store_key(), fields)?;
        tracing::info!(id = %node.id, "unlocked folder");

        Ok(Node {
            locked: false,
            password: None,
            ..node
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;
    use crate::store::memory::MemTreeStore;

    fn folder(store: &MemTreeStore, name: &str) -> NodePath {
        let id = FolderTree::new(store)
            .create(&NodePath::root(), name, NodeKind::Folder)
            .unwrap();
        NodePath::root().child(id)
    }

    #[test]
    fn lock_then_unlock_restores_plain_folder() {
        let store = MemTreeStore::new();
        let docs = folder(&store, "Docs");
        let gate = LockGate::new(&store);

        gate.lock(&docs, "p1").unwrap();
        let locked = FolderTree::new(&store).node(&docs).unwrap();
        assert!(is_locked(&locked));
        assert_eq!(locked.password.as_deref(), Some("p1"));

        gate.unlock(&docs, "p1").unwrap();
        assert_eq!(
            store.read(&docs.store_key()).unwrap(),
            Some(json!({"name": "Docs", "type": "folder", "locked": false}))
        );
        let node = FolderTree::new(&store).node(&docs).unwrap();
        assert!(!node.locked);
        assert_eq!(node.password, None);
    }

    #[test]
    fn wrong_password_changes_nothing() {
        let store = MemTreeStore::new();
        let docs = folder(&store, "Docs");
        let gate = LockGate::new(&store);
        gate.lock(&docs, "p1").unwrap();
        let before = store.snapshot();

        assert!(matches!(
            gate.unlock(&docs, "wrong"),
            Err(DeskError::WrongPassword)
        ));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn relock_overwrites_password() {
        let store = MemTreeStore::new();
        let docs = folder(&store, "Docs");
        let gate = LockGate::new(&store);
        gate.lock(&docs, "old").unwrap();
        gate.lock(&docs, "new").unwrap();
        assert!(gate.unlock(&docs, "old").is_err());
        assert!(gate.unlock(&docs, "new").is_ok());
    }

    #[test]
    fn lock_rejects_bad_targets() {
        let store = MemTreeStore::new();
        let gate = LockGate::new(&store);
        let docs = folder(&store, "Docs");
        let file = NodePath::root().child(
            FolderTree::new(&store)
                .create(&NodePath::root(), "a.txt", NodeKind::File)
                .unwrap(),
        );

        assert!(matches!(gate.lock(&docs, " "), Err(DeskError::Validation(_))));
        assert!(matches!(
            gate.lock(&NodePath::root(), "p"),
            Err(DeskError::Validation(_))
        ));
        assert!(matches!(gate.lock(&file, "p"), Err(DeskError::Validation(_))));
    }

    #[test]
    fn passwordless_nodes_never_challenge() {
        let node = Node::from_record("x", &json!({"name": "A", "type": "folder", "locked": true}))
            .unwrap();
        assert!(is_locked(&node));
        assert_eq!(challenge(&node, None), Challenge::Passed);
        assert_eq!(challenge(&node, Some("anything")), Challenge::Passed);
    }

    #[test]
    fn challenge_is_exact() {
        let node = Node::from_record(
            "x",
            &json!({"name": "A", "type": "folder", "locked": true, "password": "p1"}),
        )
        .unwrap();
        assert_eq!(challenge(&node, Some("p1")), Challenge::Passed);
        assert_eq!(challenge(&node, Some("P1")), Challenge::WrongPassword);
        assert_eq!(challenge(&node, None), Challenge::WrongPassword);
    }
}
