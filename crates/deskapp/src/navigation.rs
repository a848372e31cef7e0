use crate::error::{DeskError, Result};
use crate::lock;
use crate::model::Node;
use crate::path::{self, NodePath};
use crate::store::TreeStore;

/// Placeholder shown for a breadcrumb whose folder could not be read.
pub const MISSING_NAME: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnterOutcome {
    Entered,
    /// The folder is locked and needs a password. Nothing changed.
    ChallengeRequired { name: String },
}

/// Tracks the folder a client is looking at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    current: NodePath,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(path: NodePath) -> Self {
        Self { current: path }
    }

    pub fn current(&self) -> &NodePath {
        &self.current
    }

    /// Enters `node`, a child of the current folder.
    ///
    /// A locked folder with a password is only entered when `supplied` passes the
    /// challenge. Entering does not unlock it.
    pub fn enter(&mut self, node: &Node, supplied: Option<&str>) -> Result<EnterOutcome> {
        if !node.is_folder() {
            return Err(DeskError::Validation(format!(
                "{} is not a folder",
                node.name
            )));
        }
        if lock::is_locked(node) {
            if supplied.is_none() && node.password.is_some() {
                return Ok(EnterOutcome::ChallengeRequired {
                    name: node.name.clone(),
                });
            }
            lock::require(node, supplied)?;
        }
        self.current = self.current.child(node.id.clone());
        tracing::debug!(path = %self.current, "entered folder");
        Ok(EnterOutcome::Entered)
    }

    /// Goes up one level. Returns false when already at the root.
    pub fn back(&mut self) -> bool {
        self.current.pop()
    }

    pub fn reset(&mut self) {
        self.current = NodePath::root();
    }

    /// Folder names from the root down to the current folder.
    ///
    /// Each level is a separate one-shot read. An unreadable level shows
    /// [`MISSING_NAME`].
    pub fn breadcrumbs<S: TreeStore>(&self, store: &S) -> Result<Vec<String>> {
        let ids = self.current.ids();
        let mut names = Vec::with_capacity(ids.len());
        for depth in 1..=ids.len() {
            let key = NodePath::from_ids(ids[..depth].iter().cloned()).store_key();
            let name = store
                .read(&format!("{}/name", key))?
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| MISSING_NAME.to_string());
            names.push(name);
        }
        Ok(names)
    }

    pub fn display_path<S: TreeStore>(&self, store: &S) -> Result<String> {
        Ok(path::to_display_path(&self.breadcrumbs(store)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::LockGate;
    use crate::model::NodeKind;
    use crate::store::memory::MemTreeStore;
    use crate::tree::FolderTree;

    fn docs_with_file(store: &MemTreeStore) -> NodePath {
        let tree = FolderTree::new(store);
        let docs = NodePath::root().child(
            tree.create(&NodePath::root(), "Docs", NodeKind::Folder)
                .unwrap(),
        );
        tree.create(&docs, "a.txt", NodeKind::File).unwrap();
        docs
    }

    #[test]
    fn enter_and_back() {
        let store = MemTreeStore::new();
        let docs = docs_with_file(&store);
        let node = FolderTree::new(&store).node(&docs).unwrap();

        let mut nav = Navigator::new();
        assert_eq!(nav.enter(&node, None).unwrap(), EnterOutcome::Entered);
        assert_eq!(nav.current(), &docs);
        assert_eq!(nav.display_path(&store).unwrap(), "/Root/Docs");

        assert!(nav.back());
        assert!(!nav.back());
        assert_eq!(nav.display_path(&store).unwrap(), "/Root");
    }

    #[test]
    fn locked_folder_needs_the_password() {
        let store = MemTreeStore::new();
        let docs = docs_with_file(&store);
        LockGate::new(&store).lock(&docs, "p1").unwrap();
        let node = FolderTree::new(&store).node(&docs).unwrap();

        let mut nav = Navigator::new();
        assert_eq!(
            nav.enter(&node, None).unwrap(),
            EnterOutcome::ChallengeRequired {
                name: "Docs".to_string()
            }
        );
        assert!(nav.current().is_root());

        assert!(matches!(
            nav.enter(&node, Some("nope")),
            Err(DeskError::WrongPassword)
        ));
        assert!(nav.current().is_root());

        assert_eq!(nav.enter(&node, Some("p1")).unwrap(), EnterOutcome::Entered);
        assert!(FolderTree::new(&store).node(&docs).unwrap().locked);
    }

    #[test]
    fn files_cannot_be_entered() {
        let store = MemTreeStore::new();
        let docs = docs_with_file(&store);
        let file = FolderTree::new(&store).children(&docs).unwrap().remove(0);
        let mut nav = Navigator::at(docs.clone());
        assert!(nav.enter(&file, None).is_err());
        assert_eq!(nav.current(), &docs);
    }

    #[test]
    fn breadcrumbs_fall_back_for_missing_levels() {
        let store = MemTreeStore::new();
        let docs = docs_with_file(&store);
        let nav = Navigator::at(docs.child("gone"));
        assert_eq!(nav.breadcrumbs(&store).unwrap(), vec!["Docs", "..."]);
    }
}
