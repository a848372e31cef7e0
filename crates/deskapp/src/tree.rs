//! # Folder Tree
//!
//! The logical view over the `folders` container: one directory level at a time for
//! listings, plus full scans for destination lookup and file search.
//!
//! ## Listings
//!
//! [`FolderTree::children`] is a one-shot read. [`FolderTree::list_children`]
//! returns a [`LiveListing`] backed by a store subscription. The listing stays
//! current until its owner calls [`LiveListing::release`]. Nothing releases it
//! implicitly.
//!
//! ## Whole-Tree Scans
//!
//! [`FolderTree::load_whole_tree`] and [`FolderTree::all_files`] walk the tree
//! breadth-first from an explicit worklist, one read per folder level. The cost is
//! O(folders), which is fine at personal-workspace scale.
//!
//! Two sibling folders may share a name. Their display paths then collide, and the
//! first one reached in the walk (insertion order, shallowest first) wins.

use crate::error::{DeskError, Result};
use crate::model::{Node, NodeKind, StoredNode};
use crate::notes;
use crate::path::{self, NodePath};
use crate::store::{join_key, Listener, SubscriptionHandle, TreeStore};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

/// Validated children of a container value, skipping anything malformed.
pub fn parse_children(value: Option<&Value>) -> Vec<Node> {
    let Some(Value::Object(map)) = value else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(id, record)| match Node::from_record(id, record) {
            Ok(node) => Some(node),
            Err(reason) => {
                tracing::warn!(%reason, "quarantined tree record");
                None
            }
        })
        .collect()
}

/// A folder reachable from the root, as found by a whole-tree scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderEntry {
    /// `None` for the root.
    pub id: Option<String>,
    pub path: NodePath,
    pub name: String,
}

/// Display path → folder, for every folder including `/Root`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FolderMap(BTreeMap<String, FolderEntry>);

impl FolderMap {
    /// Looks up whatever the user typed, after normalizing it.
    pub fn resolve(&self, user_path: &str) -> Option<&FolderEntry> {
        self.0.get(&path::canonical_display(user_path))
    }

    pub fn get(&self, display_path: &str) -> Option<&FolderEntry> {
        self.0.get(display_path)
    }

    pub fn display_paths(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FolderEntry)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A file node together with where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    pub path: NodePath,
    pub display_path: String,
}

/// A child listing kept current by a store subscription.
pub struct LiveListing {
    handle: SubscriptionHandle,
    nodes: Rc<RefCell<Vec<Node>>>,
}

impl LiveListing {
    pub fn snapshot(&self) -> Vec<Node> {
        self.nodes.borrow().clone()
    }

    pub fn handle(&self) -> SubscriptionHandle {
        self.handle
    }

    pub fn release<S: TreeStore>(self, store: &S) {
        store.unsubscribe(self.handle);
    }
}

pub struct FolderTree<'a, S: TreeStore> {
    store: &'a S,
}

impl<'a, S: TreeStore> FolderTree<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn children(&self, parent: &NodePath) -> Result<Vec<Node>> {
        let value = self.store.read(&parent.children_key())?;
        Ok(parse_children(value.as_ref()))
    }

    pub fn list_children(&self, parent: &NodePath) -> Result<LiveListing> {
        let nodes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&nodes);
        let listener: Listener = Box::new(move |value| {
            *sink.borrow_mut() = parse_children(value);
        });
        let handle = self.store.subscribe(&parent.children_key(), listener)?;
        Ok(LiveListing { handle, nodes })
    }

    /// The validated record at `path`.
    pub fn node(&self, path: &NodePath) -> Result<Node> {
        let Some(id) = path.last_id() else {
            return Err(DeskError::Validation("Root is not a node".to_string()));
        };
        let value = self
            .store
            .read(&path.store_key())?
            .ok_or_else(|| DeskError::NotFound(format!("Item not found: {}", id)))?;
        Node::from_record(id, &value).map_err(DeskError::Store)
    }

    /// Appends a new child under `parent` and returns its id.
    pub fn create(&self, parent: &NodePath, name: &str, kind: NodeKind) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DeskError::Validation("Name cannot be empty".to_string()));
        }
        if !parent.is_root() && !self.node(parent)?.is_folder() {
            return Err(DeskError::Validation(
                "Files cannot contain other items".to_string(),
            ));
        }

        let container = parent.children_key();
        let id = self.store.push_key(&container)?;
        let record = serde_json::to_value(StoredNode::new(name, kind))?;
        self.store.write(&join_key(&container, &id), record)?;
        if kind == NodeKind::File {
            notes::index_file(self.store, &id, name)?;
        }
        tracing::info!(%id, %kind, name, "created node");
        Ok(id)
    }

    /// Updates the name field only.
    pub fn rename(&self, path: &NodePath, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(DeskError::Validation("Name cannot be empty".to_string()));
        }
        let node = self.node(path)?;
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!(new_name));
        self.store.update(&path.store_key(), fields)?;
        if node.is_file() {
            notes::index_file(self.store, &node.id, new_name)?;
        }
        tracing::info!(id = %node.id, new_name, "renamed node");
        Ok(())
    }

    /// Deletes the node and its subtree, plus the notes of every file inside it.
    pub fn remove(&self, path: &NodePath) -> Result<()> {
        let Some(id) = path.last_id() else {
            return Err(DeskError::Validation("Root cannot be deleted".to_string()));
        };
        let key = path.store_key();
        let value = self
            .store
            .read(&key)?
            .ok_or_else(|| DeskError::NotFound(format!("Item not found: {}", id)))?;
        let file_ids = files_in_subtree(id, &value);

        self.store.delete(&key)?;
        for file_id in &file_ids {
            notes::purge(self.store, file_id)?;
        }
        tracing::info!(%id, files = file_ids.len(), "removed node");
        Ok(())
    }

    /// Every folder by display path, starting with `/Root`.
    pub fn load_whole_tree(&self) -> Result<FolderMap> {
        let mut map = BTreeMap::new();
        map.insert(
            path::to_display_path::<&str>(&[]),
            FolderEntry {
                id: None,
                path: NodePath::root(),
                name: path::ROOT_TOKEN.to_string(),
            },
        );

        self.walk(|parent_path, names, node| {
            if !node.is_folder() {
                return;
            }
            let mut names = names.to_vec();
            names.push(node.name.clone());
            let display_path = path::to_display_path(&names);
            if map.contains_key(&display_path) {
                tracing::debug!(path = %display_path, "duplicate folder path, keeping first");
                return;
            }
            map.insert(
                display_path,
                FolderEntry {
                    id: Some(node.id.clone()),
                    path: parent_path.child(node.id.clone()),
                    name: node.name.clone(),
                },
            );
        })?;
        Ok(FolderMap(map))
    }

    /// Every file node in the tree, in walk order.
    pub fn all_files(&self) -> Result<Vec<FileEntry>> {
        let mut files = Vec::new();
        self.walk(|parent_path, names, node| {
            if !node.is_file() {
                return;
            }
            let mut names = names.to_vec();
            names.push(node.name.clone());
            files.push(FileEntry {
                id: node.id.clone(),
                name: node.name.clone(),
                path: parent_path.child(node.id.clone()),
                display_path: path::to_display_path(&names),
            });
        })?;
        Ok(files)
    }

    /// Finds the first node along a display path, matching names level by level.
    pub fn resolve_display(&self, user_path: &str) -> Result<Option<NodePath>> {
        let mut current = NodePath::root();
        for segment in path::display_segments(user_path) {
            let child = self
                .children(&current)?
                .into_iter()
                .find(|node| node.name == segment);
            match child {
                Some(node) => current = current.child(node.id),
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Breadth-first walk calling `visit(parent_path, parent_names, child)`.
    fn walk(&self, mut visit: impl FnMut(&NodePath, &[String], &Node)) -> Result<()> {
        let mut worklist: VecDeque<(NodePath, Vec<String>)> = VecDeque::new();
        worklist.push_back((NodePath::root(), Vec::new()));
        let mut levels = 0usize;

        while let Some((parent_path, names)) = worklist.pop_front() {
            levels += 1;
            for node in self.children(&parent_path)? {
                visit(&parent_path, &names, &node);
                if node.is_folder() {
                    let mut child_names = names.clone();
                    child_names.push(node.name.clone());
                    worklist.push_back((parent_path.child(node.id.clone()), child_names));
                }
            }
        }
        tracing::debug!(levels, "walked folder tree");
        Ok(())
    }
}

/// Ids of every file in the subtree rooted at the record `(id, value)`.
fn files_in_subtree(id: &str, value: &Value) -> Vec<String> {
    let mut found = Vec::new();
    let mut pending: Vec<(String, &Value)> = vec![(id.to_string(), value)];
    while let Some((id, record)) = pending.pop() {
        match record.get("type").and_then(Value::as_str) {
            Some("file") => found.push(id),
            Some("folder") => {
                if let Some(Value::Object(children)) = record.get(path::CHILDREN) {
                    pending.extend(children.iter().map(|(k, v)| (k.clone(), v)));
                }
            }
            _ => {}
        }
    }
    found
}
