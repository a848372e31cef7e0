//! The JSON document and subscription registry behind both stores.
//!
//! [`Document`] holds pure tree operations on a `serde_json::Value`. It knows
//! nothing about listeners. [`Subscribers`] tracks listeners per key and decides
//! who hears about a change.

use super::{Listener, SubscriptionHandle};
use crate::error::{DeskError, Result};
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Drops nulls and empty objects recursively. `None` means nothing is left to store.
fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let mut kept = Map::new();
            for (key, child) in map {
                if let Some(child) = prune(child) {
                    kept.insert(key, child);
                }
            }
            if kept.is_empty() {
                None
            } else {
                Some(Value::Object(kept))
            }
        }
        other => Some(other),
    }
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just made an object"),
    }
}

fn set_at(node: &mut Value, segs: &[&str], value: Value) {
    let map = ensure_object(node);
    match segs {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let child = map
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            set_at(child, rest, value);
        }
    }
}

/// Removes the key at `segs`. Returns true when `node` is left empty.
fn remove_at(node: &mut Value, segs: &[&str]) -> bool {
    let Some(map) = node.as_object_mut() else {
        return false;
    };
    match segs {
        [] => {}
        [last] => {
            map.shift_remove(*last);
        }
        [head, rest @ ..] => {
            if let Some(child) = map.get_mut(*head) {
                if remove_at(child, rest) {
                    map.shift_remove(*head);
                }
            }
        }
    }
    map.is_empty()
}

/// An insertion-ordered JSON tree whose root is always an object.
#[derive(Debug, Clone)]
pub struct Document {
    root: Value,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing value. The root must be an object (or null for empty).
    pub fn from_value(value: Value) -> Result<Self> {
        match prune(value) {
            None => Ok(Self::new()),
            Some(root @ Value::Object(_)) => Ok(Self { root }),
            Some(_) => Err(DeskError::Store(
                "Document root must be a JSON object".to_string(),
            )),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for seg in segments(path) {
            current = current.as_object()?.get(seg)?;
        }
        Some(current)
    }

    /// Replaces the value at `path`. Null or empty values delete the key.
    pub fn set(&mut self, path: &str, value: Value) {
        let segs = segments(path);
        match prune(value) {
            None => self.remove(path),
            Some(value) if segs.is_empty() => {
                if value.is_object() {
                    self.root = value;
                }
            }
            Some(value) => set_at(&mut self.root, &segs, value),
        }
    }

    /// Applies each field as a child write under `path`.
    pub fn merge(&mut self, path: &str, fields: Map<String, Value>) {
        for (key, value) in fields {
            self.set(&format!("{}/{}", path, key), value);
        }
    }

    pub fn remove(&mut self, path: &str) {
        let segs = segments(path);
        if segs.is_empty() {
            self.root = Value::Object(Map::new());
            return;
        }
        remove_at(&mut self.root, &segs);
    }
}

struct Subscription {
    path: Vec<String>,
    listener: Rc<RefCell<Listener>>,
}

/// One affected subscription, captured so listeners can be called without
/// holding the registry borrow.
pub struct Notice {
    pub handle: SubscriptionHandle,
    pub path: String,
    listener: Rc<RefCell<Listener>>,
}

impl Notice {
    /// Calls the listener unless it is already running further up the stack.
    pub fn deliver(&self, value: Option<&Value>) {
        if let Ok(mut listener) = self.listener.try_borrow_mut() {
            (*listener)(value);
        }
    }
}

/// Registry of listeners keyed by subscription handle.
#[derive(Default)]
pub struct Subscribers {
    next_id: Cell<u64>,
    entries: RefCell<BTreeMap<u64, Subscription>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, path: &str, listener: Listener) -> Notice {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let listener = Rc::new(RefCell::new(listener));
        self.entries.borrow_mut().insert(
            id,
            Subscription {
                path: segments(path).into_iter().map(str::to_string).collect(),
                listener: Rc::clone(&listener),
            },
        );
        Notice {
            handle: SubscriptionHandle(id),
            path: path.to_string(),
            listener,
        }
    }

    pub fn remove(&self, handle: SubscriptionHandle) -> bool {
        self.entries.borrow_mut().remove(&handle.0).is_some()
    }

    pub fn contains(&self, handle: SubscriptionHandle) -> bool {
        self.entries.borrow().contains_key(&handle.0)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Subscriptions whose key is `changed`, above it, or below it.
    pub fn affected(&self, changed: &str) -> Vec<Notice> {
        let changed = segments(changed);
        self.entries
            .borrow()
            .iter()
            .filter(|(_, sub)| {
                let shared = sub.path.len().min(changed.len());
                sub.path[..shared]
                    .iter()
                    .zip(&changed[..shared])
                    .all(|(a, b)| a.as_str() == *b)
            })
            .map(|(id, sub)| Notice {
                handle: SubscriptionHandle(*id),
                path: sub.path.join("/"),
                listener: Rc::clone(&sub.listener),
            })
            .collect()
    }

    /// Delivers the current value to every subscription affected by `changed`.
    pub fn notify(&self, document: &RefCell<Document>, changed: &str) {
        for notice in self.affected(changed) {
            // An earlier listener may have released this one.
            if !self.contains(notice.handle) {
                continue;
            }
            let value = document.borrow().get(&notice.path).cloned();
            notice.deliver(value.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_creates_intermediate_objects() {
        let mut doc = Document::new();
        doc.set("folders/a/children/b", json!({"name": "B"}));
        assert_eq!(doc.get("folders/a/children/b/name"), Some(&json!("B")));
    }

    #[test]
    fn null_write_deletes_and_prunes_empty_parents() {
        let mut doc = Document::new();
        doc.set("folders/a/children/b", json!({"name": "B"}));
        doc.set("folders/a/children/b", Value::Null);
        assert_eq!(doc.get("folders"), None);
        assert_eq!(doc.as_value(), &json!({}));
    }

    #[test]
    fn merge_removes_null_fields() {
        let mut doc = Document::new();
        doc.set("folders/a", json!({"name": "A", "locked": true, "password": "p"}));
        let mut fields = Map::new();
        fields.insert("locked".into(), json!(false));
        fields.insert("password".into(), Value::Null);
        doc.merge("folders/a", fields);
        assert_eq!(doc.get("folders/a"), Some(&json!({"name": "A", "locked": false})));
    }

    #[test]
    fn removal_keeps_sibling_order() {
        let mut doc = Document::new();
        doc.set("c/x", json!(1));
        doc.set("c/y", json!(2));
        doc.set("c/z", json!(3));
        doc.remove("c/x");
        let keys: Vec<_> = doc.get("c").unwrap().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["y", "z"]);
    }

    #[test]
    fn from_value_rejects_scalar_root() {
        assert!(Document::from_value(json!(3)).is_err());
        assert!(Document::from_value(Value::Null).is_ok());
    }

    #[test]
    fn affected_matches_ancestors_and_descendants() {
        let subs = Subscribers::new();
        let watch_folder = subs.add("folders/a", Box::new(|_| {})).handle;
        let watch_other = subs.add("notes/x", Box::new(|_| {})).handle;

        let hit: Vec<_> = subs
            .affected("folders/a/children/b")
            .iter()
            .map(|n| n.handle)
            .collect();
        assert_eq!(hit, vec![watch_folder]);

        let hit: Vec<_> = subs.affected("").iter().map(|n| n.handle).collect();
        assert_eq!(hit, vec![watch_folder, watch_other]);
    }
}
