use super::document::{Document, Subscribers};
use super::{fresh_key, Listener, SubscriptionHandle, TreeStore};
use crate::error::Result;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// Tree store persisted as a single JSON file.
///
/// The document is loaded once on open and rewritten after every mutation.
/// Subscriptions are in-process only: another process writing the same file is
/// not observed.
pub struct FileTreeStore {
    path: PathBuf,
    document: RefCell<Document>,
    subscribers: Subscribers,
}

impl FileTreeStore {
    /// Opens the store at `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                Document::new()
            } else {
                Document::from_value(serde_json::from_str(&raw)?)?
            }
        } else {
            Document::new()
        };
        tracing::debug!(path = %path.display(), "opened tree store");
        Ok(Self {
            path,
            document: RefCell::new(document),
            subscribers: Subscribers::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes to a sibling temp file and renames it over the store file.
    fn persist(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string_pretty(document.as_value())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Applies a change to a copy and keeps it only once it is on disk.
    fn mutate(&self, path: &str, apply: impl FnOnce(&mut Document)) -> Result<()> {
        let mut next = self.document.borrow().clone();
        apply(&mut next);
        self.persist(&next)?;
        *self.document.borrow_mut() = next;
        tracing::debug!(key = path, "persisted tree store");
        self.subscribers.notify(&self.document, path);
        Ok(())
    }
}

impl TreeStore for FileTreeStore {
    fn read(&self, path: &str) -> Result<Option<Value>> {
        Ok(self.document.borrow().get(path).cloned())
    }

    fn subscribe(&self, path: &str, listener: Listener) -> Result<SubscriptionHandle> {
        let notice = self.subscribers.add(path, listener);
        let value = self.document.borrow().get(path).cloned();
        notice.deliver(value.as_ref());
        Ok(notice.handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.subscribers.remove(handle);
    }

    fn write(&self, path: &str, value: Value) -> Result<()> {
        self.mutate(path, |doc| doc.set(path, value))
    }

    fn update(&self, path: &str, fields: Map<String, Value>) -> Result<()> {
        self.mutate(path, |doc| doc.merge(path, fields))
    }

    fn delete(&self, path: &str) -> Result<()> {
        self.mutate(path, |doc| doc.remove(path))
    }

    fn push_key(&self, _parent_path: &str) -> Result<String> {
        Ok(fresh_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn opens_missing_file_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileTreeStore::open(dir.path().join("desk.json")).unwrap();
        assert_eq!(store.read("folders").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn mutations_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("desk.json");

        let store = FileTreeStore::open(&path).unwrap();
        store.write("folders/a", json!({"name": "A", "type": "folder"})).unwrap();
        store.write("folders/b", json!({"name": "B", "type": "file"})).unwrap();
        store.delete("folders/b").unwrap();
        drop(store);

        let reopened = FileTreeStore::open(&path).unwrap();
        assert_eq!(
            reopened.read("folders").unwrap(),
            Some(json!({"a": {"name": "A", "type": "folder"}}))
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("desk.json");
        let store = FileTreeStore::open(&path).unwrap();
        store.write("folders/a", json!({"name": "A", "type": "folder"})).unwrap();

        // A directory in place of the file makes the rename fail.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(store.write("folders/b", json!({"name": "B", "type": "file"})).is_err());
        assert!(store.delete("folders/a").is_err());
        assert_eq!(
            store.read("folders").unwrap(),
            Some(json!({"a": {"name": "A", "type": "folder"}}))
        );
    }

    #[test]
    fn rejects_non_object_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("desk.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(FileTreeStore::open(&path).is_err());
    }
}
