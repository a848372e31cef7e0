use super::document::{Document, Subscribers};
use super::{fresh_key, Listener, SubscriptionHandle, TreeStore};
use crate::error::{DeskError, Result};
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};

/// In-memory tree store.
///
/// Uses `RefCell` for interior mutability since desk is single-threaded.
pub struct MemTreeStore {
    document: RefCell<Document>,
    subscribers: Subscribers,
    simulate_write_error: Cell<bool>,
}

impl Default for MemTreeStore {
    fn default() -> Self {
        Self {
            document: RefCell::new(Document::new()),
            subscribers: Subscribers::new(),
            simulate_write_error: Cell::new(false),
        }
    }
}

impl MemTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let store = Self::new();
        *store.document.borrow_mut() = Document::from_value(value)?;
        Ok(store)
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Copy of the whole document.
    pub fn snapshot(&self) -> Value {
        self.document.borrow().as_value().clone()
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscribers.len()
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(DeskError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }

    fn mutate(&self, path: &str, apply: impl FnOnce(&mut Document)) -> Result<()> {
        self.check_writable()?;
        apply(&mut self.document.borrow_mut());
        self.subscribers.notify(&self.document, path);
        Ok(())
    }
}

impl TreeStore for MemTreeStore {
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
        self.check_writable()?;
        Ok(fresh_key())
    }
}
