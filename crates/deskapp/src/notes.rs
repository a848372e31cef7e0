//! # Notes and the File Index
//!
//! File nodes carry no content in the tree. Their content lives out of tree,
//! keyed by the file's id, in two containers:
//!
//! - `notes/<id>`: `{ content, lastEdited, fileName }`, the editor's document
//! - `files/<id>`: `{ fileName }`, a flat index that name search reads without
//!   walking the tree
//!
//! Both must follow the file node's lifecycle. The tree writes the index entry on
//! create and rename. Remove and move call [`purge`] and [`rekey`] here.

use crate::error::{DeskError, Result};
use crate::model::Note;
use crate::store::{join_key, Listener, SubscriptionHandle, TreeStore, FILES, NOTES};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// A file found through the name index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMatch {
    pub id: String,
    pub file_name: String,
}

fn note_key(id: &str) -> String {
    join_key(NOTES, id)
}

fn index_key(id: &str) -> String {
    join_key(FILES, id)
}

/// Writes or refreshes the index entry of a file.
pub fn index_file<S: TreeStore>(store: &S, id: &str, file_name: &str) -> Result<()> {
    let mut fields = Map::new();
    fields.insert("fileName".to_string(), json!(file_name));
    store.update(&index_key(id), fields)
}

/// Case-insensitive substring search over indexed file names, in index order.
pub fn search<S: TreeStore>(store: &S, keyword: &str) -> Result<Vec<FileMatch>> {
    let needle = keyword.to_lowercase();
    let Some(Value::Object(index)) = store.read(FILES)? else {
        return Ok(Vec::new());
    };
    Ok(index
        .iter()
        .filter_map(|(id, entry)| {
            let name = entry.get("fileName")?.as_str()?;
            name.to_lowercase().contains(&needle).then(|| FileMatch {
                id: id.clone(),
                file_name: name.to_string(),
            })
        })
        .collect())
}

/// Deletes the note and index entry of a removed file.
pub fn purge<S: TreeStore>(store: &S, id: &str) -> Result<()> {
    store.delete(&note_key(id))?;
    store.delete(&index_key(id))
}

/// Moves the note and index entry of a file that was given a new id.
pub fn rekey<S: TreeStore>(store: &S, old_id: &str, new_id: &str) -> Result<()> {
    for (old, new) in [
        (note_key(old_id), note_key(new_id)),
        (index_key(old_id), index_key(new_id)),
    ] {
        if let Some(value) = store.read(&old)? {
            store.write(&new, value)?;
            store.delete(&old)?;
        }
    }
    Ok(())
}

/// Read and save access to the notes of file nodes.
pub struct NoteStore<'a, S: TreeStore> {
    store: &'a S,
}

impl<'a, S: TreeStore> NoteStore<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn read(&self, file_id: &str) -> Result<Option<Note>> {
        match self.store.read(&note_key(file_id))? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Saves content and title. The file must be indexed, that is, it must exist.
    pub fn save(&self, file_id: &str, file_name: &str, content: &str) -> Result<Note> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(DeskError::Validation(
                "Note title cannot be empty".to_string(),
            ));
        }
        if self.store.read(&index_key(file_id))?.is_none() {
            return Err(DeskError::NotFound(format!("File not found: {}", file_id)));
        }

        let note = Note {
            content: content.to_string(),
            last_edited: Some(Utc::now().timestamp_millis()),
            file_name: Some(file_name.to_string()),
        };
        let fields = match serde_json::to_value(&note)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        self.store.update(&note_key(file_id), fields)?;
        index_file(self.store, file_id, file_name)?;
        tracing::info!(file = file_id, "saved note");
        Ok(note)
    }

    /// Subscribes to a note. The returned view must be released by its owner.
    pub fn watch(&self, file_id: &str) -> Result<LiveNote> {
        let current = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&current);
        let id = file_id.to_string();
        let listener: Listener = Box::new(move |value| {
            *sink.borrow_mut() = match value {
                Some(value) => match serde_json::from_value::<Note>(value.clone()) {
                    Ok(note) => Some(note),
                    Err(e) => {
                        tracing::warn!(file = %id, error = %e, "ignoring malformed note");
                        None
                    }
                },
                None => None,
            };
        });
        let handle = self.store.subscribe(&note_key(file_id), listener)?;
        Ok(LiveNote { handle, current })
    }
}

/// A note kept current by a store subscription.
pub struct LiveNote {
    handle: SubscriptionHandle,
    current: Rc<RefCell<Option<Note>>>,
}

impl LiveNote {
    pub fn current(&self) -> Option<Note> {
        self.current.borrow().clone()
    }

    pub fn release<S: TreeStore>(self, store: &S) {
        store.unsubscribe(self.handle);
    }
}
