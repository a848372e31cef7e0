use crate::activity::{Action, ActivityLog};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{DeskError, Result};
use crate::notes::NoteStore;
use crate::path::NodePath;
use crate::store::TreeStore;
use crate::tree::FolderTree;

/// Saves the note of the file at `path`. The title is also the file's name, so a
/// new title renames the node.
pub fn save<S: TreeStore>(
    store: &S,
    actor: &str,
    path: &NodePath,
    title: &str,
    content: &str,
) -> Result<CmdResult> {
    let tree = FolderTree::new(store);
    let file = tree.node(path)?;
    if !file.is_file() {
        return Err(DeskError::Validation(format!("{} is not a file", file.name)));
    }

    let note = NoteStore::new(store).save(&file.id, title, content)?;
    let title = note.file_name.unwrap_or_default();
    if title != file.name {
        tree.rename(path, &title)?;
    }
    ActivityLog::new(store).record(actor, Action::SaveNote, &title, None)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Saved {}", title)));
    Ok(result.with_affected_nodes(vec![tree.node(path)?]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create;
    use crate::model::NodeKind;
    use crate::notes;
    use crate::store::memory::MemTreeStore;

    fn file(store: &MemTreeStore, name: &str) -> NodePath {
        let created = create::run(store, "u", &NodePath::root(), name, NodeKind::File).unwrap();
        NodePath::root().child(created.affected_nodes[0].id.clone())
    }

    #[test]
    fn save_updates_note_and_logs() {
        let store = MemTreeStore::new();
        let path = file(&store, "a.txt");

        let result = save(&store, "Ada", &path, "a.txt", "<p>x</p>").unwrap();
        assert_eq!(result.messages[0].content, "Saved a.txt");
        let id = path.last_id().unwrap();
        let note = NoteStore::new(&store).read(id).unwrap().unwrap();
        assert_eq!(note.content, "<p>x</p>");
        let page = ActivityLog::new(&store).recent(10).unwrap();
        assert!(page.entries.iter().any(|e| e.action == "Save note" && e.user == "Ada"));
    }

    #[test]
    fn new_title_renames_the_file_for_find() {
        let store = MemTreeStore::new();
        let path = file(&store, "a.txt");

        let result = save(&store, "u", &path, "Plan", "body").unwrap();
        assert_eq!(result.affected_nodes[0].name, "Plan");

        let tree = FolderTree::new(&store);
        let names: Vec<_> = tree.all_files().unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Plan"]);
        assert_eq!(notes::search(&store, "plan").unwrap().len(), 1);
        assert!(notes::search(&store, "a.txt").unwrap().is_empty());
    }

    #[test]
    fn unknown_file_and_folders_are_rejected() {
        let store = MemTreeStore::new();
        assert!(matches!(
            save(&store, "u", &NodePath::root().child("nope"), "t", "c"),
            Err(DeskError::NotFound(_))
        ));

        let created =
            create::run(&store, "u", &NodePath::root(), "Docs", NodeKind::Folder).unwrap();
        let docs = NodePath::root().child(created.affected_nodes[0].id.clone());
        assert!(matches!(
            save(&store, "u", &docs, "t", "c"),
            Err(DeskError::Validation(_))
        ));
    }
}
