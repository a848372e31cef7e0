//! # API Facade
//!
//! The API layer is a **thin facade** over the components. It is the single entry
//! point for desk operations, whatever the client.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Holds the session**: the store, the identity provider, and the folder the
//!   client is in ([`Navigator`])
//! - **Resolves names**: operations address children of the current folder by name
//! - **Attributes**: the signed-in user's display name, or `Anonymous`, is passed
//!   to commands as the actor for the activity log
//! - **Dispatches** to `commands/*.rs` and the read-side components
//!
//! Business rules live in the components and commands. The API holds none.
//!
//! ## Generic Over Store and Identity
//!
//! `DeskApi<S: TreeStore, I: IdentityProvider>`:
//! - Production: `DeskApi<FileTreeStore, LocalIdentity>`
//! - Testing: `DeskApi<MemTreeStore, LocalIdentity>`
//!
//! ## Names and Duplicates
//!
//! Siblings may share a name. Name lookups take the first child in listing order.

use crate::activity::{Action, ActivityLog, LogPage};
use crate::commands::{self, CmdResult};
use crate::error::{DeskError, Result};
use crate::identity::{self, IdentityProvider, User};
use crate::model::{Node, NodeKind, Note};
use crate::navigation::{EnterOutcome, Navigator};
use crate::notes::{self, FileMatch, LiveNote, NoteStore};
use crate::path::{self, NodePath};
use crate::store::TreeStore;
use crate::terminal::{Terminal, TerminalOutput};
use crate::tree::{FileEntry, FolderMap, FolderTree, LiveListing};

/// The main API facade for desk operations.
pub struct DeskApi<S: TreeStore, I: IdentityProvider> {
    store: S,
    identity: I,
    navigator: Navigator,
}

impl<S: TreeStore, I: IdentityProvider> DeskApi<S, I> {
    pub fn new(store: S, identity: I) -> Self {
        Self {
            store,
            identity,
            navigator: Navigator::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// Name recorded in the activity log for actions taken now.
    pub fn actor(&self) -> String {
        identity::attribution(self.identity.current_user().as_ref())
    }

    pub fn current_path(&self) -> &NodePath {
        self.navigator.current()
    }

    pub fn display_path(&self) -> Result<String> {
        self.navigator.display_path(&self.store)
    }

    pub fn breadcrumbs(&self) -> Result<Vec<String>> {
        self.navigator.breadcrumbs(&self.store)
    }

    // --- navigation ---

    pub fn enter(&mut self, name: &str, password: Option<&str>) -> Result<EnterOutcome> {
        let node = self.child_named(name)?;
        self.navigator.enter(&node, password)
    }

    /// Walks to a folder by display path, absolute or relative to the current one.
    ///
    /// Every locked folder on the way is challenged with `password`. When one needs
    /// a password that was not given, the walk stops and the current folder stays.
    pub fn navigate(&mut self, target: &str, password: Option<&str>) -> Result<EnterOutcome> {
        let mut nav = if path::is_absolute(target) {
            Navigator::new()
        } else {
            self.navigator.clone()
        };
        let tree = FolderTree::new(&self.store);
        for segment in path::display_segments(target) {
            let node = tree
                .children(nav.current())?
                .into_iter()
                .find(|n| n.is_folder() && n.name == segment)
                .ok_or_else(|| DeskError::NotFound(format!("Folder not found: {}", segment)))?;
            if let outcome @ EnterOutcome::ChallengeRequired { .. } = nav.enter(&node, password)? {
                return Ok(outcome);
            }
        }
        self.navigator = nav;
        Ok(EnterOutcome::Entered)
    }

    pub fn back(&mut self) -> bool {
        self.navigator.back()
    }

    pub fn home(&mut self) {
        self.navigator.reset();
    }

    // --- reads ---

    pub fn list(&self) -> Result<CmdResult> {
        commands::list::run(&self.store, self.navigator.current())
    }

    /// Live listing of the current folder. Release it with [`DeskApi::release`].
    pub fn watch(&self) -> Result<LiveListing> {
        FolderTree::new(&self.store).list_children(self.navigator.current())
    }

    pub fn release(&self, listing: LiveListing) {
        listing.release(&self.store);
    }

    pub fn tree(&self) -> Result<FolderMap> {
        FolderTree::new(&self.store).load_whole_tree()
    }

    pub fn files(&self) -> Result<Vec<FileEntry>> {
        FolderTree::new(&self.store).all_files()
    }

    pub fn find_files(&self, keyword: &str) -> Result<Vec<FileMatch>> {
        notes::search(&self.store, keyword)
    }

    pub fn read_note(&self, name: &str) -> Result<Option<Note>> {
        let file = self.file_named(name)?;
        NoteStore::new(&self.store).read(&file.id)
    }

    pub fn watch_note(&self, name: &str) -> Result<LiveNote> {
        let file = self.file_named(name)?;
        NoteStore::new(&self.store).watch(&file.id)
    }

    // --- mutations ---

    pub fn create_folder(&mut self, name: &str) -> Result<CmdResult> {
        let actor = self.actor();
        commands::create::run(
            &self.store,
            &actor,
            self.navigator.current(),
            name,
            NodeKind::Folder,
        )
    }

    pub fn create_file(&mut self, name: &str) -> Result<CmdResult> {
        let actor = self.actor();
        commands::create::run(
            &self.store,
            &actor,
            self.navigator.current(),
            name,
            NodeKind::File,
        )
    }

    pub fn rename(
        &mut self,
        name: &str,
        new_name: &str,
        password: Option<&str>,
    ) -> Result<CmdResult> {
        let path = self.child_path(name)?;
        commands::rename::run(&self.store, &self.actor(), &path, new_name, password)
    }

    pub fn delete(&mut self, name: &str, password: Option<&str>) -> Result<CmdResult> {
        let path = self.child_path(name)?;
        commands::delete::run(&self.store, &self.actor(), &path, password)
    }

    pub fn move_to(
        &mut self,
        name: &str,
        destination: &str,
        password: Option<&str>,
    ) -> Result<CmdResult> {
        let path = self.child_path(name)?;
        commands::move_node::run(&self.store, &self.actor(), &path, destination, password)
    }

    pub fn lock(&mut self, name: &str, password: &str) -> Result<CmdResult> {
        let path = self.child_path(name)?;
        commands::locking::lock(&self.store, &self.actor(), &path, password)
    }

    /// Unlocks a child folder and enters it.
    pub fn unlock(&mut self, name: &str, password: &str) -> Result<CmdResult> {
        let path = self.child_path(name)?;
        let result = commands::locking::unlock(&self.store, &self.actor(), &path, password)?;
        if let Some(node) = result.affected_nodes.first() {
            self.navigator.enter(node, None)?;
        }
        Ok(result)
    }

    /// Saves the note of a file. A title other than the file's name renames it.
    pub fn save_note(&mut self, name: &str, title: &str, content: &str) -> Result<CmdResult> {
        let path = self.child_path(name)?;
        commands::note::save(&self.store, &self.actor(), &path, title, content)
    }

    pub fn terminal(&self, line: &str) -> Result<TerminalOutput> {
        Terminal::new(&self.store, self.actor()).run(line)
    }

    // --- activity and identity ---

    pub fn recent_logs(&self, limit: usize) -> Result<LogPage> {
        ActivityLog::new(&self.store).recent(limit)
    }

    pub fn logs_before(&self, timestamp: i64, limit: usize) -> Result<LogPage> {
        ActivityLog::new(&self.store).before(timestamp, limit)
    }

    pub fn sign_in(&mut self, display_name: &str, email: Option<&str>) -> Result<User> {
        let user = self.identity.sign_in(display_name, email)?;
        let target = user.email.as_deref().unwrap_or(&user.display_name);
        ActivityLog::new(&self.store).record(&user.display_name, Action::Login, target, None)?;
        Ok(user)
    }

    pub fn sign_out(&mut self) -> Result<Option<User>> {
        let previous = self.identity.sign_out()?;
        if let Some(user) = &previous {
            let target = user.email.as_deref().unwrap_or(&user.display_name);
            ActivityLog::new(&self.store).record(
                &user.display_name,
                Action::Logout,
                target,
                None,
            )?;
        }
        Ok(previous)
    }

    // --- helpers ---

    fn child_named(&self, name: &str) -> Result<Node> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DeskError::Validation("Name cannot be empty".to_string()));
        }
        FolderTree::new(&self.store)
            .children(self.navigator.current())?
            .into_iter()
            .find(|n| n.name == name)
            .ok_or_else(|| DeskError::NotFound(format!("Item not found: {}", name)))
    }

    fn child_path(&self, name: &str) -> Result<NodePath> {
        let node = self.child_named(name)?;
        Ok(self.navigator.current().child(node.id))
    }

    fn file_named(&self, name: &str) -> Result<Node> {
        let node = self.child_named(name)?;
        if !node.is_file() {
            return Err(DeskError::Validation(format!("{} is not a file", node.name)));
        }
        Ok(node)
    }
}
