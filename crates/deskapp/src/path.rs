//! # Paths
//!
//! Two addressing schemes coexist:
//!
//! - **Node paths** ([`NodePath`]): the ids from the root to a node. They address a
//!   record in the store by interleaving a `children` container between ids:
//!
//!   ```text
//!   [a, b, c]  ->  folders/a/children/b/children/c
//!   []         ->  folders
//!   ```
//!
//! - **Display paths**: the names along the same route, rendered as `/Root/A/B`.
//!   These are what users type (move destinations, terminal arguments).
//!
//! Display paths are normalized leniently: a leading `root` token in any case becomes
//! `/Root`, and empty segments are dropped when splitting. Nothing is rejected here.

use crate::store::FOLDERS;
use serde::Serialize;
use std::fmt;

/// Token that stands for the workspace root in display paths.
pub const ROOT_TOKEN: &str = "Root";

/// Sub-key under which a folder keeps its children.
pub const CHILDREN: &str = "children";

/// Addresses a node by the ids leading to it from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodePath(Vec<String>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last_id(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn child(&self, id: impl Into<String>) -> Self {
        let mut ids = self.0.clone();
        ids.push(id.into());
        Self(ids)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Drops the last id in place. Returns false at the root.
    pub fn pop(&mut self) -> bool {
        self.0.pop().is_some()
    }

    /// Store key of the node itself.
    pub fn store_key(&self) -> String {
        to_store_key(&self.0)
    }

    /// Store key of the container holding this node's children.
    pub fn children_key(&self) -> String {
        if self.is_root() {
            FOLDERS.to_string()
        } else {
            format!("{}/{}", self.store_key(), CHILDREN)
        }
    }

    /// Ids joined with `/`, the form used for ancestry comparisons.
    pub fn joined(&self) -> String {
        self.0.join("/")
    }

    /// True when `other` is this path or lies somewhere beneath it.
    ///
    /// Compared on the id-joined strings, with a trailing separator so that `ab`
    /// is not mistaken for a child of `a`.
    pub fn is_self_or_ancestor_of(&self, other: &NodePath) -> bool {
        let mine = self.joined();
        let theirs = other.joined();
        theirs == mine || theirs.starts_with(&format!("{}/", mine))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.store_key())
    }
}

/// Joins ids into a store key under the folder container.
pub fn to_store_key<S: AsRef<str>>(ids: &[S]) -> String {
    let mut key = FOLDERS.to_string();
    for (idx, id) in ids.iter().enumerate() {
        if idx > 0 {
            key.push('/');
            key.push_str(CHILDREN);
        }
        key.push('/');
        key.push_str(id.as_ref());
    }
    key
}

/// Renders names as `/Root/Name1/Name2`.
pub fn to_display_path<S: AsRef<str>>(names: &[S]) -> String {
    let mut out = format!("/{}", ROOT_TOKEN);
    for name in names {
        out.push('/');
        out.push_str(name.as_ref());
    }
    out
}

/// Rewrites a leading `root` token (any case, optional leading slash) to `/Root`.
///
/// Anything else is returned trimmed but otherwise untouched.
pub fn normalize(user_path: &str) -> String {
    let trimmed = user_path.trim();
    let body = trimmed.strip_prefix('/').unwrap_or(trimmed);

    if let Some(head) = body.get(..ROOT_TOKEN.len()) {
        if head.eq_ignore_ascii_case(ROOT_TOKEN) {
            let rest = &body[ROOT_TOKEN.len()..];
            if rest.is_empty() || rest.starts_with('/') {
                return format!("/{}{}", ROOT_TOKEN, rest);
            }
        }
    }
    trimmed.to_string()
}

/// Name segments below the root, with empty segments dropped.
///
/// `"root//Docs/"` and `"/Root/Docs"` both yield `["Docs"]`. A path without a
/// root token is taken as relative to the root.
pub fn display_segments(user_path: &str) -> Vec<String> {
    let normalized = normalize(user_path);
    let root = format!("/{}", ROOT_TOKEN);
    let rest = if normalized == root {
        ""
    } else if let Some(rest) = normalized.strip_prefix(&format!("{}/", root)) {
        rest
    } else {
        normalized.as_str()
    };
    rest.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when the user path starts at the root rather than the current folder.
pub fn is_absolute(user_path: &str) -> bool {
    let normalized = normalize(user_path);
    let root = format!("/{}", ROOT_TOKEN);
    normalized == root || normalized.starts_with(&format!("{}/", root))
}

/// Splits a path into its parent path and last name. `None` for the root itself.
pub fn split_target(user_path: &str) -> Option<(String, String)> {
    let mut segments = display_segments(user_path);
    let name = segments.pop()?;
    let parent = if is_absolute(user_path) {
        to_display_path(&segments)
    } else {
        segments.join("/")
    };
    Some((parent, name))
}

/// Canonical display form of whatever the user typed.
pub fn canonical_display(user_path: &str) -> String {
    to_display_path(&display_segments(user_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_key_interleaves_children() {
        assert_eq!(to_store_key::<&str>(&[]), "folders");
        assert_eq!(to_store_key(&["a"]), "folders/a");
        assert_eq!(to_store_key(&["a", "b", "c"]), "folders/a/children/b/children/c");
    }

    #[test]
    fn children_key_of_root_is_folder_container() {
        assert_eq!(NodePath::root().children_key(), "folders");
        assert_eq!(
            NodePath::from_ids(["a", "b"]).children_key(),
            "folders/a/children/b/children"
        );
    }

    #[test]
    fn display_path_prefixes_root() {
        assert_eq!(to_display_path::<&str>(&[]), "/Root");
        assert_eq!(to_display_path(&["Docs", "2024"]), "/Root/Docs/2024");
    }

    #[test]
    fn normalize_rewrites_root_token_case() {
        assert_eq!(normalize("/root/Docs"), "/Root/Docs");
        assert_eq!(normalize("ROOT/Docs"), "/Root/Docs");
        assert_eq!(normalize("root"), "/Root");
        assert_eq!(normalize("  /Root/Docs "), "/Root/Docs");
    }

    #[test]
    fn normalize_leaves_other_paths_alone() {
        assert_eq!(normalize("/Rooted/Docs"), "/Rooted/Docs");
        assert_eq!(normalize("Docs/a"), "Docs/a");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn display_segments_drop_empty_parts() {
        assert_eq!(display_segments("/Root"), Vec::<String>::new());
        assert_eq!(display_segments("root//Docs/"), vec!["Docs"]);
        assert_eq!(display_segments("Docs/Work"), vec!["Docs", "Work"]);
        assert_eq!(canonical_display("/root/Docs//Work"), "/Root/Docs/Work");
    }

    #[test]
    fn split_target_keeps_absoluteness() {
        assert_eq!(
            split_target("/Root/Docs/a.txt"),
            Some(("/Root/Docs".to_string(), "a.txt".to_string()))
        );
        assert_eq!(
            split_target("root/Docs"),
            Some(("/Root".to_string(), "Docs".to_string()))
        );
        assert_eq!(
            split_target("Docs/a.txt"),
            Some(("Docs".to_string(), "a.txt".to_string()))
        );
        assert_eq!(split_target("a.txt"), Some((String::new(), "a.txt".to_string())));
        assert_eq!(split_target("/Root"), None);
        assert!(is_absolute("/root"));
        assert!(!is_absolute("Rooted"));
    }

    #[test]
    fn ancestry_check_uses_separator_boundary() {
        let a = NodePath::from_ids(["a"]);
        let ab = NodePath::from_ids(["ab"]);
        let a_child = NodePath::from_ids(["a", "x"]);

        assert!(a.is_self_or_ancestor_of(&a));
        assert!(a.is_self_or_ancestor_of(&a_child));
        assert!(!a.is_self_or_ancestor_of(&ab));
        assert!(!a_child.is_self_or_ancestor_of(&a));
    }

    #[test]
    fn parent_and_pop() {
        let mut path = NodePath::from_ids(["a", "b"]);
        assert_eq!(path.parent(), Some(NodePath::from_ids(["a"])));
        assert!(path.pop());
        assert!(path.pop());
        assert!(!path.pop());
        assert_eq!(NodePath::root().parent(), None);
    }
}
