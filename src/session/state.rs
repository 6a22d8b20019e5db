//! Navigation and visibility state owned by the caller.

use std::collections::HashSet;
use std::fmt;

use crate::fs::entry::{Entry, format_file_size};

/// Current position in the flat object namespace.
///
/// Always empty (root) or ending in `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DirectoryPrefix(String);

impl DirectoryPrefix {
    /// The root prefix.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Normalize `path` into a prefix.
    ///
    /// Leading slashes and doubled slashes are dropped, a trailing slash is added.
    pub fn new(path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Self::root();
        }
        Self(format!("{}/", segments.join("/")))
    }

    /// Prefix of a folder key taken verbatim, such as a listing entry's name.
    pub fn from_key(key: &str) -> Self {
        Self::new(key)
    }

    /// Prefix that contains `key` (a file key or a folder key).
    pub fn parent_of(key: &str) -> Self {
        let trimmed = key.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) => Self::new(&trimmed[..idx]),
            None => Self::root(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Append `name` to this prefix.
    ///
    /// `name` is always relative; use [`DirectoryPrefix::from_key`] for full keys.
    pub fn join(&self, name: &str) -> String {
        format!("{}{}", self.0, name.trim_start_matches('/'))
    }

    /// Prefix of a child folder named `folder`.
    pub fn child(&self, folder: &str) -> Self {
        Self::new(&self.join(folder))
    }

    /// Prefix with the last segment removed. The root is its own parent.
    pub fn parent(&self) -> Self {
        Self::parent_of(&self.0)
    }

    /// Path segments from the root, for breadcrumbs.
    pub fn segments(&self) -> Vec<&str> {
        self.0.split('/').filter(|s| !s.is_empty()).collect()
    }
}

impl fmt::Display for DirectoryPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DirectoryPrefix {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// One row of a rendered listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry<'a> {
    pub entry: &'a Entry,
    /// Display name (last segment)
    pub label: &'a str,
    /// Formatted size for files
    pub detail: Option<String>,
    /// Hidden item shown because hidden items are revealed
    pub dimmed: bool,
}

/// Session-only view state: current prefix and locally hidden names.
///
/// Nothing here is sent to the backend.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    prefix: DirectoryPrefix,
    hidden: HashSet<String>,
    show_hidden: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(&self) -> &DirectoryPrefix {
        &self.prefix
    }

    pub fn set_prefix(&mut self, prefix: DirectoryPrefix) {
        self.prefix = prefix;
    }

    /// Descend into the child folder named `folder`.
    pub fn navigate_into(&mut self, folder: &str) -> &DirectoryPrefix {
        self.prefix = self.prefix.child(folder);
        &self.prefix
    }

    /// Enter a folder entry from a listing, whose name is its full key.
    ///
    /// Returns `None` for files.
    pub fn enter(&mut self, entry: &Entry) -> Option<&DirectoryPrefix> {
        if !entry.is_folder() {
            return None;
        }
        self.prefix = DirectoryPrefix::from_key(entry.name());
        Some(&self.prefix)
    }

    /// Go up one level.
    pub fn navigate_up(&mut self) -> &DirectoryPrefix {
        self.prefix = self.prefix.parent();
        &self.prefix
    }

    /// Full key of `name` under the current prefix.
    pub fn resolve(&self, name: &str) -> String {
        self.prefix.join(name)
    }

    /// Flip the hidden flag of `name`. Returns whether it is now hidden.
    pub fn toggle_hidden(&mut self, name: &str) -> bool {
        if self.hidden.remove(name) {
            false
        } else {
            self.hidden.insert(name.to_string());
            true
        }
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden.contains(name)
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    /// Reveal hidden items (dimmed) or filter them out.
    pub fn set_show_hidden(&mut self, show: bool) {
        self.show_hidden = show;
    }

    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    /// Apply the visibility filter and compute labels.
    pub fn render<'a>(&self, entries: &'a [Entry]) -> Vec<ListedEntry<'a>> {
        entries
            .iter()
            .filter_map(|entry| {
                let hidden = self.is_hidden(entry.name());
                if hidden && !self.show_hidden {
                    return None;
                }
                Some(ListedEntry {
                    entry,
                    label: entry.display_name(),
                    detail: entry.size().map(format_file_size),
                    dimmed: hidden,
                })
            })
            .collect()
    }
}
