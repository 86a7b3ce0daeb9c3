//! Data models for noteview
//!
//! Defines the note-store snapshot types (Note, Notebook, Tag) and the
//! Group type derived from them during overview generation. The note store
//! owns all of this data; the engine only reads per-pass snapshots.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Separator used when joining notebook titles into a breadcrumb path
pub const BREADCRUMB_SEPARATOR: &str = " > ";

/// A note as read from the note store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    /// Store-assigned identifier
    pub id: String,
    /// Note title
    pub title: String,
    /// Note body content
    pub body: String,
    /// Whether this note is a todo
    pub is_todo: bool,
    /// Id of the notebook containing this note
    pub parent_id: String,
    /// When this note was created
    pub created_time: DateTime<Utc>,
    /// When this note was last updated
    pub updated_time: DateTime<Utc>,
    /// Due date, for todos
    pub todo_due: Option<DateTime<Utc>>,
    /// Completion time, for finished todos
    pub todo_completed: Option<DateTime<Utc>>,
}

impl Note {
    /// Create a new note in the given notebook
    pub fn new(id: impl Into<String>, title: impl Into<String>, parent_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            body: String::new(),
            is_todo: false,
            parent_id: parent_id.into(),
            created_time: now,
            updated_time: now,
            todo_due: None,
            todo_completed: None,
        }
    }

    /// Replace the body content
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
        self.updated_time = Utc::now();
    }

    /// Mark this note as a todo
    pub fn set_todo(&mut self, is_todo: bool) {
        self.is_todo = is_todo;
        self.updated_time = Utc::now();
    }

    /// Set the due date (implies todo)
    pub fn set_due(&mut self, due: DateTime<Utc>) {
        self.is_todo = true;
        self.todo_due = Some(due);
        self.updated_time = Utc::now();
    }

    /// Mark the todo as completed at the given time
    pub fn set_completed(&mut self, at: DateTime<Utc>) {
        self.todo_completed = Some(at);
        self.updated_time = Utc::now();
    }
}

/// A notebook in the store's notebook tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notebook {
    /// Store-assigned identifier
    pub id: String,
    /// Notebook title
    pub title: String,
    /// Parent notebook, absent for roots
    pub parent_id: Option<String>,
}

impl Notebook {
    /// Create a root notebook
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            parent_id: None,
        }
    }

    /// Create a notebook under the given parent
    pub fn child_of(
        id: impl Into<String>,
        title: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            parent_id: Some(parent_id.into()),
        }
    }
}

/// A tag label; notes reference tags many-to-many via the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Store-assigned identifier
    pub id: String,
    /// Tag title
    pub title: String,
}

impl Tag {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Snapshot of the notebook tree, indexed for title and breadcrumb lookups
///
/// Built once per overview pass from `NoteStore::list_notebooks` and
/// discarded afterwards; the underlying store may change between passes.
#[derive(Debug, Clone, Default)]
pub struct NotebookTree {
    by_id: HashMap<String, Notebook>,
}

impl NotebookTree {
    /// Build the index from a store snapshot
    pub fn new(notebooks: Vec<Notebook>) -> Self {
        let by_id = notebooks.into_iter().map(|nb| (nb.id.clone(), nb)).collect();
        Self { by_id }
    }

    /// Look up a notebook by id
    pub fn get(&self, id: &str) -> Option<&Notebook> {
        self.by_id.get(id)
    }

    /// Title of the notebook with the given id, if it exists
    pub fn title_of(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(|nb| nb.title.as_str())
    }

    /// Root-to-leaf title path for the notebook with the given id
    ///
    /// Returns `None` for unknown ids. Cycles in parent links terminate
    /// the walk rather than looping.
    pub fn breadcrumb_of(&self, id: &str) -> Option<String> {
        let mut titles = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.by_id.get(id)?;
        loop {
            if !seen.insert(current.id.clone()) {
                break;
            }
            titles.push(current.title.clone());
            match current.parent_id.as_deref().and_then(|pid| self.by_id.get(pid)) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        titles.reverse();
        Some(titles.join(BREADCRUMB_SEPARATOR))
    }
}

/// One partition of an overview's matches
///
/// `filter` is the query-language fragment that selects exactly this
/// group; `query` is the base search with the fragment appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Human-readable group key (notebook title, breadcrumb, or tag list)
    pub label: String,
    /// Filter clause appended to the base search for this group
    pub filter: String,
    /// Full augmented query used to fetch this group's notes
    pub query: String,
}
