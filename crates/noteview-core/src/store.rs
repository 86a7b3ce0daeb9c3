//! Note store capability interface
//!
//! The engine depends on the host's note store only through this trait:
//! read-only search and snapshot listings, plus one write to hand back a
//! rebuilt note body. Implementations wrap a real backend;
//! [`crate::MemoryStore`] provides an in-memory one for tests.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Note, Notebook, Tag};

/// Read/write capabilities the overview engine needs from a note store
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Run a filter-expression search and return the matching notes
    async fn search(&self, query: &str) -> Result<Vec<Note>, StoreError>;

    /// Snapshot of all notebooks
    async fn list_notebooks(&self) -> Result<Vec<Notebook>, StoreError>;

    /// Snapshot of all tags
    async fn list_tags(&self) -> Result<Vec<Tag>, StoreError>;

    /// Tags attached to the given note
    async fn tags_for_note(&self, note_id: &str) -> Result<Vec<Tag>, StoreError>;

    /// Fetch a single note by id
    async fn get_note(&self, note_id: &str) -> Result<Option<Note>, StoreError>;

    /// Replace a note's body
    async fn set_note_body(&self, note_id: &str, body: &str) -> Result<(), StoreError>;
}
