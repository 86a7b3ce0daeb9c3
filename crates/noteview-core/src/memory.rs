//! In-memory note store
//!
//! A [`NoteStore`] backed by plain maps, with a small conjunctive query
//! evaluator covering the clauses the engine emits: a quoted body literal
//! (`/"..."`), `type:todo` / `type:note`, `notebook:`, `tag:` and `-tag:`
//! filters, and bare title terms. Used by the test suite and as a
//! reference for wiring real backends.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Note, Notebook, Tag};
use crate::store::NoteStore;

#[derive(Debug, Default)]
struct Inner {
    notes: Vec<Note>,
    notebooks: Vec<Notebook>,
    tags: Vec<Tag>,
    /// (note id, tag id) pairs
    note_tags: Vec<(String, String)>,
}

/// In-memory [`NoteStore`] implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note to the store
    pub fn add_note(&self, note: Note) {
        if let Ok(mut inner) = self.inner.write() {
            inner.notes.push(note);
        }
    }

    /// Add a notebook to the store
    pub fn add_notebook(&self, notebook: Notebook) {
        if let Ok(mut inner) = self.inner.write() {
            inner.notebooks.push(notebook);
        }
    }

    /// Add a tag to the store
    pub fn add_tag(&self, tag: Tag) {
        if let Ok(mut inner) = self.inner.write() {
            inner.tags.push(tag);
        }
    }

    /// Attach an existing tag to an existing note
    pub fn tag_note(&self, note_id: impl Into<String>, tag_id: impl Into<String>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.note_tags.push((note_id.into(), tag_id.into()));
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

#[derive(Debug, PartialEq)]
enum Clause {
    /// `/"..."` - body contains the literal
    BodyLiteral(String),
    TypeTodo,
    TypeNote,
    /// `notebook:title` - direct notebook title equals
    Notebook(String),
    /// `tag:title`
    Tag(String),
    /// `-tag:title`
    NotTag(String),
    /// Bare term - title substring, case-insensitive
    TitleContains(String),
}

// Split on whitespace outside double quotes; quotes are stripped.
fn tokenize(query: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in query.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_clauses(query: &str) -> Vec<Clause> {
    tokenize(query)
        .into_iter()
        .map(|token| {
            if let Some(literal) = token.strip_prefix('/') {
                Clause::BodyLiteral(literal.to_string())
            } else if token == "type:todo" {
                Clause::TypeTodo
            } else if token == "type:note" {
                Clause::TypeNote
            } else if let Some(title) = token.strip_prefix("notebook:") {
                Clause::Notebook(title.to_string())
            } else if let Some(title) = token.strip_prefix("-tag:") {
                Clause::NotTag(title.to_string())
            } else if let Some(title) = token.strip_prefix("tag:") {
                Clause::Tag(title.to_string())
            } else {
                Clause::TitleContains(token.to_lowercase())
            }
        })
        .collect()
}

impl Inner {
    fn tag_titles(&self, note_id: &str) -> Vec<&str> {
        self.note_tags
            .iter()
            .filter(|(nid, _)| nid == note_id)
            .filter_map(|(_, tid)| self.tags.iter().find(|t| &t.id == tid))
            .map(|t| t.title.as_str())
            .collect()
    }

    fn note_matches(&self, note: &Note, clauses: &[Clause]) -> bool {
        clauses.iter().all(|clause| match clause {
            Clause::BodyLiteral(literal) => note.body.contains(literal),
            Clause::TypeTodo => note.is_todo,
            Clause::TypeNote => !note.is_todo,
            Clause::Notebook(title) => self
                .notebooks
                .iter()
                .any(|nb| nb.id == note.parent_id && &nb.title == title),
            Clause::Tag(title) => self.tag_titles(&note.id).contains(&title.as_str()),
            Clause::NotTag(title) => !self.tag_titles(&note.id).contains(&title.as_str()),
            Clause::TitleContains(term) => note.title.to_lowercase().contains(term),
        })
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn search(&self, query: &str) -> Result<Vec<Note>, StoreError> {
        let inner = self.read()?;
        let clauses = parse_clauses(query);
        Ok(inner
            .notes
            .iter()
            .filter(|note| inner.note_matches(note, &clauses))
            .cloned()
            .collect())
    }

    async fn list_notebooks(&self) -> Result<Vec<Notebook>, StoreError> {
        Ok(self.read()?.notebooks.clone())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, StoreError> {
        Ok(self.read()?.tags.clone())
    }

    async fn tags_for_note(&self, note_id: &str) -> Result<Vec<Tag>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .note_tags
            .iter()
            .filter(|(nid, _)| nid == note_id)
            .filter_map(|(_, tid)| inner.tags.iter().find(|t| &t.id == tid))
            .cloned()
            .collect())
    }

    async fn get_note(&self, note_id: &str) -> Result<Option<Note>, StoreError> {
        Ok(self.read()?.notes.iter().find(|n| n.id == note_id).cloned())
    }

    async fn set_note_body(&self, note_id: &str, body: &str) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        match inner.notes.iter_mut().find(|n| n.id == note_id) {
            Some(note) => {
                note.set_body(body);
                Ok(())
            }
            None => Err(StoreError::NotFound {
                id: note_id.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_notebook(Notebook::new("nb1", "notebook1"));
        store.add_notebook(Notebook::child_of("nb2", "notebook2", "nb1"));

        let mut host = Note::new("n1", "note1", "nb1");
        host.set_body("<!-- noteview\nsearch: type:todo\n-->");
        store.add_note(host);

        let mut todo = Note::new("t1", "todo1", "nb2");
        todo.set_todo(true);
        store.add_note(todo);

        store.add_tag(Tag::new("tg1", "tag1"));
        store.add_tag(Tag::new("tg2", "tag2"));
        store.tag_note("t1", "tg1");
        store
    }

    #[test]
    fn test_tokenize_respects_quotes() {
        assert_eq!(
            tokenize(r#"type:todo notebook:"my book""#),
            vec!["type:todo", "notebook:my book"]
        );
    }

    #[tokio::test]
    async fn test_search_by_type() {
        let store = sample_store();
        let todos = store.search("type:todo").await.unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].id, "t1");

        let notes = store.search("type:note").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, "n1");
    }

    #[tokio::test]
    async fn test_search_body_literal() {
        let store = sample_store();
        let hosts = store.search(r#"/"<!-- noteview""#).await.unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].id, "n1");
    }

    #[tokio::test]
    async fn test_search_by_notebook() {
        let store = sample_store();
        let notes = store.search("notebook:notebook2").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, "t1");
    }

    #[tokio::test]
    async fn test_search_tag_clauses() {
        let store = sample_store();
        assert_eq!(store.search("tag:tag1").await.unwrap().len(), 1);
        assert_eq!(store.search("tag:tag2").await.unwrap().len(), 0);

        let without = store.search("-tag:tag1").await.unwrap();
        assert_eq!(without.len(), 1);
        assert_eq!(without[0].id, "n1");
    }

    #[tokio::test]
    async fn test_search_title_term() {
        let store = sample_store();
        let notes = store.search("Todo1").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, "t1");
    }

    #[tokio::test]
    async fn test_tags_for_note() {
        let store = sample_store();
        let tags = store.tags_for_note("t1").await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].title, "tag1");
        assert!(store.tags_for_note("n1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_note_body() {
        let store = sample_store();
        store.set_note_body("t1", "updated").await.unwrap();
        assert_eq!(store.get_note("t1").await.unwrap().unwrap().body, "updated");

        let err = store.set_note_body("missing", "x").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
