//! noteview Core Library
//!
//! This crate generates note overviews: a note declares a search query
//! and formatting options inside a directive comment, and the engine
//! replaces the text below it with a rendered listing of the matching
//! notes, optionally split into groups by notebook, breadcrumb path, or
//! tag combination.
//!
//! # Architecture
//!
//! The engine reads the host note store only through the [`NoteStore`]
//! trait and receives a [`Settings`] snapshot at construction; it keeps
//! no global state and persists nothing itself beyond the rebuilt note
//! bodies it hands back to the store.
//!
//! # Quick Start
//!
//! ```text
//! let engine = OverviewEngine::new(store, Settings::default());
//!
//! // Rewrite every note containing a directive block
//! let written = engine.update_all(false).await?;
//! ```
//!
//! # Modules
//!
//! - `overview`: orchestration over whole notes (main entry point)
//! - `directive`: directive comment extraction and parsing
//! - `split`: grouping and query augmentation
//! - `render`: content block rendering
//! - `store`: note store capability trait
//! - `memory`: in-memory store for tests and reference wiring
//! - `models`: note, notebook, tag, and group types
//! - `settings`: injected renderer settings
//! - `error`: error types

pub mod directive;
pub mod error;
pub mod memory;
pub mod models;
pub mod overview;
pub mod render;
pub mod settings;
pub mod split;
pub mod store;

pub use directive::{parse_directives, Directive, DirectiveBlock, SplitBy, DIRECTIVE_MARKER};
pub use error::{OverviewError, Result, StoreError};
pub use memory::MemoryStore;
pub use models::{Group, Note, Notebook, NotebookTree, Tag};
pub use overview::OverviewEngine;
pub use settings::Settings;
pub use store::NoteStore;
