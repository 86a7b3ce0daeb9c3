//! Error types for the overview engine
//!
//! Failures inside a directive block (malformed YAML, dangling notebook or
//! tag references, empty result sets) are handled locally and never reach
//! these types; only note-store failures surface to callers.

use thiserror::Error;

/// Errors reported by a note store backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// A note referenced by id does not exist
    #[error("note not found: '{id}'")]
    NotFound { id: String },

    /// The backend failed to serve the request
    #[error("note store backend error: {0}")]
    Backend(String),
}

/// Errors that can occur while generating overviews
#[derive(Error, Debug)]
pub enum OverviewError {
    /// A note store operation failed
    #[error("note store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for overview operations
pub type Result<T> = std::result::Result<T, OverviewError>;
