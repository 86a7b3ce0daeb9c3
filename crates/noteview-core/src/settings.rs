//! Overview settings snapshot
//!
//! The engine never reads host configuration itself. The caller builds a
//! `Settings` value (from defaults or a TOML file) and hands it to
//! [`crate::OverviewEngine`] at construction, so a pass always works
//! against one consistent snapshot.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Renderer settings consumed by the overview engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Append a note-count line to every content block
    #[serde(default)]
    pub show_note_count: bool,

    /// Template for the note-count line; `{{count}}` is substituted
    #[serde(default = "default_note_count_text")]
    pub note_count_text: String,

    /// Locale hint passed through from the host
    #[serde(default = "default_locale")]
    pub locale: String,

    /// strftime format applied to time fields
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Glyph shown for open todos
    #[serde(default)]
    pub todo_status_open: String,

    /// Glyph shown for todos past their due date
    #[serde(default = "default_status_overdue")]
    pub todo_status_overdue: String,

    /// Glyph shown for completed todos
    #[serde(default = "default_status_done")]
    pub todo_status_done: String,
}

fn default_note_count_text() -> String {
    "Note count: {{count}}".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

fn default_status_overdue() -> String {
    "❗".to_string()
}

fn default_status_done() -> String {
    "✔".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_note_count: false,
            note_count_text: default_note_count_text(),
            locale: default_locale(),
            date_format: default_date_format(),
            todo_status_open: String::new(),
            todo_status_overdue: default_status_overdue(),
            todo_status_done: default_status_done(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    ///
    /// Missing keys fall back to defaults; a missing file is an error so
    /// the caller can distinguish it from an intentionally empty config.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;
        Self::load_from_str(&content)
    }

    /// Load settings from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        toml::from_str(toml_content).context("Failed to parse settings")
    }
}
