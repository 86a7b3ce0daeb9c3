//! Directive block parsing
//!
//! An overview is declared inside a note with an HTML comment whose body
//! is YAML:
//!
//! ```text
//! <!-- noteview
//! search: type:todo
//! fields: title, notebook
//! split:
//!   by: notebook
//!   prefix: "## {{title}}"
//! -->
//! ```
//!
//! Everything between the comment and the next directive comment (or the
//! end of the note) is the block's rendered region, owned by the engine
//! and replaced on every update. A malformed block is skipped without
//! touching the surrounding text.

use std::collections::HashMap;
use std::ops::Range;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

/// Opening marker of a directive comment
pub const DIRECTIVE_MARKER: &str = "<!-- noteview";

const COMMENT_CLOSE: &str = "-->";

/// Grouping mode for `split.by`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitBy {
    /// One group per direct notebook
    Notebook,
    /// One group per notebook, labelled with the full breadcrumb path
    Breadcrumb,
    /// One group per observed tag combination
    Tags,
}

impl FromStr for SplitBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "notebook" => Ok(Self::Notebook),
            "breadcrumb" => Ok(Self::Breadcrumb),
            "tags" => Ok(Self::Tags),
            other => Err(format!("Invalid split mode: {}", other)),
        }
    }
}

/// Grouping options from the `split` key
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSpec {
    pub by: SplitBy,
    /// Template for the first line of each group; `{{title}}` is the label
    pub prefix: Option<String>,
    /// Literal last line of each group
    pub suffix: Option<String>,
}

/// Collapsible-section options from the `details` key
#[derive(Debug, Clone, PartialEq)]
pub struct DetailsSpec {
    /// Render the section expanded
    pub open: bool,
    /// Summary-line template; `{{count}}` is substituted
    pub summary: String,
}

/// Link-list rendering options from the `listview` key
#[derive(Debug, Clone, PartialEq)]
pub struct ListviewSpec {
    /// Per-note line template with `{{field}}` placeholders
    pub text: String,
}

/// A fully parsed overview directive
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// Base search query; always non-empty
    pub search: String,
    /// Fields rendered per note, in order
    pub fields: Vec<String>,
    /// Field name -> column header overrides
    pub aliases: HashMap<String, String>,
    /// Maximum notes rendered per group
    pub limit: Option<usize>,
    pub split: Option<SplitSpec>,
    pub details: Option<DetailsSpec>,
    pub listview: Option<ListviewSpec>,
    /// Per-directive override of the global note-count setting
    pub count: Option<bool>,
}

/// A directive plus the spans it occupies in the note body
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveBlock {
    pub directive: Directive,
    /// Byte span of the marker comment itself (always preserved)
    pub marker: Range<usize>,
    /// Byte span of the rendered region owned by this block
    pub region: Range<usize>,
}

// Raw YAML shape; unknown keys are ignored by serde.
#[derive(Debug, Deserialize)]
struct RawDirective {
    search: Option<String>,
    fields: Option<String>,
    alias: Option<String>,
    limit: Option<usize>,
    split: Option<RawSplit>,
    details: Option<RawDetails>,
    listview: Option<RawListview>,
    count: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawSplit {
    by: Option<String>,
    prefix: Option<String>,
    suffix: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDetails {
    open: Option<bool>,
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawListview {
    text: Option<String>,
}

impl Directive {
    /// Parse a directive from the YAML body of a marker comment
    ///
    /// Returns `None` for anything malformed: invalid YAML, a missing or
    /// empty `search`, or an unrecognized `split.by` value.
    pub fn from_yaml(yaml: &str) -> Option<Self> {
        let raw: RawDirective = match serde_yaml::from_str(yaml) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(error = %err, "skipping directive with invalid YAML");
                return None;
            }
        };

        let search = raw.search.as_deref().map(str::trim).unwrap_or("");
        if search.is_empty() {
            debug!("skipping directive without a search query");
            return None;
        }

        let split = match raw.split {
            None => None,
            Some(raw_split) => {
                let by = match raw_split.by.as_deref().map(SplitBy::from_str) {
                    Some(Ok(by)) => by,
                    _ => {
                        debug!("skipping directive with invalid split mode");
                        return None;
                    }
                };
                Some(SplitSpec {
                    by,
                    prefix: raw_split.prefix,
                    suffix: raw_split.suffix,
                })
            }
        };

        let fields = match raw.fields.as_deref() {
            Some(list) => parse_name_list(list),
            None => Vec::new(),
        };
        let fields = if fields.is_empty() {
            vec!["updated_time".to_string(), "title".to_string()]
        } else {
            fields
        };

        Some(Self {
            search: search.to_string(),
            fields,
            aliases: parse_aliases(raw.alias.as_deref().unwrap_or("")),
            limit: raw.limit,
            split,
            details: raw.details.map(|d| DetailsSpec {
                open: d.open.unwrap_or(true),
                summary: d.summary.unwrap_or_else(|| "{{count}} notes".to_string()),
            }),
            listview: raw.listview.map(|l| ListviewSpec {
                text: l.text.unwrap_or_else(|| "{{title}}".to_string()),
            }),
            count: raw.count,
        })
    }

    /// Whether grouping is active for this directive
    pub fn is_split(&self) -> bool {
        self.split.is_some()
    }
}

fn parse_name_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

// "title AS Title, due_date AS Due" -> {title: Title, due_date: Due}
fn parse_aliases(list: &str) -> HashMap<String, String> {
    let mut aliases = HashMap::new();
    for entry in list.split(',') {
        let mut parts = entry.splitn(2, " AS ");
        let field = parts.next().map(str::trim).unwrap_or("");
        let header = parts.next().map(str::trim).unwrap_or("");
        if !field.is_empty() && !header.is_empty() {
            aliases.insert(field.to_string(), header.to_string());
        }
    }
    aliases
}

/// Extract every well-formed directive block from a note body
///
/// Each block's rendered region extends from the end of its marker
/// comment to the start of the next marker (or the end of the body).
/// Malformed blocks are skipped; their text is left untouched.
pub fn parse_directives(body: &str) -> Vec<DirectiveBlock> {
    let starts: Vec<usize> = body.match_indices(DIRECTIVE_MARKER).map(|(i, _)| i).collect();
    let mut blocks = Vec::new();

    for (idx, &start) in starts.iter().enumerate() {
        let next_start = starts.get(idx + 1).copied().unwrap_or(body.len());

        let close_rel = match body[start..].find(COMMENT_CLOSE) {
            Some(rel) => rel,
            None => {
                debug!("skipping unterminated directive comment");
                continue;
            }
        };
        let close_end = start + close_rel + COMMENT_CLOSE.len();
        // An unterminated comment must not swallow the next marker
        if close_end > next_start {
            debug!("skipping directive comment closed after the next marker");
            continue;
        }

        let yaml = &body[start + DIRECTIVE_MARKER.len()..start + close_rel];
        if let Some(directive) = Directive::from_yaml(yaml) {
            blocks.push(DirectiveBlock {
                directive,
                marker: start..close_end,
                region: close_end..next_start,
            });
        }
    }

    blocks
}
