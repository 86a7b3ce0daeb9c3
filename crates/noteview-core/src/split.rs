//! Grouping and query augmentation
//!
//! `resolve_groups` partitions a search's matches per the directive's
//! split mode; `build_queries` turns each partition's filter fragment
//! into a full augmented query. Both are pure functions over per-pass
//! snapshots, so identical inputs always produce identical queries.
//!
//! Notebook and breadcrumb splits partition by direct notebook
//! membership. The tag split builds one group per observed tag
//! combination, and every group's filter carries a negative clause for
//! each tag observed elsewhere in the match set; a note whose tag set is
//! a subset of another note's can therefore never satisfy both groups.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::directive::{Directive, SplitBy};
use crate::models::{Group, Note, NotebookTree, Tag};

/// Compute the ordered groups for a directive's match set
///
/// Returns an empty list when there is nothing to render: no matches, or
/// a tag split over entirely untagged notes. Notes whose notebook or tags
/// cannot be resolved are excluded from grouping rather than failing the
/// block.
pub fn resolve_groups(
    directive: &Directive,
    matches: &[Note],
    tree: &NotebookTree,
    tags_by_note: &HashMap<String, Vec<Tag>>,
) -> Vec<Group> {
    if matches.is_empty() {
        return Vec::new();
    }

    let split = match &directive.split {
        Some(split) => split,
        None => {
            return vec![Group {
                label: String::new(),
                filter: String::new(),
                query: String::new(),
            }]
        }
    };

    match split.by {
        SplitBy::Notebook => notebook_groups(matches, tree, false),
        SplitBy::Breadcrumb => notebook_groups(matches, tree, true),
        SplitBy::Tags => tag_groups(matches, tags_by_note),
    }
}

/// Fill in each group's augmented query from the directive's base search
///
/// The query is the base search with the group's filter appended, trimmed
/// and collapsed to single spaces.
pub fn build_queries(directive: &Directive, mut groups: Vec<Group>) -> Vec<Group> {
    for group in &mut groups {
        let combined = format!("{} {}", directive.search, group.filter);
        group.query = combined.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    groups
}

// One group per distinct direct notebook, in first-occurrence order. The
// filter always targets the leaf notebook title since the search backend
// filters by single notebook name; with `breadcrumb` only the label
// changes to the full path.
fn notebook_groups(matches: &[Note], tree: &NotebookTree, breadcrumb: bool) -> Vec<Group> {
    let mut seen = HashSet::new();
    let mut groups = Vec::new();

    for note in matches {
        let title = match tree.title_of(&note.parent_id) {
            Some(title) => title,
            None => {
                debug!(note = %note.id, notebook = %note.parent_id, "skipping note with unknown notebook");
                continue;
            }
        };
        if !seen.insert(title.to_string()) {
            continue;
        }

        let label = if breadcrumb {
            match tree.breadcrumb_of(&note.parent_id) {
                Some(path) => path,
                None => continue,
            }
        } else {
            title.to_string()
        };
        groups.push(Group {
            label,
            filter: format!("notebook:{}", quote_value(title)),
            query: String::new(),
        });
    }

    groups
}

// One group per distinct non-empty tag combination, in first-occurrence
// order. Untagged notes contribute no group.
fn tag_groups(matches: &[Note], tags_by_note: &HashMap<String, Vec<Tag>>) -> Vec<Group> {
    let mut observed: BTreeSet<String> = BTreeSet::new();
    let mut combos: Vec<Vec<String>> = Vec::new();
    let mut seen = HashSet::new();

    for note in matches {
        let mut titles: Vec<String> = match tags_by_note.get(&note.id) {
            Some(tags) => tags.iter().map(|t| t.title.clone()).collect(),
            None => continue,
        };
        if titles.is_empty() {
            continue;
        }
        titles.sort();
        titles.dedup();
        observed.extend(titles.iter().cloned());
        if seen.insert(titles.join(", ")) {
            combos.push(titles);
        }
    }

    combos
        .into_iter()
        .map(|combo| {
            let mut clauses: Vec<String> = combo
                .iter()
                .map(|tag| format!("tag:{}", quote_value(tag)))
                .collect();
            // Exclude every other observed tag so combinations stay
            // mutually exclusive even across subset relationships.
            clauses.extend(
                observed
                    .iter()
                    .filter(|tag| !combo.contains(*tag))
                    .map(|tag| format!("-tag:{}", quote_value(tag))),
            );
            Group {
                label: combo.join(", "),
                filter: clauses.join(" "),
                query: String::new(),
            }
        })
        .collect()
}

// Clause values are quoted only when needed, matching the backend's
// unquoted single-word form.
fn quote_value(value: &str) -> String {
    if value.contains(char::is_whitespace) {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}
