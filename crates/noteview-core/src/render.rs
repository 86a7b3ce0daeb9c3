//! Content block rendering
//!
//! Turns one group's fetched notes into the ordered lines of a markdown
//! content block. Output modes compose independently of the split mode:
//! a table by default, one templated line per note with `listview`, an
//! optional prefix/suffix around the body when split is active, an
//! optional note-count line, and an optional `<details>` wrapper around
//! everything. Rendering only produces text; it never touches the store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::directive::Directive;
use crate::models::{Note, NotebookTree, Tag};
use crate::settings::Settings;

/// Field names the renderer knows how to resolve
pub const KNOWN_FIELDS: &[&str] = &[
    "title",
    "id",
    "notebook",
    "breadcrumb",
    "tags",
    "status",
    "due_date",
    "created_time",
    "updated_time",
];

/// Read-only lookups shared by all blocks of one overview pass
pub struct RenderContext<'a> {
    pub tree: &'a NotebookTree,
    pub tags_by_note: &'a HashMap<String, Vec<Tag>>,
    pub settings: &'a Settings,
    /// Pass timestamp used for overdue checks
    pub now: DateTime<Utc>,
}

/// Replace every `{{key}}` placeholder in the template
pub fn substitute(template: &str, key: &str, value: &str) -> String {
    template.replace(&format!("{{{{{}}}}}", key), value)
}

/// Resolve one field of one note to its rendered value
///
/// Unknown field names render empty rather than failing the block.
pub fn field_value(note: &Note, field: &str, ctx: &RenderContext) -> String {
    match field {
        "title" => format!("[{}](:/{})", note.title, note.id),
        "id" => note.id.clone(),
        "notebook" => ctx
            .tree
            .title_of(&note.parent_id)
            .unwrap_or_default()
            .to_string(),
        "breadcrumb" => ctx.tree.breadcrumb_of(&note.parent_id).unwrap_or_default(),
        "tags" => {
            let mut titles: Vec<&str> = ctx
                .tags_by_note
                .get(&note.id)
                .map(|tags| tags.iter().map(|t| t.title.as_str()).collect())
                .unwrap_or_default();
            titles.sort_unstable();
            titles.dedup();
            titles.join(", ")
        }
        "status" => status_glyph(note, ctx),
        "due_date" => note
            .todo_due
            .map(|due| due.format(&ctx.settings.date_format).to_string())
            .unwrap_or_default(),
        "created_time" => note.created_time.format(&ctx.settings.date_format).to_string(),
        "updated_time" => note.updated_time.format(&ctx.settings.date_format).to_string(),
        _ => String::new(),
    }
}

fn status_glyph(note: &Note, ctx: &RenderContext) -> String {
    if !note.is_todo {
        return String::new();
    }
    if note.todo_completed.is_some() {
        return ctx.settings.todo_status_done.clone();
    }
    match note.todo_due {
        Some(due) if due < ctx.now => ctx.settings.todo_status_overdue.clone(),
        _ => ctx.settings.todo_status_open.clone(),
    }
}

/// Render the ordered lines of one group's content block
///
/// `notes` is the full result of the group's augmented query; `limit`
/// truncates what is shown but the note-count line still reports the
/// full match count.
pub fn render_block(
    label: &str,
    notes: &[Note],
    directive: &Directive,
    ctx: &RenderContext,
) -> Vec<String> {
    let total = notes.len();
    let shown = match directive.limit {
        Some(limit) => &notes[..limit.min(notes.len())],
        None => notes,
    };

    let mut lines = Vec::new();

    if let Some(split) = &directive.split {
        if let Some(prefix) = &split.prefix {
            lines.push(substitute(prefix, "title", label));
        }
    }

    if !shown.is_empty() {
        match &directive.listview {
            Some(listview) => {
                for note in shown {
                    lines.push(listview_line(&listview.text, note, ctx));
                }
            }
            None => table_lines(&mut lines, shown, directive, ctx),
        }
    }

    if directive.count.unwrap_or(ctx.settings.show_note_count) {
        lines.push(substitute(
            &ctx.settings.note_count_text,
            "count",
            &total.to_string(),
        ));
    }

    if let Some(split) = &directive.split {
        if let Some(suffix) = &split.suffix {
            lines.push(substitute(suffix, "title", label));
        }
    }

    if let Some(details) = &directive.details {
        let summary = substitute(&details.summary, "count", &total.to_string());
        let mut wrapped = Vec::with_capacity(lines.len() + 3);
        wrapped.push(if details.open { "<details open>" } else { "<details close>" }.to_string());
        wrapped.push(format!("<summary>{}</summary>", summary));
        wrapped.append(&mut lines);
        wrapped.push("</details>".to_string());
        return wrapped;
    }

    lines
}

fn listview_line(template: &str, note: &Note, ctx: &RenderContext) -> String {
    let mut line = template.to_string();
    for field in KNOWN_FIELDS {
        let placeholder = format!("{{{{{}}}}}", field);
        if line.contains(&placeholder) {
            line = line.replace(&placeholder, &field_value(note, field, ctx));
        }
    }
    line
}

fn table_lines(lines: &mut Vec<String>, notes: &[Note], directive: &Directive, ctx: &RenderContext) {
    let headers: Vec<&str> = directive
        .fields
        .iter()
        .map(|f| directive.aliases.get(f).unwrap_or(f).as_str())
        .collect();
    lines.push(format!("| {} |", headers.join(" | ")));
    lines.push(format!(
        "| {} |",
        vec!["---"; directive.fields.len()].join(" | ")
    ));

    for note in notes {
        let cells: Vec<String> = directive
            .fields
            .iter()
            .map(|f| escape_cell(&field_value(note, f, ctx)))
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }
}

// Markdown table cells cannot hold raw pipes or newlines
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Directive;
    use crate::models::Notebook;
    use chrono::TimeZone;

    fn directive(yaml: &str) -> Directive {
        Directive::from_yaml(yaml).unwrap()
    }

    fn sample_tree() -> NotebookTree {
        NotebookTree::new(vec![
            Notebook::new("nb1", "notebook1"),
            Notebook::child_of("nb2", "notebook2", "nb1"),
        ])
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn ctx<'a>(
        tree: &'a NotebookTree,
        tags: &'a HashMap<String, Vec<Tag>>,
        settings: &'a Settings,
    ) -> RenderContext<'a> {
        RenderContext {
            tree,
            tags_by_note: tags,
            settings,
            now: fixed_now(),
        }
    }

    fn sample_note() -> Note {
        let mut note = Note::new("t1", "todo1", "nb2");
        note.set_todo(true);
        note
    }

    #[test]
    fn test_table_rendering() {
        let d = directive("search: type:todo\nfields: title, notebook");
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings::default();
        let lines = render_block("", &[sample_note()], &d, &ctx(&tree, &tags, &settings));

        assert_eq!(lines[0], "| title | notebook |");
        assert_eq!(lines[1], "| --- | --- |");
        assert_eq!(lines[2], "| [todo1](:/t1) | notebook2 |");
    }

    #[test]
    fn test_alias_header() {
        let d = directive("search: x\nfields: title, notebook\nalias: notebook AS Book");
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings::default();
        let lines = render_block("", &[sample_note()], &d, &ctx(&tree, &tags, &settings));
        assert_eq!(lines[0], "| title | Book |");
    }

    #[test]
    fn test_pipe_escaped_in_cells() {
        let d = directive("search: x\nfields: title");
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings::default();
        let mut note = sample_note();
        note.title = "a|b".to_string();

        let lines = render_block("", &[note], &d, &ctx(&tree, &tags, &settings));
        assert_eq!(lines[2], "| [a\\|b](:/t1) |");
    }

    #[test]
    fn test_split_prefix_substitutes_label() {
        let d = directive("search: x\nsplit:\n  by: notebook\n  prefix: \"## {{title}}\"");
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings::default();
        let lines = render_block("notebook2", &[sample_note()], &d, &ctx(&tree, &tags, &settings));
        assert_eq!(lines[0], "## notebook2");
    }

    #[test]
    fn test_split_suffix_is_last_line() {
        let d = directive("search: x\nsplit:\n  by: notebook\n  suffix: ---");
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings::default();
        let lines = render_block("notebook2", &[sample_note()], &d, &ctx(&tree, &tags, &settings));
        assert_eq!(lines.last().map(String::as_str), Some("---"));
    }

    #[test]
    fn test_note_count_before_suffix() {
        let d = directive("search: x\nsplit:\n  by: notebook\n  suffix: ---");
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings {
            show_note_count: true,
            ..Settings::default()
        };
        let lines = render_block("notebook2", &[sample_note()], &d, &ctx(&tree, &tags, &settings));

        assert_eq!(lines[lines.len() - 2], "Note count: 1");
        assert_eq!(lines[lines.len() - 1], "---");
    }

    #[test]
    fn test_note_count_last_without_suffix() {
        let d = directive("search: x\nfields: title");
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings {
            show_note_count: true,
            ..Settings::default()
        };
        let lines = render_block("", &[sample_note()], &d, &ctx(&tree, &tags, &settings));
        assert_eq!(lines.last().map(String::as_str), Some("Note count: 1"));
    }

    #[test]
    fn test_directive_count_overrides_settings() {
        let d = directive("search: x\nfields: title\ncount: false");
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings {
            show_note_count: true,
            ..Settings::default()
        };
        let lines = render_block("", &[sample_note()], &d, &ctx(&tree, &tags, &settings));
        assert!(!lines.iter().any(|l| l.starts_with("Note count")));
    }

    #[test]
    fn test_details_wrapper() {
        let d = directive(
            "search: x\ndetails:\n  open: false\n  summary: \"Note count: {{count}}\"",
        );
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings::default();
        let lines = render_block("", &[sample_note()], &d, &ctx(&tree, &tags, &settings));

        assert_eq!(lines[0], "<details close>");
        assert_eq!(lines[1], "<summary>Note count: 1</summary>");
        assert_eq!(lines.last().map(String::as_str), Some("</details>"));
    }

    #[test]
    fn test_details_open_attribute() {
        let d = directive("search: x\ndetails:\n  open: true\n  summary: s");
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings::default();
        let lines = render_block("", &[sample_note()], &d, &ctx(&tree, &tags, &settings));
        assert_eq!(lines[0], "<details open>");
    }

    #[test]
    fn test_listview_renders_link_lines() {
        let d = directive("search: x\nlistview:\n  text: \"{{title}}\"");
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings::default();
        let lines = render_block("", &[sample_note()], &d, &ctx(&tree, &tags, &settings));

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "[todo1](:/t1)");
    }

    #[test]
    fn test_listview_multiple_placeholders() {
        let d = directive("search: x\nlistview:\n  text: \"{{title}} in {{notebook}}\"");
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings::default();
        let lines = render_block("", &[sample_note()], &d, &ctx(&tree, &tags, &settings));
        assert_eq!(lines[0], "[todo1](:/t1) in notebook2");
    }

    #[test]
    fn test_status_glyphs() {
        let d = directive("search: x\nfields: status");
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings::default();
        let context = ctx(&tree, &tags, &settings);

        let mut open = sample_note();
        open.todo_due = Some(fixed_now() + chrono::Duration::days(1));
        assert_eq!(field_value(&open, "status", &context), "");

        let mut overdue = sample_note();
        overdue.todo_due = Some(fixed_now() - chrono::Duration::days(1));
        assert_eq!(field_value(&overdue, "status", &context), "❗");

        let mut done = sample_note();
        done.set_completed(fixed_now());
        assert_eq!(field_value(&done, "status", &context), "✔");

        let plain = Note::new("n9", "plain", "nb1");
        assert_eq!(field_value(&plain, "status", &context), "");
    }

    #[test]
    fn test_time_fields_use_date_format() {
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings::default();
        let context = ctx(&tree, &tags, &settings);

        let mut note = sample_note();
        note.todo_due = Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap());
        assert_eq!(field_value(&note, "due_date", &context), "2026-03-01 09:30");
    }

    #[test]
    fn test_tags_field_sorted() {
        let tree = sample_tree();
        let mut tags = HashMap::new();
        tags.insert(
            "t1".to_string(),
            vec![Tag::new("tg2", "tag2"), Tag::new("tg1", "tag1")],
        );
        let settings = Settings::default();
        let context = ctx(&tree, &tags, &settings);
        assert_eq!(field_value(&sample_note(), "tags", &context), "tag1, tag2");
    }

    #[test]
    fn test_unknown_field_renders_empty() {
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings::default();
        let context = ctx(&tree, &tags, &settings);
        assert_eq!(field_value(&sample_note(), "size", &context), "");
    }

    #[test]
    fn test_limit_truncates_but_count_is_total() {
        let d = directive("search: x\nfields: title\nlimit: 1\ncount: true");
        let tree = sample_tree();
        let tags = HashMap::new();
        let settings = Settings::default();

        let notes = vec![sample_note(), {
            let mut n = Note::new("t2", "todo2", "nb2");
            n.set_todo(true);
            n
        }];
        let lines = render_block("", &notes, &d, &ctx(&tree, &tags, &settings));

        // header + separator + one row + count
        assert_eq!(lines.len(), 4);
        assert_eq!(lines.last().map(String::as_str), Some("Note count: 2"));
    }
}
