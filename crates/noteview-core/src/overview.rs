//! Overview orchestration
//!
//! `OverviewEngine` drives a full update: find notes carrying directive
//! blocks, and for each block resolve groups, build the augmented
//! queries, fetch and render every group, and splice the result back
//! into the note body. The engine owns no state beyond its store handle
//! and a settings snapshot; notebook and tag indices are re-fetched on
//! every pass since the store may have changed in between.

use std::collections::HashMap;

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::directive::{parse_directives, Directive, DIRECTIVE_MARKER};
use crate::error::{OverviewError, Result};
use crate::models::{Note, NotebookTree, Tag};
use crate::render::{render_block, RenderContext};
use crate::settings::Settings;
use crate::split::{build_queries, resolve_groups};
use crate::store::NoteStore;

/// Drives overview generation against one note store
pub struct OverviewEngine<S> {
    store: S,
    settings: Settings,
}

impl<S: NoteStore> OverviewEngine<S> {
    /// Create an engine over the given store and settings snapshot
    pub fn new(store: S, settings: Settings) -> Self {
        Self { store, settings }
    }

    /// Access the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The settings snapshot this engine renders with
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Update every note containing a directive block
    ///
    /// Notes are processed sequentially; a failure updates nothing for
    /// that note and the pass continues. In non-forced mode notes whose
    /// rebuilt body is unchanged are skipped without a write. Returns
    /// the number of notes written.
    pub async fn update_all(&self, force: bool) -> Result<usize> {
        let tree = NotebookTree::new(self.store.list_notebooks().await?);
        let hosts = self
            .store
            .search(&format!("/\"{}\"", DIRECTIVE_MARKER))
            .await?;
        info!(notes = hosts.len(), "overview pass started");

        let mut written = 0;
        for note in hosts {
            match self.rebuild_body(&note, &tree).await {
                Ok(new_body) => {
                    if !force && new_body == note.body {
                        debug!(note = %note.id, "overview unchanged, skipping write");
                        continue;
                    }
                    match self.store.set_note_body(&note.id, &new_body).await {
                        Ok(()) => written += 1,
                        Err(err) => {
                            warn!(note = %note.id, error = %err, "failed to write overview")
                        }
                    }
                }
                Err(err) => warn!(note = %note.id, error = %err, "overview update failed"),
            }
        }
        info!(written, "overview pass finished");
        Ok(written)
    }

    /// Rebuild one note's body and return it without writing
    pub async fn update_note(&self, note: &Note) -> Result<String> {
        let tree = NotebookTree::new(self.store.list_notebooks().await?);
        self.rebuild_body(note, &tree).await
    }

    // Renders every directive block, then splices back to front so the
    // earlier byte spans stay valid. The body is replaced in one step,
    // never partially.
    async fn rebuild_body(&self, note: &Note, tree: &NotebookTree) -> Result<String> {
        let blocks = parse_directives(&note.body);
        if blocks.is_empty() {
            return Ok(note.body.clone());
        }

        let mut rendered = Vec::with_capacity(blocks.len());
        for block in &blocks {
            let text = self.render_directive(&block.directive, tree).await?;
            rendered.push((block.region.clone(), text));
        }

        let mut body = note.body.clone();
        for (region, text) in rendered.into_iter().rev() {
            let replacement = if text.is_empty() {
                "\n".to_string()
            } else {
                format!("\n{}\n", text)
            };
            body.replace_range(region, &replacement);
        }
        Ok(body)
    }

    async fn render_directive(&self, directive: &Directive, tree: &NotebookTree) -> Result<String> {
        let matches = self.store.search(&directive.search).await?;

        let mut tags_by_note: HashMap<String, Vec<Tag>> = HashMap::new();
        for note in &matches {
            tags_by_note.insert(note.id.clone(), self.store.tags_for_note(&note.id).await?);
        }

        let groups = build_queries(
            directive,
            resolve_groups(directive, &matches, tree, &tags_by_note),
        );
        if groups.is_empty() {
            return Ok(String::new());
        }

        let ctx = RenderContext {
            tree,
            tags_by_note: &tags_by_note,
            settings: &self.settings,
            now: Utc::now(),
        };

        // Group fetches are independent and run concurrently; join_all
        // preserves group order, which is part of the output contract.
        let futures = groups.iter().map(|group| {
            let ctx = &ctx;
            async move {
                let notes = self.store.search(&group.query).await?;
                Ok::<_, OverviewError>(render_block(&group.label, &notes, directive, ctx))
            }
        });
        let blocks: Vec<Vec<String>> = join_all(futures)
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        Ok(blocks
            .iter()
            .map(|lines| lines.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}
