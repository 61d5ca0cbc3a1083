//! `MemoStore` — the synchronous public API over database, ordering and
//! settings.
//!
//! Each structural operation reads the preferences that govern it, then
//! performs its shift/insert/renumber sequence inside a single transaction,
//! so an interrupted operation never leaves a scope with duplicated or
//! missing ranks. Moving a template between folders is the deliberate
//! exception: only `folder` is reassigned and the source scope keeps a gap
//! in its ranks, which listing tolerates because order is read via sort.

use std::path::Path;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::database::{self, Database, DatabaseError};
use crate::models::{
    BatchOutcome, CaptureOutcome, FolderEntry, Memo, MoveOutcome, Scope, Selection,
    TemplateListEntry,
};
use crate::ordering;
use crate::settings::Settings;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("content must not be empty")]
    EmptyContent,
    #[error("an identical entry already exists in this folder")]
    Duplicate,
    #[error("no record with id {0}")]
    NotFound(i64),
    #[error("operation was abandoned before completing")]
    Cancelled,
    #[error("no data directory available")]
    NoDataDir,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub type StoreResult<T> = Result<T, StoreError>;

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// The record store: history entries plus folder-grouped templates.
#[derive(Clone)]
pub struct MemoStore {
    db: Database,
    settings: Settings,
}

impl MemoStore {
    /// Open or create a store at the given database path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::finish_open(Database::open(path)?)
    }

    /// In-memory store for testing.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::finish_open(Database::open_in_memory()?)
    }

    fn finish_open(db: Database) -> StoreResult<Self> {
        // Backfill ranks for rows created before manual ordering existed.
        let renumbered = db.transaction(|tx| {
            let mut renumbered = 0usize;
            for scope in ordering::all_scopes(tx)? {
                if ordering::backfill_ranks(tx, &scope)? {
                    renumbered += 1;
                }
            }
            Ok(renumbered)
        })?;
        if renumbered > 0 {
            info!(scopes = renumbered, "assigned display ranks to legacy records");
        }
        let settings = Settings::new(db.clone());
        Ok(Self { db, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ─────────────────────────────────────────────────────────────────────
    // History capture
    // ─────────────────────────────────────────────────────────────────────

    /// Capture external text (copy / share / process-text) into history.
    ///
    /// Blank text is rejected. With duplicates disallowed and an identical
    /// entry present, the move-to-top preference decides between promoting
    /// the existing record (fresh timestamp, rank 0, records above it +1)
    /// and leaving it untouched.
    pub fn capture_text(&self, text: &str) -> StoreResult<CaptureOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyContent);
        }
        let allow_duplicates = self.settings.allow_duplicate_history();
        let promote = self.settings.move_to_top();
        let now = now_millis();

        let outcome = self.db.transaction(|tx| {
            if !allow_duplicates {
                if let Some(existing) = ordering::find_duplicate(tx, &Scope::History, text, &[])? {
                    if promote {
                        ordering::move_to_top(tx, &Scope::History, existing.id, now)?;
                        return Ok(CaptureOutcome::MovedToTop(existing.id));
                    }
                    return Ok(CaptureOutcome::AlreadySaved(existing.id));
                }
            }
            let id = ordering::insert_top(tx, &Scope::History, text, now)?;
            Ok(CaptureOutcome::Saved(id))
        })?;
        debug!(?outcome, "captured text");
        Ok(outcome)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Templates
    // ─────────────────────────────────────────────────────────────────────

    /// Create a template at the top of the destination folder scope.
    /// Rejects blank content, and duplicates when the preference disallows
    /// them.
    pub fn add_template(&self, text: &str, folder: Option<&str>) -> StoreResult<i64> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyContent);
        }
        let allow_duplicates = self.settings.allow_duplicate_templates();
        let scope = Scope::Templates(folder.map(str::to_owned));
        let now = now_millis();

        let inserted = self.db.transaction(|tx| {
            if !allow_duplicates && ordering::find_duplicate(tx, &scope, text, &[])?.is_some() {
                return Ok(None);
            }
            Ok(Some(ordering::insert_top(tx, &scope, text, now)?))
        })?;
        match inserted {
            Some(id) => {
                debug!(id, folder, "added template");
                Ok(id)
            }
            None => Err(StoreError::Duplicate),
        }
    }

    /// Batch "add selected history to templates". Duplicates (against
    /// records that existed before the batch) and blank entries are skipped
    /// and counted; the rest are inserted at the top with their relative
    /// order preserved, exactly as if captured one at a time.
    pub fn add_templates(&self, texts: &[String], folder: Option<&str>) -> StoreResult<BatchOutcome> {
        let allow_duplicates = self.settings.allow_duplicate_templates();
        let scope = Scope::Templates(folder.map(str::to_owned));
        let now = now_millis();

        let outcome = self.db.transaction(|tx| {
            let mut to_insert: Vec<&str> = Vec::with_capacity(texts.len());
            let mut skipped = 0usize;
            for text in texts {
                let text = text.trim();
                if text.is_empty() {
                    skipped += 1;
                    continue;
                }
                if !allow_duplicates && ordering::find_duplicate(tx, &scope, text, &[])?.is_some() {
                    skipped += 1;
                    continue;
                }
                to_insert.push(text);
            }
            ordering::insert_batch_top(tx, &scope, &to_insert, now)?;
            Ok(BatchOutcome {
                added: to_insert.len(),
                skipped,
            })
        })?;
        debug!(added = outcome.added, skipped = outcome.skipped, folder, "batch template add");
        Ok(outcome)
    }

    /// Move templates to another folder (or out of any folder). Only
    /// `folder` is reassigned; neither the source nor destination scope is
    /// renumbered, so the source may keep a gap in its ranks. Duplicates in
    /// the destination (excluding the moving set) are skipped and counted.
    pub fn move_templates(&self, ids: &[i64], folder: Option<&str>) -> StoreResult<MoveOutcome> {
        let allow_duplicates = self.settings.allow_duplicate_templates();
        let target = Scope::Templates(folder.map(str::to_owned));

        let outcome = self.db.transaction(|tx| {
            let mut outcome = MoveOutcome::default();
            for &id in ids {
                let memo = match database::get_memo(tx, id)? {
                    Some(m) if m.is_template => m,
                    _ => {
                        warn!(id, "skipping move of missing or non-template record");
                        outcome.skipped += 1;
                        continue;
                    }
                };
                if !allow_duplicates
                    && ordering::find_duplicate(tx, &target, &memo.content, ids)?.is_some()
                {
                    outcome.skipped += 1;
                    continue;
                }
                tx.execute(
                    "UPDATE memos SET folder = ?1 WHERE id = ?2",
                    rusqlite::params![folder, id],
                )
                .map_err(DatabaseError::from)?;
                outcome.moved += 1;
            }
            Ok(outcome)
        })?;
        debug!(moved = outcome.moved, skipped = outcome.skipped, folder, "moved templates");
        Ok(outcome)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reordering
    // ─────────────────────────────────────────────────────────────────────

    /// Commit a drag reorder: `ordered_ids` is the scope's new top-to-bottom
    /// order and each record gets its list index as its rank. Ids that do
    /// not belong to the scope are ignored. Cancelling a reorder is purely a
    /// UI concern and never reaches the store.
    pub fn reorder(&self, scope: &Scope, ordered_ids: &[i64]) -> StoreResult<()> {
        let scope = scope.clone();
        let ordered_ids = ordered_ids.to_vec();
        self.db.transaction(|tx| {
            let in_scope: std::collections::HashSet<i64> =
                database::scope_memos(tx, &scope)?.iter().map(|m| m.id).collect();
            let accepted: Vec<i64> = ordered_ids
                .iter()
                .copied()
                .filter(|id| {
                    let ok = in_scope.contains(id);
                    if !ok {
                        warn!(id, "ignoring reorder of record outside scope");
                    }
                    ok
                })
                .collect();
            ordering::assign_ranks(tx, &accepted)?;
            Ok(())
        })?;
        debug!(count = ordered_ids.len(), "committed reorder");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Edits and deletion
    // ─────────────────────────────────────────────────────────────────────

    /// Replace a record's content. Blank content is rejected.
    pub fn update_content(&self, id: i64, text: &str) -> StoreResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyContent);
        }
        if self.db.update_content(id, text)? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }

    pub fn delete_memo(&self, id: i64) -> StoreResult<()> {
        if self.db.delete_memo(id)? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }

    /// Bulk delete of a mixed selection. Folder entries cascade to every
    /// member template; missing template ids are tolerated. Returns the
    /// number of records removed.
    pub fn delete_selection(&self, selection: &[Selection]) -> StoreResult<usize> {
        let selection = selection.to_vec();
        let deleted = self.db.transaction(|tx| {
            let mut deleted = 0usize;
            for entry in &selection {
                match entry {
                    Selection::Folder(name) => {
                        deleted += tx
                            .execute(
                                "DELETE FROM memos WHERE isTemplate = 1 AND folder = ?1",
                                [name],
                            )
                            .map_err(DatabaseError::from)?;
                    }
                    Selection::Template(id) => {
                        deleted += tx
                            .execute("DELETE FROM memos WHERE id = ?1", [id])
                            .map_err(DatabaseError::from)?;
                    }
                }
            }
            Ok(deleted)
        })?;
        info!(deleted, "deleted selection");
        Ok(deleted)
    }

    /// Delete a folder: removes every template whose folder equals `name`.
    /// Returns the number of templates removed.
    pub fn delete_folder(&self, name: &str) -> StoreResult<usize> {
        self.delete_selection(&[Selection::Folder(name.to_owned())])
    }

    /// Rename a folder by rewriting `folder` on exactly its members.
    /// Returns the number of templates updated.
    pub fn rename_folder(&self, old: &str, new: &str) -> StoreResult<usize> {
        let new = new.trim();
        if new.is_empty() {
            return Err(StoreError::EmptyContent);
        }
        let (old, new) = (old.to_owned(), new.to_owned());
        let updated = self.db.transaction(|tx| {
            tx.execute(
                "UPDATE memos SET folder = ?1 WHERE isTemplate = 1 AND folder = ?2",
                rusqlite::params![new, old],
            )
            .map_err(DatabaseError::from)
        })?;
        info!(%old, %new, updated, "renamed folder");
        Ok(updated)
    }

    /// Wipe the history tab.
    pub fn clear_history(&self) -> StoreResult<usize> {
        Ok(self.db.clear_history()?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    pub fn memo(&self, id: i64) -> StoreResult<Option<Memo>> {
        Ok(self.db.memo(id)?)
    }

    /// History entries, newest (rank 0) first.
    pub fn history(&self) -> StoreResult<Vec<Memo>> {
        Ok(self.db.memos_in(&Scope::History)?)
    }

    /// Templates in one folder bucket, in display order.
    pub fn templates_in(&self, folder: Option<&str>) -> StoreResult<Vec<Memo>> {
        Ok(self
            .db
            .memos_in(&Scope::Templates(folder.map(str::to_owned)))?)
    }

    /// Distinct folder names.
    pub fn folders(&self) -> StoreResult<Vec<String>> {
        Ok(self.db.folders()?)
    }

    /// The template tab root: folders (with member counts) first, then
    /// ungrouped templates in display order.
    pub fn folder_listing(&self) -> StoreResult<Vec<TemplateListEntry>> {
        let mut entries = Vec::new();
        for name in self.db.folders()? {
            let count = self
                .db
                .memos_in(&Scope::Templates(Some(name.clone())))?
                .len();
            entries.push(TemplateListEntry::Folder(FolderEntry {
                name,
                template_count: count,
            }));
        }
        for memo in self.db.memos_in(&Scope::Templates(None))? {
            entries.push(TemplateListEntry::Template(memo));
        }
        Ok(entries)
    }

    /// Every template across folders, for the input-method keyboard view.
    pub fn all_templates(&self) -> StoreResult<Vec<Memo>> {
        Ok(self.db.all_templates()?)
    }

    /// Case-insensitive substring filter within a scope; empty query
    /// returns the whole scope.
    pub fn search(&self, scope: &Scope, query: &str) -> StoreResult<Vec<Memo>> {
        Ok(self.db.search(scope, query.trim())?)
    }
}
