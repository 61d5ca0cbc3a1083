//! `AppContext` — explicit process-scoped application context.
//!
//! One context is created at app start and disposed at app end; it owns the
//! store and fronts it with short-lived async tasks. Each task runs the
//! blocking store call on a Tokio blocking thread and marshals the result
//! back to the caller. Dropping the returned future abandons the task — no
//! compensating rollback is attempted — and nothing here serializes
//! overlapping operations beyond SQLite's own locking.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::info;

use crate::models::{
    BatchOutcome, CaptureOutcome, Memo, MoveOutcome, Scope, Selection, TemplateListEntry,
};
use crate::store::{MemoStore, StoreError, StoreResult};

const DB_FILE: &str = "memos.db";

/// Fallback Tokio runtime for callers outside any runtime context (e.g. an
/// FFI shell that drives futures itself). Shared across contexts, never
/// dropped.
static FALLBACK_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create fallback tokio runtime")
});

pub struct AppContext {
    store: Arc<MemoStore>,
}

impl AppContext {
    /// Open the context with the store at its default platform location
    /// (or an explicit data directory).
    pub fn open(data_dir: Option<&Path>) -> StoreResult<Self> {
        let dir: PathBuf = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::data_dir()
                .map(|d| d.join("snipboard"))
                .ok_or(StoreError::NoDataDir)?,
        };
        std::fs::create_dir_all(&dir)
            .map_err(crate::database::DatabaseError::from)?;
        let path = dir.join(DB_FILE);
        info!(path = %path.display(), "opening app context");
        Ok(Self {
            store: Arc::new(MemoStore::open(path)?),
        })
    }

    /// Context backed by an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            store: Arc::new(MemoStore::open_in_memory()?),
        })
    }

    /// Direct synchronous access to the store.
    pub fn store(&self) -> &Arc<MemoStore> {
        &self.store
    }

    /// Dispose the context. Dropping has the same effect; this exists so an
    /// app-end hook can make the teardown explicit.
    pub fn close(self) {
        info!("closing app context");
    }

    fn runtime_handle(&self) -> tokio::runtime::Handle {
        tokio::runtime::Handle::try_current().unwrap_or_else(|_| FALLBACK_RUNTIME.handle().clone())
    }

    /// Run one blocking store call on a background thread. A dropped future
    /// abandons the task; an aborted or panicked task surfaces as
    /// [`StoreError::Cancelled`].
    async fn run<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&MemoStore) -> StoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let handle = self.runtime_handle().spawn_blocking(move || f(&store));
        match handle.await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Cancelled),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Async facade over the structural operations
    // ─────────────────────────────────────────────────────────────────────

    pub async fn capture_text(&self, text: String) -> StoreResult<CaptureOutcome> {
        self.run(move |store| store.capture_text(&text)).await
    }

    pub async fn add_template(
        &self,
        text: String,
        folder: Option<String>,
    ) -> StoreResult<i64> {
        self.run(move |store| store.add_template(&text, folder.as_deref()))
            .await
    }

    pub async fn add_templates(
        &self,
        texts: Vec<String>,
        folder: Option<String>,
    ) -> StoreResult<BatchOutcome> {
        self.run(move |store| store.add_templates(&texts, folder.as_deref()))
            .await
    }

    pub async fn move_templates(
        &self,
        ids: Vec<i64>,
        folder: Option<String>,
    ) -> StoreResult<MoveOutcome> {
        self.run(move |store| store.move_templates(&ids, folder.as_deref()))
            .await
    }

    pub async fn reorder(&self, scope: Scope, ordered_ids: Vec<i64>) -> StoreResult<()> {
        self.run(move |store| store.reorder(&scope, &ordered_ids))
            .await
    }

    pub async fn delete_selection(&self, selection: Vec<Selection>) -> StoreResult<usize> {
        self.run(move |store| store.delete_selection(&selection))
            .await
    }

    pub async fn rename_folder(&self, old: String, new: String) -> StoreResult<usize> {
        self.run(move |store| store.rename_folder(&old, &new)).await
    }

    pub async fn update_content(&self, id: i64, text: String) -> StoreResult<()> {
        self.run(move |store| store.update_content(id, &text)).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Async reads for list refresh after a structural change
    // ─────────────────────────────────────────────────────────────────────

    pub async fn history(&self) -> StoreResult<Vec<Memo>> {
        self.run(|store| store.history()).await
    }

    pub async fn folder_listing(&self) -> StoreResult<Vec<TemplateListEntry>> {
        self.run(|store| store.folder_listing()).await
    }

    pub async fn templates_in(&self, folder: Option<String>) -> StoreResult<Vec<Memo>> {
        self.run(move |store| store.templates_in(folder.as_deref()))
            .await
    }

    pub async fn search(&self, scope: Scope, query: String) -> StoreResult<Vec<Memo>> {
        self.run(move |store| store.search(&scope, &query)).await
    }
}
