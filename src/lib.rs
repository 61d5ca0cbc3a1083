//! Snipboard core - ordered record store for a clipboard/snippet manager.
//!
//! This library implements the data layer of a clipboard history and
//! template (canned phrase) manager: a single memo table holding both
//! record kinds, folder grouping for templates, and the ordering maintainer
//! that keeps each scope's manual `display_order` ranks dense across
//! inserts, promotes, moves, and drag reorders. A UI shell binds to
//! [`AppContext`] for async access or to [`MemoStore`] directly.
//!
//! # Architecture
//! - `models`: Domain types (Memo, Scope, Selection, list entries)
//! - `database`: SQLite persistence (records + preference key/value table)
//! - `ordering`: Dense-rank maintenance, one transaction per change
//! - `settings`: Typed preferences governing duplicate/move-to-top behavior
//! - `store`: Main synchronous API
//! - `context`: Process-scoped context with the async task facade

mod context;
mod database;
mod models;
mod ordering;
mod settings;
mod store;

pub use context::AppContext;
pub use database::{Database, DatabaseError, DatabaseResult};
pub use models::*;
pub use settings::Settings;
pub use store::{MemoStore, StoreError, StoreResult};
