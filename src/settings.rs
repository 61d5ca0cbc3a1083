//! Typed preference store.
//!
//! Preferences live in the `settings` key/value table and are read
//! synchronously right before a structural operation decides its behavior.
//! Keys are namespaced the way the app keeps two preference groups: one for
//! the history tab, one for the template tab.

use serde_json::Value;
use tracing::warn;

use crate::database::{Database, DatabaseResult};

// History tab.
const HISTORY_ALLOW_DUPLICATES: &str = "history.allow_duplicates";
const HISTORY_MOVE_TO_TOP: &str = "history.move_to_top";
const HISTORY_AUTO_CLOSE: &str = "history.auto_close";

// Template tab.
const TEMPLATE_ALLOW_DUPLICATES: &str = "template.allow_duplicates";
const TEMPLATE_AUTO_CLOSE: &str = "template.auto_close";
const TEMPLATE_MAX_LINES: &str = "template.max_lines";

const DEFAULT_MAX_LINES: i64 = 3;

/// Preference accessor over the shared database. Cheap to clone.
#[derive(Clone)]
pub struct Settings {
    db: Database,
}

impl Settings {
    pub(crate) fn new(db: Database) -> Self {
        Self { db }
    }

    // ─────────────────────────────────────────────────────────────────────
    // History preferences
    // ─────────────────────────────────────────────────────────────────────

    /// Whether identical history captures create a second record.
    pub fn allow_duplicate_history(&self) -> bool {
        self.bool_or(HISTORY_ALLOW_DUPLICATES, false)
    }

    pub fn set_allow_duplicate_history(&self, value: bool) -> DatabaseResult<()> {
        self.set_bool(HISTORY_ALLOW_DUPLICATES, value)
    }

    /// Whether re-capturing an existing entry promotes it to the top.
    pub fn move_to_top(&self) -> bool {
        self.bool_or(HISTORY_MOVE_TO_TOP, true)
    }

    pub fn set_move_to_top(&self, value: bool) -> DatabaseResult<()> {
        self.set_bool(HISTORY_MOVE_TO_TOP, value)
    }

    /// Whether the host screen closes itself after a copy.
    pub fn auto_close_history(&self) -> bool {
        self.bool_or(HISTORY_AUTO_CLOSE, true)
    }

    pub fn set_auto_close_history(&self, value: bool) -> DatabaseResult<()> {
        self.set_bool(HISTORY_AUTO_CLOSE, value)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Template preferences
    // ─────────────────────────────────────────────────────────────────────

    /// Whether identical `(content, folder)` templates may coexist.
    pub fn allow_duplicate_templates(&self) -> bool {
        self.bool_or(TEMPLATE_ALLOW_DUPLICATES, false)
    }

    pub fn set_allow_duplicate_templates(&self, value: bool) -> DatabaseResult<()> {
        self.set_bool(TEMPLATE_ALLOW_DUPLICATES, value)
    }

    pub fn auto_close_templates(&self) -> bool {
        self.bool_or(TEMPLATE_AUTO_CLOSE, true)
    }

    pub fn set_auto_close_templates(&self, value: bool) -> DatabaseResult<()> {
        self.set_bool(TEMPLATE_AUTO_CLOSE, value)
    }

    /// Maximum lines shown per list row.
    pub fn max_lines(&self) -> i64 {
        self.int_or(TEMPLATE_MAX_LINES, DEFAULT_MAX_LINES)
    }

    pub fn set_max_lines(&self, value: i64) -> DatabaseResult<()> {
        self.db
            .set_setting(TEMPLATE_MAX_LINES, &Value::from(value.max(1)).to_string())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    /// Preference reads are best-effort: an unreadable or malformed value
    /// falls back to the default rather than failing the calling operation.
    fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.raw(key) {
            Some(Value::Bool(b)) => b,
            Some(other) => {
                warn!(key, value = %other, "ignoring malformed boolean preference");
                default
            }
            None => default,
        }
    }

    fn int_or(&self, key: &str, default: i64) -> i64 {
        match self.raw(key) {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
            Some(other) => {
                warn!(key, value = %other, "ignoring malformed integer preference");
                default
            }
            None => default,
        }
    }

    fn raw(&self, key: &str) -> Option<Value> {
        match self.db.setting(key) {
            Ok(Some(text)) => serde_json::from_str(&text).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "failed to read preference");
                None
            }
        }
    }

    fn set_bool(&self, key: &str, value: bool) -> DatabaseResult<()> {
        self.db.set_setting(key, &Value::from(value).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn defaults_match_app_behavior() {
        let s = settings();
        assert!(!s.allow_duplicate_history());
        assert!(!s.allow_duplicate_templates());
        assert!(s.move_to_top());
        assert!(s.auto_close_history());
        assert!(s.auto_close_templates());
        assert_eq!(s.max_lines(), 3);
    }

    #[test]
    fn writes_persist() {
        let s = settings();
        s.set_allow_duplicate_templates(true).unwrap();
        s.set_move_to_top(false).unwrap();
        s.set_max_lines(5).unwrap();
        assert!(s.allow_duplicate_templates());
        assert!(!s.move_to_top());
        assert_eq!(s.max_lines(), 5);
    }

    #[test]
    fn max_lines_floor_is_one() {
        let s = settings();
        s.set_max_lines(0).unwrap();
        assert_eq!(s.max_lines(), 1);
    }

    #[test]
    fn malformed_value_falls_back_to_default() {
        let s = settings();
        s.db.set_setting("history.move_to_top", "\"what\"").unwrap();
        assert!(s.move_to_top());
    }
}
