//! Core data models for the snippet store.
//!
//! A single record type (`Memo`) covers both clipboard history entries and
//! reusable templates; the `is_template` flag plus the optional `folder`
//! label decide which ordering scope a record belongs to.

use serde::{Deserialize, Serialize};

/// A stored record: either a captured history entry or a template snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    pub id: i64,
    pub content: String,
    /// Creation (or last-touched) time, unix milliseconds.
    pub created_at: i64,
    pub is_template: bool,
    /// Group label; only meaningful for templates. `None` = ungrouped.
    pub folder: Option<String>,
    /// Manual rank within the record's scope. Lower = closer to the top.
    pub display_order: i64,
}

impl Memo {
    /// The ordering scope this record belongs to.
    pub fn scope(&self) -> Scope {
        if self.is_template {
            Scope::Templates(self.folder.clone())
        } else {
            Scope::History
        }
    }
}

/// An ordering scope. `display_order` values are only comparable within
/// one scope; scopes never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// All history records.
    History,
    /// Templates sharing one folder value (`None` = the ungrouped bucket).
    Templates(Option<String>),
}

impl Scope {
    pub fn is_history(&self) -> bool {
        matches!(self, Scope::History)
    }

    /// Whether a record falls inside this scope.
    pub fn contains(&self, memo: &Memo) -> bool {
        match self {
            Scope::History => !memo.is_template,
            Scope::Templates(folder) => memo.is_template && &memo.folder == folder,
        }
    }
}

/// An entry in a mixed selection on the template tab root: either a whole
/// folder or a single template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    Folder(String),
    Template(i64),
}

/// A derived folder: distinct non-null `folder` value plus its member count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub name: String,
    pub template_count: usize,
}

/// A row in the template tab root view: folders first, then ungrouped
/// templates in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateListEntry {
    Folder(FolderEntry),
    Template(Memo),
}

/// Outcome of capturing external text into history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A new history record was created at the top.
    Saved(i64),
    /// An identical record existed and was moved to the top with a fresh
    /// timestamp.
    MovedToTop(i64),
    /// An identical record existed and was left untouched.
    AlreadySaved(i64),
}

impl CaptureOutcome {
    pub fn id(&self) -> i64 {
        match *self {
            CaptureOutcome::Saved(id)
            | CaptureOutcome::MovedToTop(id)
            | CaptureOutcome::AlreadySaved(id) => id,
        }
    }
}

/// Summary of a batch insert ("add selected to templates").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    pub added: usize,
    /// Items dropped by the duplicate policy (or blank).
    pub skipped: usize,
}

/// Summary of a batch folder move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    pub moved: usize,
    pub skipped: usize,
}

/// Normalize text for a one-line preview: skip leading whitespace, collapse
/// runs of whitespace to single spaces, truncate at `max_chars` with an
/// ellipsis.
pub fn normalize_preview(text: &str, max_chars: usize) -> String {
    let mut result = String::with_capacity(max_chars + 1);
    let mut chars = text.chars().peekable();

    while chars.peek().map(|c| c.is_whitespace()).unwrap_or(false) {
        chars.next();
    }

    let mut last_was_space = false;
    let mut count = 0;

    for ch in chars {
        if count >= max_chars {
            result.push('…');
            return result;
        }

        let ch = match ch {
            '\n' | '\t' | '\r' => ' ',
            c => c,
        };

        if ch == ' ' {
            if last_was_space {
                continue;
            }
            last_was_space = true;
        } else {
            last_was_space = false;
        }

        result.push(ch);
        count += 1;
    }

    while result.ends_with(' ') {
        result.pop();
    }

    result
}

/// Clamp text to at most `max_lines` lines for list display, appending an
/// ellipsis when content was cut. Backs the max-display-lines preference.
pub fn preview_lines(text: &str, max_lines: usize) -> String {
    if max_lines == 0 {
        return String::new();
    }
    let mut lines = text.lines();
    let mut result: String = lines.by_ref().take(max_lines).collect::<Vec<_>>().join("\n");
    if lines.next().is_some() {
        result.push('…');
    }
    result
}
