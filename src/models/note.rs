use serde::{Deserialize, Serialize};

/// Identifier of a note: the creation time in milliseconds since the epoch.
pub type NoteId = i64;

/// Color given to notes created without an explicit one.
pub const DEFAULT_COLOR: &str = "#ffeb3b";

/// A sticky note.
///
/// The `id` is assigned once when the note is drafted and never changes.
/// The server may echo back a different id on create; from then on the
/// server's copy is canonical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub pinned: bool,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Note {
    /// Build an unpinned note stamped with the current time.
    pub fn draft(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: chrono::Utc::now().timestamp_millis(),
            text: text.into(),
            color: color.into(),
            pinned: false,
        }
    }
}

/// The composer's input fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub text: String,
    pub color: String,
}

impl Default for NoteDraft {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: default_color(),
        }
    }
}

/// Order notes for display: pinned first, otherwise keeping the given order.
pub fn sort_for_display(notes: &[Note]) -> Vec<Note> {
    let mut sorted = notes.to_vec();
    // sort_by_key is stable, so equal pin states keep their relative order
    sorted.sort_by_key(|n| !n.pinned);
    sorted
}

/// Check that `value` is a `#rgb` or `#rrggbb` hex color.
pub fn is_hex_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}
