//! Local mirror of the note sequence.
//!
//! The mirror is a key-value slot holding the whole sequence as a JSON
//! array under [`NOTES_KEY`]. It is read once at startup and rewritten in
//! full after every change.

mod file;
mod memory;

pub use file::FileMirror;
pub use memory::MemoryMirror;

use thiserror::Error;

use crate::models::Note;

/// Key of the slot holding the serialized notes.
pub const NOTES_KEY: &str = "notes";

/// Local mirror errors.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Failed to access local storage: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored notes are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Synchronous storage for the serialized note sequence.
pub trait LocalMirror: Send + Sync {
    /// Read the stored sequence. `Ok(None)` when nothing was ever saved.
    fn load(&self) -> Result<Option<Vec<Note>>, MirrorError>;

    /// Replace the stored sequence.
    fn save(&self, notes: &[Note]) -> Result<(), MirrorError>;
}

fn decode(raw: &str) -> Result<Vec<Note>, MirrorError> {
    Ok(serde_json::from_str(raw)?)
}

fn encode(notes: &[Note]) -> Result<String, MirrorError> {
    Ok(serde_json::to_string(notes)?)
}
