use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{decode, encode, LocalMirror, MirrorError, NOTES_KEY};
use crate::models::Note;

/// In-process key-value mirror.
///
/// Clones share the same slots, so a test can keep a handle and inspect
/// what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryMirror {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value stored under `key`, if any.
    pub fn raw(&self, key: &str) -> Option<String> {
        let slots = self.slots.lock().expect("mirror lock poisoned");
        slots.get(key).cloned()
    }

    /// Overwrite a slot with an arbitrary string, valid JSON or not.
    pub fn set_raw(&self, key: &str, value: impl Into<String>) {
        let mut slots = self.slots.lock().expect("mirror lock poisoned");
        slots.insert(key.to_string(), value.into());
    }
}

impl LocalMirror for MemoryMirror {
    fn load(&self) -> Result<Option<Vec<Note>>, MirrorError> {
        self.raw(NOTES_KEY).map(|raw| decode(&raw)).transpose()
    }

    fn save(&self, notes: &[Note]) -> Result<(), MirrorError> {
        let raw = encode(notes)?;
        self.set_raw(NOTES_KEY, raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mirror_loads_none() {
        let mirror = MemoryMirror::new();
        assert!(mirror.load().unwrap().is_none());
    }

    #[test]
    fn test_clones_share_slots() {
        let mirror = MemoryMirror::new();
        let handle = mirror.clone();
        mirror
            .save(&[Note {
                id: 1,
                text: "shared".to_string(),
                color: "#fff".to_string(),
                pinned: false,
            }])
            .unwrap();
        assert_eq!(handle.load().unwrap().unwrap()[0].text, "shared");
    }

    #[test]
    fn test_garbage_is_a_json_error() {
        let mirror = MemoryMirror::new();
        mirror.set_raw(NOTES_KEY, "{not json");
        assert!(matches!(mirror.load(), Err(MirrorError::Json(_))));
    }
}
