use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{decode, encode, LocalMirror, MirrorError, NOTES_KEY};
use crate::models::Note;

/// Mirror backed by one JSON file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileMirror {
    dir: PathBuf,
}

impl FileMirror {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Mirror in the platform data directory.
    pub fn open_default() -> anyhow::Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "stickies")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(Self::new(dirs.data_dir()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl LocalMirror for FileMirror {
    fn load(&self) -> Result<Option<Vec<Note>>, MirrorError> {
        let raw = match fs::read_to_string(self.slot_path(NOTES_KEY)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        decode(&raw).map(Some)
    }

    fn save(&self, notes: &[Note]) -> Result<(), MirrorError> {
        fs::create_dir_all(&self.dir)?;
        let raw = encode(notes)?;
        // Write then rename so a crash mid-write never leaves a torn file
        let path = self.slot_path(NOTES_KEY);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
