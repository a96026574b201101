mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

use crate::models::{Note, NoteId};

/// SQLite storage behind the reference notes service.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "stickies")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("server.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Note operations
    // ============================================================

    /// All notes, most recently created first.
    pub fn get_all_notes(&self) -> Result<Vec<Note>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, text, color, pinned FROM notes ORDER BY seq DESC",
        )?;

        let notes = stmt
            .query_map([], |row| {
                Ok(Note {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    color: row.get(2)?,
                    pinned: row.get::<_, i32>(3)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    pub fn get_note(&self, id: NoteId) -> Result<Option<Note>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let note = conn
            .query_row(
                "SELECT id, text, color, pinned FROM notes WHERE id = ?",
                [id],
                |row| {
                    Ok(Note {
                        id: row.get(0)?,
                        text: row.get(1)?,
                        color: row.get(2)?,
                        pinned: row.get::<_, i32>(3)? != 0,
                    })
                },
            )
            .optional()?;
        Ok(note)
    }

    /// Persist a note and return the stored copy.
    ///
    /// The client's id is kept unless another note already has it, in which
    /// case the note gets one past the highest id in use.
    pub fn create_note(&self, input: Note) -> Result<Note> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM notes WHERE id = ?)",
            [input.id],
            |row| row.get(0),
        )?;
        let id = if taken {
            let max: NoteId = conn.query_row("SELECT MAX(id) FROM notes", [], |row| row.get(0))?;
            let next = max
                .checked_add(1)
                .ok_or_else(|| anyhow::anyhow!("No free note id above {}", max))?;
            tracing::debug!("Note id {} taken, assigning {}", input.id, next);
            next
        } else {
            input.id
        };

        conn.execute(
            "INSERT INTO notes (id, text, color, pinned, created_at) VALUES (?, ?, ?, ?, ?)",
            (
                id,
                &input.text,
                &input.color,
                if input.pinned { 1 } else { 0 },
                Utc::now().to_rfc3339(),
            ),
        )?;

        Ok(Note { id, ..input })
    }

    pub fn delete_note(&self, id: NoteId) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM notes WHERE id = ?", [id])?;
        Ok(rows > 0)
    }
}
