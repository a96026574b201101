//! The note store: view state plus its local and remote mirrors.
//!
//! # Responsibility
//! - Own the in-memory note sequence and the composer draft.
//! - Rewrite the local mirror after every change to the sequence.
//! - Round-trip creates and deletes through the remote before applying them.
//!
//! # Invariants
//! - Edits, pin toggles and color changes never reach the remote.
//! - A failed or cancelled remote call leaves the sequence untouched.
//! - A successful remote fetch replaces the sequence wholesale.
//! - A fetch response is dropped if a newer fetch was issued after it.
//! - Notes created in this session are ordered by when `add` was issued,
//!   newest first, whatever order the responses arrive in.
//! - The state lock is never held across an `.await`.

mod operations;

pub use operations::{OperationId, OperationKind, PendingOperation};

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mirror::LocalMirror;
use crate::models::{sort_for_display, Note, NoteDraft, NoteId};
use crate::remote::{ClientError, RemoteNotes};
use operations::Operations;

/// Store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Remote request failed: {0}")]
    Remote(#[from] ClientError),

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("Superseded by a newer fetch")]
    Superseded,

    #[error("Note not found: {0}")]
    NotFound(NoteId),
}

/// Where the store is in its startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    Uninitialized,
    LoadingLocal,
    LoadingRemote,
    Ready,
}

struct Shared {
    notes: Vec<Note>,
    draft: NoteDraft,
    phase: LoadPhase,
    operations: Operations,
    next_seq: u64,
    latest_fetch: u64,
    /// Issue sequence of each note created through `add` since the last fetch.
    created: HashMap<NoteId, u64>,
}

struct Inner<L, R> {
    local: L,
    remote: R,
    shared: Mutex<Shared>,
}

/// Sticky note store over a [`LocalMirror`] and a [`RemoteNotes`] service.
///
/// Clones share state, so one task can cancel an operation another is
/// awaiting.
pub struct NoteStore<L, R> {
    inner: Arc<Inner<L, R>>,
}

impl<L, R> Clone for NoteStore<L, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: LocalMirror, R: RemoteNotes> NoteStore<L, R> {
    pub fn new(local: L, remote: R) -> Self {
        Self {
            inner: Arc::new(Inner {
                local,
                remote,
                shared: Mutex::new(Shared {
                    notes: Vec::new(),
                    draft: NoteDraft::default(),
                    phase: LoadPhase::Uninitialized,
                    operations: Operations::default(),
                    next_seq: 0,
                    latest_fetch: 0,
                    created: HashMap::new(),
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.inner.shared.lock().expect("store lock poisoned")
    }

    /// Write the sequence to the local mirror. Failures are logged only;
    /// the in-memory sequence stays authoritative.
    fn persist(&self, notes: &[Note]) {
        if let Err(e) = self.inner.local.save(notes) {
            tracing::error!("Error saving notes to local storage: {}", e);
        }
    }

    // ============================================================
    // Reads
    // ============================================================

    /// The note sequence in storage order.
    pub fn notes(&self) -> Vec<Note> {
        self.lock().notes.clone()
    }

    /// The note sequence in display order: pinned first.
    pub fn display_order(&self) -> Vec<Note> {
        sort_for_display(&self.lock().notes)
    }

    pub fn phase(&self) -> LoadPhase {
        self.lock().phase
    }

    pub fn draft(&self) -> NoteDraft {
        self.lock().draft.clone()
    }

    pub fn pending_operations(&self) -> Vec<PendingOperation> {
        self.lock().operations.list()
    }

    // ============================================================
    // Startup
    // ============================================================

    /// Seed from the local mirror, then replace with the remote list.
    ///
    /// On remote failure the local notes remain and the error is returned.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        self.load_local();
        self.refresh().await
    }

    /// Seed the sequence from the local mirror. A missing or unreadable
    /// mirror means no notes.
    pub fn load_local(&self) {
        self.lock().phase = LoadPhase::LoadingLocal;

        let notes = match self.inner.local.load() {
            Ok(Some(notes)) => notes,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable local notes: {}", e);
                Vec::new()
            }
        };
        tracing::debug!("Loaded {} notes from local storage", notes.len());

        let mut shared = self.lock();
        shared.notes = notes;
        self.persist(&shared.notes);
    }

    /// Fetch the remote list and replace the sequence with it.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let seq = {
            let mut shared = self.lock();
            shared.phase = LoadPhase::LoadingRemote;
            shared.next_seq += 1;
            shared.latest_fetch = shared.next_seq;
            shared.next_seq
        };

        let result = self
            .run_remote(OperationKind::Fetch, self.inner.remote.list())
            .await;

        let mut shared = self.lock();
        if seq != shared.latest_fetch {
            tracing::debug!("Discarding fetch #{} superseded by #{}", seq, shared.latest_fetch);
            return match result {
                Ok(_) => Err(StoreError::Superseded),
                Err(e) => Err(e),
            };
        }
        shared.phase = LoadPhase::Ready;

        match result {
            Ok(notes) => {
                tracing::info!("Fetched {} notes from remote", notes.len());
                shared.notes = notes;
                shared.created.clear();
                self.persist(&shared.notes);
                Ok(())
            }
            Err(e) => {
                log_failure("fetching notes", &e);
                Err(e)
            }
        }
    }

    // ============================================================
    // Remote-backed mutations
    // ============================================================

    /// Create a note remotely, then put the server's copy at the front.
    ///
    /// Blank text is a no-op returning `Ok(None)` without a remote call.
    pub async fn add(&self, text: &str, color: &str) -> Result<Option<Note>, StoreError> {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring blank note");
            return Ok(None);
        }

        let draft = Note::draft(text, color);
        let seq = {
            let mut shared = self.lock();
            shared.next_seq += 1;
            shared.next_seq
        };

        let saved = match self
            .run_remote(OperationKind::Create, self.inner.remote.create(&draft))
            .await
        {
            Ok(saved) => saved,
            Err(e) => {
                log_failure("adding note", &e);
                return Err(e);
            }
        };

        let mut guard = self.lock();
        let shared = &mut *guard;
        // Skip past notes from adds issued after this one
        let created = &shared.created;
        let at = shared
            .notes
            .iter()
            .take_while(|n| created.get(&n.id).is_some_and(|s| *s > seq))
            .count();
        shared.notes.insert(at, saved.clone());
        shared.created.insert(saved.id, seq);
        shared.draft.text.clear();
        self.persist(&shared.notes);

        tracing::info!("Added note {}", saved.id);
        Ok(Some(saved))
    }

    /// Add whatever is in the composer draft.
    pub async fn submit_draft(&self) -> Result<Option<Note>, StoreError> {
        let draft = self.draft();
        self.add(&draft.text, &draft.color).await
    }

    /// Delete a note remotely, then drop it from the sequence.
    pub async fn delete(&self, id: NoteId) -> Result<(), StoreError> {
        if let Err(e) = self
            .run_remote(OperationKind::Delete(id), self.inner.remote.delete(id))
            .await
        {
            log_failure("deleting note", &e);
            return Err(e);
        }

        let mut shared = self.lock();
        shared.notes.retain(|n| n.id != id);
        shared.created.remove(&id);
        self.persist(&shared.notes);

        tracing::info!("Deleted note {}", id);
        Ok(())
    }

    // ============================================================
    // Local-only mutations
    // ============================================================

    /// Replace a note's text.
    pub fn edit(&self, id: NoteId, text: impl Into<String>) -> Result<Note, StoreError> {
        let text = text.into();
        self.update(id, |n| n.text = text)
    }

    /// Flip a note's pinned flag.
    pub fn toggle_pin(&self, id: NoteId) -> Result<Note, StoreError> {
        self.update(id, |n| n.pinned = !n.pinned)
    }

    /// Replace a note's color.
    pub fn change_color(&self, id: NoteId, color: impl Into<String>) -> Result<Note, StoreError> {
        let color = color.into();
        self.update(id, |n| n.color = color)
    }

    fn update(&self, id: NoteId, apply: impl FnOnce(&mut Note)) -> Result<Note, StoreError> {
        let mut shared = self.lock();
        let note = shared
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(StoreError::NotFound(id))?;
        apply(note);
        let updated = note.clone();
        self.persist(&shared.notes);
        Ok(updated)
    }

    // ============================================================
    // Draft
    // ============================================================

    pub fn set_draft_text(&self, text: impl Into<String>) {
        self.lock().draft.text = text.into();
    }

    pub fn set_draft_color(&self, color: impl Into<String>) {
        self.lock().draft.color = color.into();
    }

    // ============================================================
    // Cancellation
    // ============================================================

    /// Cancel one pending remote call. Returns false if it already finished.
    pub fn cancel(&self, id: OperationId) -> bool {
        let cancelled = self.lock().operations.cancel(id);
        if cancelled {
            tracing::info!("Cancelled operation {}", id);
        }
        cancelled
    }

    /// Cancel every pending remote call, returning how many there were.
    pub fn cancel_all(&self) -> usize {
        self.lock().operations.cancel_all()
    }

    /// Await `call` unless the operation is cancelled first.
    async fn run_remote<T>(
        &self,
        kind: OperationKind,
        call: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, StoreError> {
        let (id, token) = self.lock().operations.register(kind);
        tracing::debug!("Started {:?} as operation {}", kind, id);

        let result = tokio::select! {
            _ = token.cancelled() => Err(StoreError::Cancelled),
            r = call => r.map_err(StoreError::from),
        };

        // A cancel that landed after the call resolved still wins
        if !self.lock().operations.finish(id) {
            return Err(StoreError::Cancelled);
        }
        result
    }
}

fn log_failure(action: &str, err: &StoreError) {
    match err {
        StoreError::Cancelled => tracing::info!("Cancelled {}", action),
        _ => tracing::error!("Error {}: {}", action, err),
    }
}
