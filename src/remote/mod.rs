//! Remote collaborator holding the system-of-record copy of the notes.

mod client;

pub use client::{HttpRemote, DEFAULT_URL};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Note, NoteId};

/// Remote request errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Remote unavailable: {0}")]
    Unavailable(String),
}

/// CRUD surface of the notes service.
#[async_trait]
pub trait RemoteNotes: Send + Sync {
    /// Fetch the full note list.
    async fn list(&self) -> Result<Vec<Note>, ClientError>;

    /// Persist a note. The returned copy is canonical.
    async fn create(&self, note: &Note) -> Result<Note, ClientError>;

    /// Delete a note by id.
    async fn delete(&self, id: NoteId) -> Result<(), ClientError>;
}

#[async_trait]
impl<T: RemoteNotes + ?Sized> RemoteNotes for std::sync::Arc<T> {
    async fn list(&self) -> Result<Vec<Note>, ClientError> {
        (**self).list().await
    }

    async fn create(&self, note: &Note) -> Result<Note, ClientError> {
        (**self).create(note).await
    }

    async fn delete(&self, id: NoteId) -> Result<(), ClientError> {
        (**self).delete(id).await
    }
}
