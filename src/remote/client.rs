//! HTTP client for the notes service.
//!
//! Every non-2xx status becomes a [`ClientError`]; the caller decides what a
//! failure means for its state.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;

use super::{ClientError, RemoteNotes};
use crate::models::{Note, NoteId};

/// Default notes collection URL.
pub const DEFAULT_URL: &str = "http://localhost:5000/notes";

/// reqwest-backed [`RemoteNotes`].
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base_url: String,
    client: Client,
}

impl HttpRemote {
    /// Create a client for the collection at `base_url`, with no timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base(base_url.into()),
            client: Client::new(),
        }
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: trim_base(base_url.into()),
            client: builder.build()?,
        })
    }

    /// Client for the default local service.
    pub fn localhost() -> Self {
        Self::new(DEFAULT_URL)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url)
    }

    /// Handle response, converting HTTP errors to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            Err(status_error(status, response.text().await.unwrap_or_default()))
        }
    }

    /// Handle a response whose body is ignored.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(status_error(status, response.text().await.unwrap_or_default()))
        }
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn status_error(status: StatusCode, body: String) -> ClientError {
    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(body),
        StatusCode::BAD_REQUEST => ClientError::BadRequest(body),
        StatusCode::SERVICE_UNAVAILABLE => ClientError::Unavailable(body),
        _ => ClientError::Server(format!("{}: {}", status, body)),
    }
}

#[async_trait]
impl RemoteNotes for HttpRemote {
    async fn list(&self) -> Result<Vec<Note>, ClientError> {
        let response = self.request(Method::GET, "").send().await?;
        self.handle_response(response).await
    }

    async fn create(&self, note: &Note) -> Result<Note, ClientError> {
        let response = self.request(Method::POST, "").json(note).send().await?;
        self.handle_response(response).await
    }

    async fn delete(&self, id: NoteId) -> Result<(), ClientError> {
        let response = self
            .request(Method::DELETE, &format!("/{}", id))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }
}
