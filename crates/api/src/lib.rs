//! Completion collaborator boundary.
//!
//! This crate exposes the single operation the suggestion engine needs from
//! the outside world: turn a prompt into a short completion fragment. It
//! provides:
//!
//! - [`CompletionService`], the trait the engine depends on
//! - [`CompletionError`], the one failure type callers handle
//! - [`CompletionClient`], a reqwest implementation posting a fixed
//!   two-message chat exchange to a configured endpoint
//!
//! # Example
//!
//! ```ignore
//! use ghostfill_api::{CompletionClient, CompletionService};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let client = CompletionClient::from_environment()?;
//! let fragment = client.complete("My favourite language is").await?;
//! println!("{fragment}");
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use thiserror::Error;

pub mod client;
pub mod config;
pub mod wire;

pub use client::CompletionClient;
pub use config::{API_KEY_ENV, CompletionConfig, ENDPOINT_ENV};

/// Failure returned by a completion request.
///
/// The variants exist for diagnostics only; callers treat every variant the
/// same way.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Network-level failure (connect, timeout, reading the body).
    #[error("completion transport error: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("completion service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The response body could not be interpreted as a completion.
    #[error("malformed completion response: {0}")]
    MalformedBody(String),
}

/// Produces a single completion fragment for a prompt.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Request one completion. Implementations issue at most one request and
    /// return the trimmed fragment.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[async_trait]
impl<T: CompletionService + ?Sized> CompletionService for std::sync::Arc<T> {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        (**self).complete(prompt).await
    }
}
