//! Network clients for the text and image generation providers.
//!
//! Every client reports failure through [`ProviderError`]; the fallback
//! chains decide what to try next.

pub mod chat;
pub mod dalle;
pub mod placeholder;
pub mod prompt;
pub mod replicate;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{GeneratedCopy, GenerationRequest};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} is not configured")] Unavailable(&'static str),
    #[error("HTTP error: {0}")] Transport(String),
    #[error("invalid payload: {0}")] InvalidPayload(#[from] PayloadError),
    #[error("job failed: {0}")] JobFailed(String),
    #[error("timed out after {attempts} status checks")] Timeout { attempts: u32 },
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Why a provider response was rejected by the schema check.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("response carried no content")] Empty,
    #[error("malformed JSON: {0}")] Malformed(String),
    #[error("missing required field `{0}`")] MissingField(&'static str),
}

pub type ProviderOutcome<T> = Result<T, ProviderError>;

/// Decodes a successful response body. A body that is not the expected JSON
/// is a payload error, not a transport one.
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ProviderOutcome<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| PayloadError::Malformed(e.to_string()).into())
}

#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Short identifier used in logs and content markers.
    fn name(&self) -> &'static str;
    /// Telemetry `api_type` tag for this provider.
    fn api_type(&self) -> &'static str;
    fn is_available(&self) -> bool;
    async fn generate_copy(&self, request: &GenerationRequest) -> ProviderOutcome<GeneratedCopy>;
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn api_type(&self) -> &'static str;
    fn is_available(&self) -> bool;
    /// Returns the URL of the generated image.
    async fn generate_image(&self, request: &GenerationRequest) -> ProviderOutcome<String>;
}
