//! Chat-completion transport seam.
//!
//! The engine never speaks HTTP itself. Each actor hands a [`ChatRequest`] to
//! a shared [`ChatTransport`] and classifies whatever comes back.

use async_trait::async_trait;
use loadtest_core::{ChatMessage, ErrorKind, Identity};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// One chat-completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// Reply to a chat-completion call.
///
/// Streaming transports report time to first token and throughput; for
/// non-streamed replies both are left `None` and estimated by the actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub time_to_first_token: Option<Duration>,
    pub tokens_per_second: Option<f64>,
}

impl ChatResponse {
    pub fn new(content: impl Into<String>, prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            content: content.into(),
            prompt_tokens,
            completion_tokens,
            time_to_first_token: None,
            tokens_per_second: None,
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Failures a transport can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Request canceled")]
    Canceled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

impl TransportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::Network(_) => ErrorKind::Network,
            TransportError::HttpStatus { .. } => ErrorKind::HttpStatus,
            TransportError::Timeout(_) => ErrorKind::Timeout,
            TransportError::Decode(_) => ErrorKind::Decode,
            TransportError::Canceled => ErrorKind::Canceled,
            TransportError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
        }
    }

    /// Cancellation and deadline errors end the actor; everything else only
    /// fails the current request.
    pub fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }
}

/// Sends chat-completion requests on behalf of an identity.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(
        &self,
        identity: &Identity,
        request: ChatRequest,
    ) -> Result<ChatResponse, TransportError>;
}
