//! Error types for the evaluation API client.
//!
//! # Design
//! Failures fall into two kinds. An *application* error means the backend
//! answered with an envelope whose `code` is not 200. Everything else is a
//! *transport* error and is handed back exactly as the layer below produced
//! it: a network failure or timeout from the transport, a non-2xx status
//! seen before any envelope, or a body that does not decode.

use std::time::Duration;

use thiserror::Error;

/// Message used when a failed envelope carries no usable `message`.
pub const FALLBACK_MESSAGE: &str = "Error";

/// Failures raised by a [`Transport`](crate::transport::Transport) before a
/// response exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connection refused, DNS failure, broken pipe and friends.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Errors returned by `EvalClient` parse methods and `EvaluationApi` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The envelope arrived with `code != 200`.
    #[error("{message}")]
    Application { code: i64, message: String },

    /// The transport failed before any response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned a non-2xx status, so there was no envelope to read.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body was not an envelope, or `data` did not match the
    /// expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Application,
    Transport,
}

impl ApiError {
    /// Builds an application error, substituting [`FALLBACK_MESSAGE`] when
    /// the backend sent no message or an empty one.
    pub fn application(code: i64, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
        ApiError::Application { code, message }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Application { .. } => ErrorKind::Application,
            ApiError::Transport(_)
            | ApiError::Http { .. }
            | ApiError::Deserialization(_)
            | ApiError::Serialization(_) => ErrorKind::Transport,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(TransportError::Timeout(_)))
    }
}
