//! Error types for the cars API client.
//!
//! # Design
//! One variant per way a round trip can fail, in the order the client checks
//! them: URL, transport, response shape, status/body, payload. Only the car
//! listing surfaces these to callers; brands and writes collapse them.

use thiserror::Error;

use crate::types::Operation;

/// Boxed cause carried by [`ClientError::Transport`].
pub type TransportCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while building requests or classifying responses.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The target URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The transport failed before any response arrived.
    #[error("transport failure: {0}")]
    Transport(#[source] TransportCause),

    /// Something came back, but not an HTTP response.
    #[error("no HTTP response")]
    NoResponse,

    /// An HTTP response arrived without the body the operation needs.
    #[error("response has no body")]
    NoBody,

    /// The server answered with a status the operation does not accept.
    #[error("unexpected status code {0}")]
    UnexpectedStatus(u16),

    /// The response body is not the JSON the operation expects.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// Update and delete address an existing car and need its id.
    #[error("cannot {0} a car without an id")]
    MissingId(Operation),

    /// The car could not be encoded as a request body.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The client configuration was rejected at construction.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Wrap any error (or message) as a transport failure.
    pub fn transport(cause: impl Into<TransportCause>) -> Self {
        ClientError::Transport(cause.into())
    }

    /// The HTTP status this error carries, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::UnexpectedStatus(code) => Some(*code),
            _ => None,
        }
    }
}
