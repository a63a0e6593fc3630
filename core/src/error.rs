//! Error types for the REST client facade.
//!
//! # Design
//! Construction failures (`InvalidHost`, `CertificateFile`) and per-call
//! failures share one enum so every public operation returns the same
//! `Result`. Non-2xx responses land in `Status` carrying only the numeric
//! code: its `Display` is the bare decimal code and the response body is
//! dropped. Transport and decode errors are wrapped without rewording.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`crate::ClientBuilder::build`] and the request methods
/// of [`crate::RestClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured host is not an absolute URL.
    #[error("invalid host url {host:?}: {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },

    /// The custom CA certificate file could not be read.
    #[error("failed to read certificate file {}: {source}", .path.display())]
    CertificateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Prefix + path did not resolve against the host URL.
    #[error("invalid request path {reference:?}: {source}")]
    InvalidPath {
        reference: String,
        #[source]
        source: url::ParseError,
    },

    /// The request never produced a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered outside `200..=299`.
    #[error("{0}")]
    Status(u16),

    /// The response body was not valid JSON for the destination type.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Status code of a [`ClientError::Status`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// Failures raised by a [`crate::Transport`] while sending a request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    /// DNS, connect, TLS or socket failure.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The request could not be turned into a wire request (bad header value,
    /// bad URI).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}
