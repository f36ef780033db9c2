//! Error types for the dynamic client facade.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Transport/API errors, classified by the status-code mapping in the
/// API's response.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{kind} {name:?} not found")]
    NotFound { kind: String, name: String },

    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16, body: String },

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("building TLS client configuration")]
    TlsConfig(#[source] reqwest::Error),

    #[error("invalid {material} in connection TLS config: {reason}")]
    InvalidTlsMaterial { material: &'static str, reason: String },

    #[error("decoding response body from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
