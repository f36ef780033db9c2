//! Error types for the resource data model

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResourceError>;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("resource has no name")]
    MissingName,

    #[error("resource has no kind")]
    MissingKind,

    #[error("invalid apiVersion {0:?}")]
    InvalidApiVersion(String),
}
