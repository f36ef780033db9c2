//! Error types for the codec layer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unrecognised resource format for {0:?}")]
    UnrecognisedFormat(String),

    #[error("no codec registered for format {0:?}")]
    UnknownFormat(String),

    #[error("failed to decode {format} document: {source}")]
    Decode {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to encode {format} document: {source}")]
    Encode {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
