//! Error types for the filesystem reader/writer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FsError>;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("reading {path}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("writing {path}")]
    Write { path: String, #[source] source: std::io::Error },

    #[error("creating directory {path}")]
    CreateDir { path: String, #[source] source: std::io::Error },

    #[error("decoding {path}")]
    Parse { path: String, #[source] source: grafanactl_codec::CodecError },

    #[error("encoding {path}")]
    Encode { path: String, #[source] source: grafanactl_codec::CodecError },

    #[error("resource has no name")]
    MissingName,

    #[error("reader task panicked")]
    TaskPanicked(#[source] tokio::task::JoinError),
}
