//! Error types for discovery.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("fetching API groups failed")]
    FetchGroups(#[source] reqwest::Error),

    #[error("fetching API resources for group {group:?} failed")]
    FetchResources {
        group: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server does not support API group {group:?}")]
    UnsupportedGroup { group: String },

    #[error("server does not support version {version:?} of group {group:?}")]
    UnsupportedVersion { group: String, version: String },

    #[error("server does not support API resource {group}/{kind}")]
    UnsupportedResource { group: String, kind: String },

    #[error("discovery task panicked")]
    TaskPanicked(#[source] tokio::task::JoinError),
}
