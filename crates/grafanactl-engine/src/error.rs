//! Error types surfaced at the batch level (not per-resource — those are
//! recorded into an `OperationSummary` instead).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("discovery failed")]
    Discovery(#[from] grafanactl_discovery::DiscoveryError),

    #[error("listing the universe of preferred resources failed")]
    Client(#[from] grafanactl_client::ClientError),

    #[error("engine task panicked")]
    TaskPanicked(#[from] tokio::task::JoinError),
}
