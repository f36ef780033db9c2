//! Error types for configuration loading and namespace resolution.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("reading config file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("writing config file {path}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("context {name:?} not found")]
    ContextNotFound { name: String },

    #[error("no current context set")]
    NoCurrentContext,

    #[error("fetching bootdata from {server}")]
    Bootdata {
        server: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("bootdata response from {server} had no settings.namespace field")]
    BootdataMissingNamespace { server: String },
}
