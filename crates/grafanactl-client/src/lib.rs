//! A `reqwest`-based dynamic client for Grafana's Kubernetes-style
//! resource API, keyed by `Descriptor` and an implicit namespace.

pub mod client;
pub mod error;
pub mod options;

pub use client::{build_http_client, DynamicClient};
pub use error::{ClientError, Result};
pub use options::{DeleteOptions, GetOptions, ListOptions, WriteOptions};
