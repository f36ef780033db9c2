//! Bounded-concurrency pull/push/delete orchestration over the dynamic
//! client and the discovery registry.

pub mod delete;
pub mod error;
pub mod processor;
pub mod pull;
pub mod push;
pub mod summary;

pub use delete::{delete, DeleteOptions};
pub use error::{EngineError, Result};
pub use processor::{ExcludeManaged, Processor, ProcessorChain, StripServerFields};
pub use pull::{pull, PullOptions};
pub use push::{push, PushOptions};
pub use summary::{OperationFailure, OperationSummary};
