//! Error types for selector parsing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SelectorError>;

/// A selector string failed to parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid selector {command:?}: {reason}")]
pub struct InvalidSelector {
    pub command: String,
    pub reason: String,
}

impl InvalidSelector {
    pub fn new(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error(transparent)]
    Invalid(#[from] InvalidSelector),
}
