//! Parses the selector DSL used to scope pull/push/delete/validate operations:
//! `kind[.version].group]][/uid[,uid...]]`.

pub mod error;
pub mod filter;
pub mod selector;

pub use error::{InvalidSelector, Result, SelectorError};
pub use filter::{Filter, Filters};
pub use selector::{parse, parse_all, PartialGvk, Selector, SelectorKind, Selectors};
