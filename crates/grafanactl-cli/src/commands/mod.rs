//! Subcommand implementations, one module per top-level CLI verb.

pub mod config;
pub mod resources;
