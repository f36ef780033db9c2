//! Standard exit codes for CLI operations.

#![allow(dead_code)]

/// Success - operation completed without errors.
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure.
pub const ERROR: i32 = 1;

/// Validation error - server rejected a resource under dry-run.
pub const VALIDATION_ERROR: i32 = 2;

/// Config error - missing/unreadable context, invalid context reference.
pub const CONFIG_ERROR: i32 = 3;

/// Usage error - invalid arguments or selector syntax.
pub const USAGE_ERROR: i32 = 64;
