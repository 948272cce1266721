//! Shared value types for `ppsync`: interface identifiers and ranges, MAC table entries,
//! the managed port-profile, device snapshots and the run configuration.

pub mod config;
pub mod macros;
pub mod network;
pub mod profile;
pub mod snapshot;

/// Tracing target used by [`success!`] so formatters can tell completions apart.
pub const SUCCESS_TARGET: &str = "ppsync::success";
