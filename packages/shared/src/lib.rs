//! Shared utilities for DoodleRush binaries and tests.
//!
//! - `logger`: tracing subscriber bootstrap
//! - `time`: clock abstraction and timestamp formatting

pub mod logger;
pub mod time;
