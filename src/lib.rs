//! Shellkeep - versioned offline cache for single-page app shells
//!
//! Populates one named cache store per deployed version from a static
//! resource manifest, prunes stale versions on activation, and serves
//! intercepted requests from the cache with no network fallback.

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod manifest;
pub mod store;
pub mod ui;

pub use error::{ShellkeepError, ShellkeepResult};
