//! Shared HTTP client for backend calls.

use anyhow::{Context, Result};
use std::time::Duration;

/// Per-request timeout for backend HTTP calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build the client shared by every backend in one `search` invocation.
///
/// Backends set their own per-request headers; the client carries none.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")
}
