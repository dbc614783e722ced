// ABOUTME: Shared HTTP client construction with connection pooling and timeout configuration
// ABOUTME: One client is built at startup and shared by every backend call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::warn;

use crate::config::HttpClientConfig;
use crate::constants::headers;

/// Create the backend HTTP client with the configured timeouts
///
/// Falls back to a default client if the builder fails, which only happens
/// when the TLS backend cannot be initialized.
#[must_use]
pub fn create_backend_client(config: &HttpClientConfig) -> Client {
    configured_builder(config).build().unwrap_or_else(|e| {
        warn!("Failed to build configured HTTP client, using defaults: {e}");
        Client::new()
    })
}

/// Builder carrying the configured timeouts and the client identification header
fn configured_builder(config: &HttpClientConfig) -> ClientBuilder {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .user_agent(headers::CLIENT_INFO_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accepts_default_timeouts() {
        assert!(configured_builder(&HttpClientConfig::default()).build().is_ok());
    }
}
