// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Reads listen address, backend credentials, and HTTP client timeouts from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration management for production deployment

use std::env;
use std::error::Error as StdError;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::constants::{defaults, env_vars};

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Hosted backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project base URL, without trailing slash
    pub url: String,
    /// Public project key, sent as `apikey` on every call
    pub anon_key: String,
    /// Privileged key used by relays that call remote functions on the user's behalf
    pub service_role_key: Option<String>,
}

impl BackendConfig {
    /// Validate and normalize a backend URL
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an absolute http(s) URL
    pub fn normalize_url(raw: &str) -> Result<String> {
        let url = Url::parse(raw.trim()).with_context(|| format!("Invalid SUPABASE_URL: {raw}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("SUPABASE_URL must use http or https, got {}", url.scheme());
        }
        Ok(url.as_str().trim_end_matches('/').to_owned())
    }
}

/// Outbound HTTP client timeouts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::HTTP_CLIENT_TIMEOUT_SECS,
            connect_timeout_secs: defaults::HTTP_CLIENT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// HTTP listen address
    pub host: IpAddr,
    /// Deployment environment
    pub environment: Environment,
    /// Hosted backend
    pub backend: BackendConfig,
    /// Outbound HTTP client
    pub http_client: HttpClientConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails to parse
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            http_port: parse_env_or(env_vars::HTTP_PORT, defaults::HTTP_PORT)?,
            host: parse_env_or(
                env_vars::HOST,
                IpAddr::from_str(defaults::HOST).context("Invalid default host")?,
            )?,
            environment: Environment::from_str_or_default(
                &env::var(env_vars::ENVIRONMENT).unwrap_or_default(),
            ),
            backend: BackendConfig {
                url: BackendConfig::normalize_url(&required_env(env_vars::SUPABASE_URL)?)?,
                anon_key: required_env(env_vars::SUPABASE_ANON_KEY)?,
                service_role_key: optional_env(env_vars::SUPABASE_SERVICE_ROLE_KEY),
            },
            http_client: HttpClientConfig {
                timeout_secs: parse_env_or(
                    env_vars::HTTP_CLIENT_TIMEOUT_SECS,
                    defaults::HTTP_CLIENT_TIMEOUT_SECS,
                )?,
                connect_timeout_secs: parse_env_or(
                    env_vars::HTTP_CLIENT_CONNECT_TIMEOUT_SECS,
                    defaults::HTTP_CLIENT_CONNECT_TIMEOUT_SECS,
                )?,
            },
        };

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Socket address the HTTP server binds to
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.http_port)
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Bodyweight Server Configuration: listen={}, environment={}, backend={}, service_role={}, http_timeout={}s, connect_timeout={}s",
            self.bind_addr(),
            self.environment,
            self.backend.url,
            if self.backend.service_role_key.is_some() {
                "configured"
            } else {
                "missing"
            },
            self.http_client.timeout_secs,
            self.http_client.connect_timeout_secs,
        )
    }
}

/// Required environment variable; empty counts as missing
fn required_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("{key} environment variable is required"))
}

/// Optional environment variable; empty counts as missing
fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    optional_env(key).map_or(Ok(default), |value| {
        value
            .parse()
            .with_context(|| format!("Invalid {key} value: {value}"))
    })
}
