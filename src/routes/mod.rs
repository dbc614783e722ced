// ABOUTME: Route module organization for the Bodyweight server HTTP endpoints
// ABOUTME: Groups the function endpoints by domain and holds request body helpers shared by handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Route module for the Bodyweight server
//!
//! Each domain module contains only route definitions and thin handler
//! functions: authenticate, parse the body, delegate to a service, render JSON.

/// Muscle-group and evolution analysis routes
pub mod analysis;
/// Biometric lookup and manual update routes
pub mod biometrics;
/// Health check and readiness routes
pub mod health;
/// Training history routes
pub mod history;
/// Onboarding routes
pub mod onboarding;
/// Calculation and generation relay routes
pub mod relay;
/// Session feedback and current routine routes
pub mod sessions;

pub use analysis::AnalysisRoutes;
pub use biometrics::BiometricsRoutes;
pub use health::HealthRoutes;
pub use history::HistoryRoutes;
pub use onboarding::OnboardingRoutes;
pub use relay::RelayRoutes;
pub use sessions::SessionRoutes;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::errors::{AppError, AppResult};

/// Parse a JSON request body
///
/// # Errors
///
/// Returns a 400 when the body is empty or not valid JSON for `T`
pub fn parse_json<T: DeserializeOwned>(body: &Bytes) -> AppResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::invalid_input("Request body is required"));
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::invalid_input(format!("Invalid JSON body: {e}")))
}

/// Parse an optional JSON request body, using `T::default()` when empty
///
/// # Errors
///
/// Returns a 400 when a non-empty body is not valid JSON for `T`
pub fn parse_optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> AppResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_json(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_empty_body_handling() {
        assert!(parse_json::<Value>(&Bytes::from_static(b"  ")).is_err());
        assert_eq!(
            parse_optional_json::<Value>(&Bytes::new()).unwrap(),
            Value::Null
        );
        assert!(parse_optional_json::<Value>(&Bytes::from_static(b"{oops")).is_err());
    }
}
