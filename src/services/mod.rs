// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Each service turns an authenticated request into datastore and remote function calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Domain service layer
//!
//! Route handlers authenticate and parse; services validate, compute what is
//! local, and talk to the backend through the traits held in
//! [`ServerResources`](crate::resources::ServerResources). Server-side
//! failures are logged here with their detail and replaced by a short public
//! message before they reach the client.

/// Muscle-group balance and training evolution analysis
pub mod analysis;
/// Biometric retrieval and manual updates
pub mod biometrics;
/// Session feedback, progression, performance and weekly metrics
pub mod feedback;
/// Paged training history with summaries
pub mod history;
/// Onboarding submission and initial snapshot
pub mod onboarding;
/// Relays to remote calculation and generation functions
pub mod relay;
/// Today's planned routine
pub mod routines;

pub use analysis::{AnalysisService, EvolutionRequest};
pub use biometrics::BiometricsService;
pub use feedback::FeedbackService;
pub use history::HistoryService;
pub use onboarding::OnboardingService;
pub use relay::{RelayService, RelayTarget};
pub use routines::RoutineService;

use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::errors::AppError;
use crate::logging::AppLogger;

/// Current UTC calendar day
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Log `error` in full and return a 500 carrying only `public_message`
pub(crate) fn conceal(
    user_id: &str,
    operation: &str,
    public_message: &'static str,
) -> impl FnOnce(AppError) -> AppError {
    let user_id = user_id.to_owned();
    let operation = operation.to_owned();
    move |error| {
        AppLogger::log_server_error(Some(&user_id), &operation, &error.to_string());
        AppError::internal(public_message).with_source(error)
    }
}

/// Positive finite number stored under `key`, treating zero and null as absent
pub(crate) fn positive_number(row: &Value, key: &str) -> Option<f64> {
    row.get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite() && *v != 0.0)
}

/// Non-empty string stored under `key`
pub(crate) fn non_empty_str<'a>(row: &'a Value, key: &str) -> Option<&'a str> {
    row.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Whether a JSON value counts as provided: not null, false, zero, or an empty string
pub(crate) fn is_provided(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_provided() {
        assert!(!is_provided(&json!(null)));
        assert!(!is_provided(&json!(0)));
        assert!(!is_provided(&json!("")));
        assert!(is_provided(&json!([])));
        assert!(is_provided(&json!("s-1")));
    }

    #[test]
    fn test_positive_number_skips_zero() {
        let row = json!({ "height": 0, "weight": 70.5 });
        assert_eq!(positive_number(&row, "height"), None);
        assert_eq!(positive_number(&row, "weight"), Some(70.5));
        assert_eq!(positive_number(&row, "missing"), None);
    }
}
