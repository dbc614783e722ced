// ABOUTME: Relay service forwarding authenticated requests to remote calculation functions
// ABOUTME: Picks the credential per function and passes through a fixed set of result fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};

use super::{conceal, is_provided};
use crate::backend::AuthenticatedUser;
use crate::constants::{functions, messages};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::resources::ServerResources;

/// Bearer credential presented to a remote function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    /// The project's service-role key
    ServiceRole,
    /// The caller's own access token
    UserToken,
}

/// A remote function and how its result is relayed
#[derive(Debug, Clone, Copy)]
pub struct RelayTarget {
    /// Remote function name
    pub function: &'static str,
    /// Credential sent with the call
    pub credential: Credential,
    /// Result fields copied into the response
    pub fields: &'static [&'static str],
    /// Message returned when the call fails
    pub failure_message: &'static str,
}

impl RelayTarget {
    /// Adherence/performance index
    pub const CALCULATE_ICA: Self = Self {
        function: functions::CALCULATE_ICA,
        credential: Credential::ServiceRole,
        fields: &[
            "ica_score",
            "adherence_rate",
            "recent_performance",
            "recommendations",
            "user_state",
        ],
        failure_message: messages::ICA_FAILED,
    };

    /// Routine generation
    pub const GENERATE_ROUTINE: Self = Self {
        function: functions::GENERATE_ROUTINE,
        credential: Credential::UserToken,
        fields: &["trainingPlan", "sessions"],
        failure_message: messages::ROUTINE_FAILED,
    };

    /// Progression updates for a completed session
    pub const UPDATE_PROGRESSIONS: Self = Self {
        function: functions::UPDATE_PROGRESSIONS,
        credential: Credential::ServiceRole,
        fields: &["session", "exerciseBlocks", "progressionUpdates"],
        failure_message: messages::PROGRESSIONS_FAILED,
    };
}

/// Relay operations
pub struct RelayService {
    resources: Arc<ServerResources>,
}

impl RelayService {
    /// Create a service over the shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Body for `generate-routine`; `daysToGenerate` defaults to one day
    #[must_use]
    pub fn generate_routine_body(request: &Value) -> Value {
        let days = request
            .get("daysToGenerate")
            .cloned()
            .unwrap_or_else(|| Value::from(1));
        let mut body = Map::new();
        body.insert("daysToGenerate".to_owned(), days);
        Value::Object(body)
    }

    /// Body for `update-progressions`
    ///
    /// # Errors
    ///
    /// Returns a 400 when `sessionId` or `exerciseBlocks` is missing
    pub fn update_progressions_body(request: &Value) -> AppResult<Value> {
        let field = |name: &str| request.get(name).filter(|v| is_provided(v)).cloned();
        let (Some(session_id), Some(blocks)) = (field("sessionId"), field("exerciseBlocks")) else {
            return Err(AppError::missing_fields(messages::MISSING_REQUIRED_FIELDS));
        };
        let mut body = Map::new();
        body.insert("sessionId".to_owned(), session_id);
        body.insert("exerciseBlocks".to_owned(), blocks);
        Ok(Value::Object(body))
    }

    /// Call `target` with `body` on behalf of `user`
    ///
    /// # Errors
    ///
    /// Returns a 500 carrying the target's failure message when the credential
    /// is unavailable or the remote call fails
    #[tracing::instrument(skip(self, user, body), fields(user_id = %user.id, function = target.function))]
    pub async fn relay(
        &self,
        user: &AuthenticatedUser,
        target: RelayTarget,
        body: &Value,
    ) -> AppResult<Value> {
        let hide = || conceal(&user.id, target.function, target.failure_message);

        let bearer = match target.credential {
            Credential::UserToken => user.access_token.as_str(),
            Credential::ServiceRole => self.resources.service_role_key().ok_or_else(|| {
                hide()(AppError::config_missing(
                    "SUPABASE_SERVICE_ROLE_KEY is not configured",
                ))
            })?,
        };

        let started = Instant::now();
        let result = self
            .resources
            .functions
            .invoke(target.function, bearer, body)
            .await;
        AppLogger::log_function_call(
            &user.id,
            target.function,
            result.is_ok(),
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );

        let remote = result.map_err(hide())?;
        Ok(relayed_fields(&remote, target.fields))
    }
}

/// `{success: true}` plus each of `fields` present in `remote`
fn relayed_fields(remote: &Value, fields: &[&str]) -> Value {
    let mut response = Map::new();
    response.insert("success".to_owned(), Value::Bool(true));
    for &field in fields {
        if let Some(value) = remote.get(field) {
            response.insert(field.to_owned(), value.clone());
        }
    }
    Value::Object(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relayed_fields_drop_extras() {
        let remote = json!({ "ica_score": 0.82, "internal": true, "user_state": "fresh" });
        let relayed = relayed_fields(&remote, RelayTarget::CALCULATE_ICA.fields);
        assert_eq!(
            relayed,
            json!({ "success": true, "ica_score": 0.82, "user_state": "fresh" })
        );
    }

    #[test]
    fn test_generate_routine_days_default() {
        assert_eq!(
            RelayService::generate_routine_body(&json!({})),
            json!({ "daysToGenerate": 1 })
        );
        assert_eq!(
            RelayService::generate_routine_body(&json!({ "daysToGenerate": 7 })),
            json!({ "daysToGenerate": 7 })
        );
    }

    #[test]
    fn test_update_progressions_requires_both_fields() {
        let err = RelayService::update_progressions_body(&json!({ "sessionId": "s-1" })).unwrap_err();
        assert_eq!(err.message, "Missing required fields");
        assert!(RelayService::update_progressions_body(
            &json!({ "sessionId": "s-1", "exerciseBlocks": [] })
        )
        .is_ok());
    }
}
