// ABOUTME: Bearer authentication for function endpoints
// ABOUTME: Extracts the Authorization token and resolves it to a user via the auth provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use http::{header::AUTHORIZATION, HeaderMap};
use tracing::{field, Span};

use crate::backend::{AuthProvider, AuthenticatedUser};
use crate::constants::headers::BEARER_PREFIX;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;

/// Token carried by the `Authorization` header, if any
///
/// The `Bearer ` prefix is stripped when present; an empty token counts as absent.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// Authenticates requests by bearer token
#[derive(Clone)]
pub struct BearerAuthenticator {
    provider: Arc<dyn AuthProvider>,
}

impl BearerAuthenticator {
    /// Create an authenticator backed by `provider`
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the caller of a request
    ///
    /// # Errors
    ///
    /// Returns a 401 `Unauthorized` error when the token is missing or the auth
    /// provider does not accept it. The provider's reason is only logged.
    #[tracing::instrument(
        skip(self, headers),
        fields(user_id = field::Empty, success = field::Empty)
    )]
    pub async fn authenticate_request(&self, headers: &HeaderMap) -> AppResult<AuthenticatedUser> {
        let Some(token) = bearer_token(headers) else {
            Span::current().record("success", false);
            AppLogger::log_auth_event("anonymous", "bearer", false, Some("missing token"));
            return Err(AppError::auth_required());
        };

        match self.provider.get_user(token).await {
            Ok(mut user) => {
                Span::current()
                    .record("user_id", user.id.as_str())
                    .record("success", true);
                AppLogger::log_auth_event(&user.id, "bearer", true, None);
                if user.access_token.is_empty() {
                    token.clone_into(&mut user.access_token);
                }
                Ok(user)
            }
            Err(e) => {
                Span::current().record("success", false);
                AppLogger::log_auth_event("anonymous", "bearer", false, Some(&e.to_string()));
                Err(AppError::auth_invalid("Unauthorized"))
            }
        }
    }
}
