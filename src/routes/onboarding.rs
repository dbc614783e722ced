// ABOUTME: Onboarding route handler for the initial profile submission
// ABOUTME: Authenticates the caller and delegates estimation and persistence to the onboarding service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bodyweight_core::models::OnboardingRequest;
use bytes::Bytes;

use super::parse_json;
use crate::constants::routes;
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::OnboardingService;

/// Onboarding routes
pub struct OnboardingRoutes;

impl OnboardingRoutes {
    /// Create all onboarding routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(routes::COMPLETE_ONBOARDING, post(Self::handle_complete))
            .with_state(resources)
    }

    /// Handle onboarding submission
    async fn handle_complete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let user = resources.auth_middleware.authenticate_request(&headers).await?;
        let request: OnboardingRequest = parse_json(&body)?;

        let service = OnboardingService::new(resources);
        let response = service.complete(&user, request).await?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
