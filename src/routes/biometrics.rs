// ABOUTME: Biometric route handlers for latest-value lookup and manual updates
// ABOUTME: Thin handlers delegating to the biometrics service after bearer authentication
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bodyweight_core::models::BiometricUpdateRequest;
use bytes::Bytes;

use super::parse_json;
use crate::constants::routes;
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::BiometricsService;

/// Biometric routes
pub struct BiometricsRoutes;

impl BiometricsRoutes {
    /// Create all biometric routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                routes::GET_LATEST_BIOMETRICS,
                get(Self::handle_latest).post(Self::handle_latest),
            )
            .route(routes::UPDATE_BIOMETRICS, post(Self::handle_update))
            .with_state(resources)
    }

    /// Handle latest biometrics lookup; any request body is ignored
    async fn handle_latest(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = resources.auth_middleware.authenticate_request(&headers).await?;

        let service = BiometricsService::new(resources);
        let latest = service.latest(&user).await?;

        Ok((StatusCode::OK, Json(latest)).into_response())
    }

    /// Handle manual biometric update
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let user = resources.auth_middleware.authenticate_request(&headers).await?;
        let update: BiometricUpdateRequest = parse_json(&body)?;

        let service = BiometricsService::new(resources);
        let response = service.update(&user, update).await?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
