// ABOUTME: Relay route handlers forwarding to remote calculation and generation functions
// ABOUTME: Each endpoint shapes the remote request body and relays selected result fields
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
use bytes::Bytes;
use serde_json::Value;

use super::parse_optional_json;
use crate::constants::routes;
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::{RelayService, RelayTarget};

/// Relay routes
pub struct RelayRoutes;

impl RelayRoutes {
    /// Create all relay routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(routes::CALCULATE_ICA, post(Self::handle_calculate_ica))
            .route(routes::GENERATE_ROUTINE, post(Self::handle_generate_routine))
            .route(routes::UPDATE_PROGRESSIONS, post(Self::handle_update_progressions))
            .with_state(resources)
    }

    /// Handle adherence index calculation; the remote function reads no body
    async fn handle_calculate_ica(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = resources.auth_middleware.authenticate_request(&headers).await?;

        let service = RelayService::new(resources);
        let response = service
            .relay(&user, RelayTarget::CALCULATE_ICA, &Value::Null)
            .await?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle routine generation
    async fn handle_generate_routine(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let user = resources.auth_middleware.authenticate_request(&headers).await?;
        let request: Value = parse_optional_json(&body)?;

        let service = RelayService::new(resources);
        let response = service
            .relay(
                &user,
                RelayTarget::GENERATE_ROUTINE,
                &RelayService::generate_routine_body(&request),
            )
            .await?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle progression updates for a session
    async fn handle_update_progressions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let user = resources.auth_middleware.authenticate_request(&headers).await?;
        let request: Value = parse_optional_json(&body)?;
        let remote_body = RelayService::update_progressions_body(&request)?;

        let service = RelayService::new(resources);
        let response = service
            .relay(&user, RelayTarget::UPDATE_PROGRESSIONS, &remote_body)
            .await?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
