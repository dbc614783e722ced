// ABOUTME: Training session route handlers for feedback and today's routine
// ABOUTME: Authenticates the caller and delegates to the feedback and routine services
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
use bodyweight_core::models::SaveFeedbackRequest;
use bytes::Bytes;

use super::parse_json;
use crate::constants::routes;
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::{FeedbackService, RoutineService};

/// Training session routes
pub struct SessionRoutes;

impl SessionRoutes {
    /// Create all session routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(routes::SAVE_SESSION_FEEDBACK, post(Self::handle_save_feedback))
            .route(
                routes::GET_CURRENT_ROUTINE,
                get(Self::handle_current_routine).post(Self::handle_current_routine),
            )
            .with_state(resources)
    }

    /// Handle session completion feedback
    async fn handle_save_feedback(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let user = resources.auth_middleware.authenticate_request(&headers).await?;
        let request: SaveFeedbackRequest = parse_json(&body)?;

        let service = FeedbackService::new(resources);
        let response = service.save(&user, request).await?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle today's routine lookup
    async fn handle_current_routine(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = resources.auth_middleware.authenticate_request(&headers).await?;

        let service = RoutineService::new(resources);
        let response = service.current(&user).await?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
