// ABOUTME: Analysis route handlers for muscle-group balance and training evolution
// ABOUTME: Authenticates the caller and delegates to the analysis service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;

use super::parse_optional_json;
use crate::constants::routes;
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::{AnalysisService, EvolutionRequest};

/// Query parameters of `GET /analyze-evolution`
#[derive(Debug, Deserialize)]
pub struct EvolutionQuery {
    /// Weeks analysed (string so that invalid values are ignored)
    pub weeks: Option<String>,
}

/// Analysis routes
pub struct AnalysisRoutes;

impl AnalysisRoutes {
    /// Create all analysis routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                routes::ANALYZE_MUSCLE_GROUPS,
                get(Self::handle_muscle_groups).post(Self::handle_muscle_groups),
            )
            .route(
                routes::ANALYZE_EVOLUTION,
                get(Self::handle_evolution_query).post(Self::handle_evolution_body),
            )
            .with_state(resources)
    }

    /// Handle the four-week muscle-group analysis
    async fn handle_muscle_groups(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = resources.auth_middleware.authenticate_request(&headers).await?;

        let service = AnalysisService::new(resources);
        let response = service.muscle_groups(&user).await?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle an evolution report sized by the `weeks` query parameter
    async fn handle_evolution_query(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(params): Query<EvolutionQuery>,
    ) -> Result<Response, AppError> {
        let user = resources.auth_middleware.authenticate_request(&headers).await?;
        let request = EvolutionRequest {
            weeks: params.weeks.and_then(|raw| raw.trim().parse().ok()),
        };

        let service = AnalysisService::new(resources);
        let response = service.evolution(&user, &request).await?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle an evolution report sized by an optional JSON body
    async fn handle_evolution_body(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let user = resources.auth_middleware.authenticate_request(&headers).await?;
        let request: EvolutionRequest = parse_optional_json(&body)?;

        let service = AnalysisService::new(resources);
        let response = service.evolution(&user, &request).await?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
