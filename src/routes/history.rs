// ABOUTME: Training history route handlers accepting filters as query parameters or a JSON body
// ABOUTME: Authenticates the caller and delegates paging and summaries to the history service
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
use bodyweight_core::models::history::calendar_day;
use bodyweight_core::models::{HistoryStatus, TrainingHistoryRequest};
use bytes::Bytes;
use serde::Deserialize;

use super::parse_optional_json;
use crate::constants::{messages, routes};
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::services::HistoryService;

/// Query parameters of `GET /get-training-history`
///
/// Kept as strings so that unparsable values are ignored rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Page size
    pub limit: Option<String>,
    /// Sessions skipped
    pub offset: Option<String>,
    /// Status filter
    pub status: Option<String>,
    /// Earliest session date, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// Latest session date, `YYYY-MM-DD`
    pub end_date: Option<String>,
    /// `true` or `false`
    pub include_exercises: Option<String>,
    /// `true` or `false`
    pub include_performance: Option<String>,
}

impl HistoryQuery {
    /// History request named by these parameters
    ///
    /// # Errors
    ///
    /// Returns a 400 when `status` names no known status
    pub fn into_request(self) -> AppResult<TrainingHistoryRequest> {
        let status = self
            .status
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                HistoryStatus::parse(raw).ok_or_else(|| AppError::invalid_input(messages::INVALID_STATUS))
            })
            .transpose()?;
        let number = |raw: Option<String>| raw.and_then(|v| v.trim().parse::<i64>().ok());
        let flag = |raw: Option<String>| raw.and_then(|v| v.parse::<bool>().ok());

        Ok(TrainingHistoryRequest {
            limit: number(self.limit),
            offset: number(self.offset),
            status,
            start_date: self.start_date.as_deref().and_then(calendar_day),
            end_date: self.end_date.as_deref().and_then(calendar_day),
            include_exercises: flag(self.include_exercises),
            include_performance: flag(self.include_performance),
        })
    }
}

/// Training history routes
pub struct HistoryRoutes;

impl HistoryRoutes {
    /// Create all history routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                routes::GET_TRAINING_HISTORY,
                get(Self::handle_history_query).post(Self::handle_history_body),
            )
            .with_state(resources)
    }

    /// Handle a history lookup filtered by query parameters
    async fn handle_history_query(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(params): Query<HistoryQuery>,
    ) -> Result<Response, AppError> {
        let user = resources.auth_middleware.authenticate_request(&headers).await?;
        let request = params.into_request()?;

        let service = HistoryService::new(resources);
        let response = service.list(&user, &request).await?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle a history lookup filtered by an optional JSON body
    async fn handle_history_body(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let user = resources.auth_middleware.authenticate_request(&headers).await?;
        let request: TrainingHistoryRequest = parse_optional_json(&body)?;

        let service = HistoryService::new(resources);
        let response = service.list(&user, &request).await?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
