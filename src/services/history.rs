// ABOUTME: Training history service returning a filtered, paged list of the caller's sessions
// ABOUTME: Adds completion and adherence summaries plus per-category exercise statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use bodyweight_core::models::{HistoryStatus, SessionRecord, TrainingHistoryRequest};
use bodyweight_intelligence::history::{exercise_statistics, summarize};
use bodyweight_intelligence::{ExerciseStatistics, HistorySummary};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::conceal;
use crate::backend::{AuthenticatedUser, RowQuery};
use crate::constants::{messages, tables};
use crate::errors::AppResult;
use crate::logging::AppLogger;
use crate::resources::ServerResources;

/// Session columns always returned
const SESSION_COLUMNS: &str = "id,session_date,status,planned_duration,actual_duration,\
intensity_target,ica_score,notes,created_at,updated_at";
/// Session exercise columns returned with `include_exercises`
const EXERCISE_COLUMNS: &str = "id,exercise_id,block_order,block_type,sets_planned,reps_planned,\
sets_completed,reps_completed,rest_seconds,target_rpe,rpe_reported,technical_quality,\
duration_seconds,notes,exercises(id,name,category,difficulty_level,progression_level,\
muscle_groups,instructions)";
/// Per-set columns returned with `include_performance`
const PERFORMANCE_COLUMNS: &str = "exercise_performance(id,set_number,reps_completed,weight_used,\
rpe_reported,technique_quality,rest_time_actual,difficulty_perceived,notes)";

/// Column list for a history request
fn history_columns(request: &TrainingHistoryRequest) -> String {
    if !request.include_exercises() {
        return SESSION_COLUMNS.to_owned();
    }
    if request.include_performance() {
        format!("{SESSION_COLUMNS},session_exercises({EXERCISE_COLUMNS},{PERFORMANCE_COLUMNS})")
    } else {
        format!("{SESSION_COLUMNS},session_exercises({EXERCISE_COLUMNS})")
    }
}

/// Page position of a history response
#[derive(Debug, Serialize)]
pub struct Pagination {
    /// Page size applied
    pub limit: usize,
    /// Sessions skipped
    pub offset: usize,
    /// Sessions on this page
    pub total_returned: usize,
    /// Whether the page was full
    pub has_more: bool,
}

/// Filters applied to a history response
#[derive(Debug, Serialize)]
pub struct AppliedFilters {
    /// Status filter
    pub status: HistoryStatus,
    /// Earliest session date
    pub start_date: Option<NaiveDate>,
    /// Latest session date
    pub end_date: Option<NaiveDate>,
    /// Whether exercises were embedded
    pub include_exercises: bool,
    /// Whether per-set performance was embedded
    pub include_performance: bool,
}

/// Body returned by `GET|POST /get-training-history`
#[derive(Debug, Serialize)]
pub struct TrainingHistoryResponse {
    /// Always `true`
    pub success: bool,
    /// Session rows, newest first
    pub training_history: Vec<Value>,
    /// Page position
    pub pagination: Pagination,
    /// Filters applied
    pub filters: AppliedFilters,
    /// Averages over the completed sessions on the page
    pub summary: HistorySummary,
    /// Exercise counts, present when exercises were embedded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_statistics: Option<ExerciseStatistics>,
}

/// Training history operations
pub struct HistoryService {
    resources: Arc<ServerResources>,
}

impl HistoryService {
    /// Create a service over the shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// One page of `user`'s sessions matching `request`, newest first
    ///
    /// # Errors
    ///
    /// Returns a generic 500 when the datastore query fails
    #[tracing::instrument(skip(self, user, request), fields(user_id = %user.id))]
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        request: &TrainingHistoryRequest,
    ) -> AppResult<TrainingHistoryResponse> {
        let limit = request.limit();
        let offset = request.offset();
        let status = request.status();

        let mut query = RowQuery::table(tables::TRAINING_SESSIONS)
            .select(&history_columns(request))
            .eq("user_id", &user.id);
        if let Some(value) = status.column_value() {
            query = query.eq("status", value);
        }
        if let Some(start) = request.start_date {
            query = query.gte("session_date", start);
        }
        if let Some(end) = request.end_date {
            query = query.lte("session_date", end);
        }
        let query = query.order("session_date.desc").offset(offset).limit(limit);

        let rows = self
            .resources
            .datastore
            .select(&user.access_token, &query)
            .await
            .map_err(conceal(&user.id, "get_training_history", messages::HISTORY_FAILED))?;

        let sessions: Vec<SessionRecord> = rows
            .iter()
            .filter_map(|row| match serde_json::from_value(row.clone()) {
                Ok(session) => Some(session),
                Err(e) => {
                    AppLogger::log_degraded_step(&user.id, "history_session_row", &e.to_string());
                    None
                }
            })
            .collect();
        debug!(returned = rows.len(), limit, offset, "Loaded training history");

        let include_exercises = request.include_exercises();
        Ok(TrainingHistoryResponse {
            success: true,
            pagination: Pagination {
                limit,
                offset,
                total_returned: rows.len(),
                has_more: rows.len() == limit,
            },
            filters: AppliedFilters {
                status,
                start_date: request.start_date,
                end_date: request.end_date,
                include_exercises,
                include_performance: request.include_performance(),
            },
            summary: summarize(&sessions),
            exercise_statistics: include_exercises.then(|| exercise_statistics(&sessions)),
            training_history: rows,
        })
    }
}
