// ABOUTME: Analysis services for four-week muscle-group balance and multi-week training evolution
// ABOUTME: Reads performance, session, progression and metric rows and stores this week's group metrics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use bodyweight_core::models::{ExerciseProgression, PerformanceEntry, SessionRecord, WeeklyVolume};
use bodyweight_intelligence::evolution::{self, TrackedExercise};
use bodyweight_intelligence::muscle_balance::{self, relative_volume};
use bodyweight_intelligence::{AnalysisWindow, BalanceSummary, EvolutionAnalysis, MuscleGroupAnalysis};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{conceal, today};
use crate::backend::{AuthenticatedUser, RowQuery};
use crate::constants::{conflicts, messages, session_status, tables};
use crate::errors::AppResult;
use crate::logging::AppLogger;
use crate::resources::ServerResources;

/// Performance columns with the exercise's groups and level
const PERFORMANCE_COLUMNS: &str = "*, exercises (muscle_groups, progression_level)";
/// Completed-session columns read for evolution
const EVOLUTION_SESSION_COLUMNS: &str = "id, session_date, status, session_exercises (exercise_id, \
sets_planned, reps_planned, sets_completed, reps_completed, rpe_reported, technical_quality)";
/// Progression columns with the exercise name
const PROGRESSION_COLUMNS: &str = "*, exercises (id, name, category)";

/// Body returned by `GET|POST /analyze-muscle-groups`
#[derive(Debug, Serialize)]
pub struct MuscleGroupAnalysisResponse {
    /// Always `true`
    pub success: bool,
    /// One analysis per trained group, by group name
    pub muscle_group_analyses: Vec<MuscleGroupAnalysis>,
    /// Roll-up across groups
    pub summary: BalanceSummary,
}

/// Evolution analysis request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvolutionRequest {
    /// Weeks analysed, 12 when absent, at most 52
    pub weeks: Option<i64>,
}

/// Body returned by `GET|POST /analyze-evolution`
#[derive(Debug, Serialize)]
pub struct EvolutionResponse {
    /// Always `true`
    pub success: bool,
    /// Complete report
    pub analysis: EvolutionAnalysis,
}

/// Decode rows, logging and skipping the ones that do not fit `T`
fn decode_rows<T: DeserializeOwned>(user_id: &str, step: &str, rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                AppLogger::log_degraded_step(user_id, step, &e.to_string());
                None
            }
        })
        .collect()
}

/// Progression row with its catalogue name
fn tracked_exercise(row: Value) -> Result<TrackedExercise, serde_json::Error> {
    let name = row
        .get("exercises")
        .and_then(|exercise| exercise.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    let progression: ExerciseProgression = serde_json::from_value(row)?;
    Ok(TrackedExercise { progression, name })
}

/// Muscle-group and evolution analysis operations
pub struct AnalysisService {
    resources: Arc<ServerResources>,
}

impl AnalysisService {
    /// Create a service over the shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Analyse `user`'s muscle groups over the current week and the four before it,
    /// storing this week's metric row per group
    ///
    /// # Errors
    ///
    /// Returns a generic 500 when the performance query fails; metric writes are best-effort
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn muscle_groups(
        &self,
        user: &AuthenticatedUser,
    ) -> AppResult<MuscleGroupAnalysisResponse> {
        let window = AnalysisWindow::ending(today());
        let query = RowQuery::table(tables::EXERCISE_PERFORMANCE)
            .select(PERFORMANCE_COLUMNS)
            .eq("user_id", &user.id)
            .gte("session_date", window.first_week)
            .order("session_date.desc");

        let rows = self
            .resources
            .datastore
            .select(&user.access_token, &query)
            .await
            .map_err(conceal(&user.id, "analyze_muscle_groups", messages::MUSCLE_ANALYSIS_FAILED))?;
        let entries: Vec<PerformanceEntry> = decode_rows(&user.id, "performance_row", rows);

        let analyses = muscle_balance::analyze(&entries, window);
        self.store_weekly_metrics(user, window, &analyses).await;
        info!(
            groups = analyses.len(),
            records = entries.len(),
            "Analysed muscle groups"
        );

        Ok(MuscleGroupAnalysisResponse {
            success: true,
            summary: muscle_balance::summarize(&analyses),
            muscle_group_analyses: analyses,
        })
    }

    async fn store_weekly_metrics(
        &self,
        user: &AuthenticatedUser,
        window: AnalysisWindow,
        analyses: &[MuscleGroupAnalysis],
    ) {
        let updated_at = Utc::now().to_rfc3339();
        for analysis in analyses {
            let week = &analysis.current_week.volume;
            let row = json!({
                "user_id": user.id,
                "muscle_group": analysis.muscle_group,
                "week_start": window.current_week,
                "total_sets": week.total_sets,
                "total_reps": week.total_reps,
                "avg_rpe": week.avg_rpe,
                "exercises_attempted": week.total_sessions,
                "imbalance_score": analysis.imbalance_score,
                "relative_volume": relative_volume(analysis, analyses),
                "updated_at": updated_at,
            });
            if let Err(e) = self
                .resources
                .datastore
                .upsert(
                    &user.access_token,
                    tables::MUSCLE_GROUP_METRICS,
                    &row,
                    Some(conflicts::METRIC_PER_WEEK),
                )
                .await
            {
                AppLogger::log_degraded_step(
                    &user.id,
                    &format!("muscle_group_metrics:{}", analysis.muscle_group),
                    &e.to_string(),
                );
            }
        }
    }

    /// Report how `user`'s training evolved over the requested weeks
    ///
    /// # Errors
    ///
    /// Returns a generic 500 when any of the three datastore queries fails
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn evolution(
        &self,
        user: &AuthenticatedUser,
        request: &EvolutionRequest,
    ) -> AppResult<EvolutionResponse> {
        let today = today();
        let weeks = evolution::weeks_back(request.weeks);
        let since = evolution::window_start(today, weeks);

        let sessions_query = RowQuery::table(tables::TRAINING_SESSIONS)
            .select(EVOLUTION_SESSION_COLUMNS)
            .eq("user_id", &user.id)
            .eq("status", session_status::COMPLETED)
            .gte("session_date", since)
            .order("session_date.asc");
        let progressions_query = RowQuery::table(tables::USER_EXERCISE_PROGRESSIONS)
            .select(PROGRESSION_COLUMNS)
            .eq("user_id", &user.id)
            .eq("is_active", true);
        let metrics_query = RowQuery::table(tables::MUSCLE_GROUP_METRICS)
            .eq("user_id", &user.id)
            .gte("week_start", since)
            .order("week_start.asc");

        let datastore = &self.resources.datastore;
        let (sessions, progressions, metrics) = tokio::try_join!(
            datastore.select(&user.access_token, &sessions_query),
            datastore.select(&user.access_token, &progressions_query),
            datastore.select(&user.access_token, &metrics_query),
        )
        .map_err(conceal(&user.id, "analyze_evolution", messages::EVOLUTION_FAILED))?;

        let sessions: Vec<SessionRecord> = decode_rows(&user.id, "evolution_session_row", sessions);
        let volumes: Vec<WeeklyVolume> = decode_rows(&user.id, "muscle_group_metric_row", metrics);
        let tracked: Vec<TrackedExercise> = progressions
            .into_iter()
            .filter_map(|row| match tracked_exercise(row) {
                Ok(tracked) => Some(tracked),
                Err(e) => {
                    AppLogger::log_degraded_step(&user.id, "progression_row", &e.to_string());
                    None
                }
            })
            .collect();
        debug!(
            weeks,
            sessions = sessions.len(),
            progressions = tracked.len(),
            metrics = volumes.len(),
            "Loaded evolution inputs"
        );

        Ok(EvolutionResponse {
            success: true,
            analysis: evolution::analyze(&sessions, &tracked, &volumes, today),
        })
    }
}

