// ABOUTME: Session feedback service completing a session and updating training history
// ABOUTME: Applies progression rules, stores performance records, and folds in weekly muscle-group metrics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Session feedback
//!
//! Saving feedback marks the session completed; that write is the only one
//! whose failure fails the request. Everything after it refines training
//! history and is best-effort:
//!
//! 1. progression of each main-block exercise,
//! 2. performance records (reported, or estimated from the feedback),
//! 3. completion columns of the session exercises when nothing detailed was reported,
//! 4. weekly muscle-group metrics.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use bodyweight_core::models::history::calendar_day;
use bodyweight_core::models::{
    ExercisePerformance, ExerciseProgression, MuscleGroupMetric, PerformanceRecord,
    SaveFeedbackRequest, SessionExerciseRow, SessionFeedback,
};
use bodyweight_intelligence::muscle_groups::{aggregate, week_start};
use bodyweight_intelligence::progression::performance_for;
use bodyweight_intelligence::{LevelChange, PerformanceEstimate, ProgressionEngine};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::conceal;
use crate::backend::{maybe_single, single, AuthenticatedUser, RowQuery};
use crate::constants::{block_types, messages, session_status, tables};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::resources::ServerResources;

/// Session exercise columns plus the embedded exercise's muscle groups
const SESSION_EXERCISE_COLUMNS: &str = "*, exercises (id, muscle_groups)";

/// Body returned by `POST /save-session-feedback`
#[derive(Debug, Serialize)]
pub struct SaveFeedbackResponse {
    /// Always `true`
    pub success: bool,
    /// Session row as updated
    pub session: Value,
}

/// Everything the best-effort steps need about the completed session
struct CompletedSession<'a> {
    user: &'a AuthenticatedUser,
    session_id: &'a str,
    session_date: Option<String>,
    feedback: &'a SessionFeedback,
    performances: &'a [ExercisePerformance],
}

/// Session feedback operations
pub struct FeedbackService {
    resources: Arc<ServerResources>,
    engine: ProgressionEngine,
}

impl FeedbackService {
    /// Create a service over the shared resources
    #[must_use]
    pub fn new(resources: Arc<ServerResources>) -> Self {
        Self {
            resources,
            engine: ProgressionEngine::default(),
        }
    }

    /// Save feedback for one of `user`'s sessions
    ///
    /// # Errors
    ///
    /// Returns a 400 when `sessionId` or `feedback` is missing, and a 500
    /// `Failed to save feedback` when the session update fails or matches no
    /// session owned by `user`
    #[tracing::instrument(skip(self, user, request), fields(user_id = %user.id))]
    pub async fn save(
        &self,
        user: &AuthenticatedUser,
        request: SaveFeedbackRequest,
    ) -> AppResult<SaveFeedbackResponse> {
        let (Some(session_id), Some(feedback)) = (
            request.session_id.as_deref().filter(|id| !id.is_empty()),
            request.feedback.as_ref(),
        ) else {
            return Err(AppError::missing_fields(messages::MISSING_FEEDBACK_FIELDS));
        };

        let session = self
            .complete_session(user, session_id, feedback)
            .await
            .map_err(conceal(&user.id, "save_session_feedback", messages::FEEDBACK_FAILED))?;

        let completed = CompletedSession {
            user,
            session_id,
            session_date: session
                .get("session_date")
                .and_then(Value::as_str)
                .map(str::to_owned),
            feedback,
            performances: &request.exercise_performance,
        };
        self.record_history(&completed).await;

        Ok(SaveFeedbackResponse {
            success: true,
            session,
        })
    }

    /// Mark the session completed; the user filter keeps other users' sessions out of reach
    async fn complete_session(
        &self,
        user: &AuthenticatedUser,
        session_id: &str,
        feedback: &SessionFeedback,
    ) -> AppResult<Value> {
        let query = RowQuery::table(tables::TRAINING_SESSIONS)
            .eq("id", session_id)
            .eq("user_id", &user.id);
        let patch = json!({
            "status": session_status::COMPLETED,
            "actual_intensity": feedback.actual_intensity(),
            "actual_duration": feedback.actual_duration.filter(|d| *d != 0.0),
            "notes": feedback.summary(),
            "updated_at": Utc::now().to_rfc3339(),
        });
        let rows = self
            .resources
            .datastore
            .update(&user.access_token, &query, &patch)
            .await?;
        single(rows, "Training session")
    }

    async fn record_history(&self, session: &CompletedSession<'_>) {
        let user_id = session.user.id.as_str();
        let rows = match self.session_exercises(session).await {
            Ok(rows) => rows,
            Err(e) => {
                AppLogger::log_degraded_step(user_id, "load_session_exercises", &e.to_string());
                Vec::new()
            }
        };

        for row in rows.iter().filter(|row| row.is_block(block_types::MAIN)) {
            let Some(exercise_id) = row.exercise_id.as_deref() else {
                continue;
            };
            if let Err(e) = self.progress_exercise(session, row, exercise_id).await {
                AppLogger::log_degraded_step(
                    user_id,
                    &format!("progression:{exercise_id}"),
                    &e.to_string(),
                );
            }
        }

        if session.performances.is_empty() {
            if !rows.is_empty() {
                self.record_estimated_completion(session, &rows).await;
            }
        } else if let Err(e) = self.record_reported_performance(session).await {
            AppLogger::log_degraded_step(user_id, "exercise_performance", &e.to_string());
        }

        self.update_muscle_group_metrics(session, &rows).await;
    }

    async fn session_exercises(
        &self,
        session: &CompletedSession<'_>,
    ) -> AppResult<Vec<SessionExerciseRow>> {
        let query = RowQuery::table(tables::SESSION_EXERCISES)
            .select(SESSION_EXERCISE_COLUMNS)
            .eq("session_id", session.session_id);
        let rows = self
            .resources
            .datastore
            .select(&session.user.access_token, &query)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    debug!("Skipping unreadable session exercise row: {e}");
                    None
                }
            })
            .collect())
    }

    /// Apply the progression rules to one main-block exercise
    async fn progress_exercise(
        &self,
        session: &CompletedSession<'_>,
        row: &SessionExerciseRow,
        exercise_id: &str,
    ) -> AppResult<()> {
        let user = session.user;
        let query = RowQuery::table(tables::USER_EXERCISE_PROGRESSIONS)
            .eq("user_id", &user.id)
            .eq("exercise_id", exercise_id);

        let existing = maybe_single(
            self.resources
                .datastore
                .select(&user.access_token, &query)
                .await?,
        );
        let current: ExerciseProgression = match existing {
            Some(row) => serde_json::from_value(row)?,
            None => {
                let starting = ExerciseProgression::starting(
                    &user.id,
                    exercise_id,
                    session.session_date.clone(),
                );
                let inserted = self
                    .resources
                    .datastore
                    .insert(
                        &user.access_token,
                        tables::USER_EXERCISE_PROGRESSIONS,
                        &serde_json::to_value(&starting)?,
                    )
                    .await?;
                match maybe_single(inserted) {
                    Some(row) => serde_json::from_value(row)?,
                    None => starting,
                }
            }
        };

        let estimate = PerformanceEstimate::from_feedback(session.feedback)
            .refine(row, performance_for(row, session.performances));
        let outcome = self
            .engine
            .apply(&current, &estimate, session.session_date.as_deref());

        if outcome.change != LevelChange::Unchanged {
            info!(
                user_id = %user.id,
                exercise_id,
                from = current.current_level,
                to = outcome.progression.current_level,
                change = ?outcome.change,
                "Exercise level changed"
            );
        }

        let next = &outcome.progression;
        let patch = json!({
            "current_level": next.current_level,
            "consecutive_completions": next.consecutive_completions,
            "last_attempted_date": next.last_attempted_date,
            "last_completed_date": next.last_completed_date,
            "updated_at": Utc::now().to_rfc3339(),
        });
        self.resources
            .datastore
            .update(&user.access_token, &query, &patch)
            .await?;
        Ok(())
    }

    /// Store the performance the client reported, tagged with muscle groups
    async fn record_reported_performance(&self, session: &CompletedSession<'_>) -> AppResult<()> {
        let user = session.user;
        let exercise_ids: Vec<String> = session
            .performances
            .iter()
            .filter_map(|p| p.exercise_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let muscle_groups = match self.muscle_groups_by_exercise(user, &exercise_ids).await {
            Ok(groups) => groups,
            Err(e) => {
                AppLogger::log_degraded_step(&user.id, "exercise_muscle_groups", &e.to_string());
                HashMap::new()
            }
        };

        let records: Vec<PerformanceRecord> = session
            .performances
            .iter()
            .filter_map(|performance| {
                let groups = performance
                    .exercise_id
                    .as_ref()
                    .and_then(|id| muscle_groups.get(id))
                    .cloned()
                    .unwrap_or_default();
                PerformanceRecord::from_reported(
                    performance,
                    &user.id,
                    session.session_date.as_deref(),
                    groups,
                )
            })
            .collect();
        if records.is_empty() {
            debug!("No reported performance names an exercise");
            return Ok(());
        }

        self.resources
            .datastore
            .insert(
                &user.access_token,
                tables::EXERCISE_PERFORMANCE,
                &serde_json::to_value(records)?,
            )
            .await?;
        Ok(())
    }

    async fn muscle_groups_by_exercise(
        &self,
        user: &AuthenticatedUser,
        exercise_ids: &[String],
    ) -> AppResult<HashMap<String, Vec<String>>> {
        let query = RowQuery::table(tables::EXERCISES)
            .select("id, muscle_groups")
            .is_in("id", exercise_ids);
        let rows = self
            .resources
            .datastore
            .select(&user.access_token, &query)
            .await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let id = row.get("id")?.as_str()?.to_owned();
                let embedded = SessionExerciseRow {
                    exercises: Some(row.clone()),
                    ..SessionExerciseRow::default()
                };
                Some((id, embedded.muscle_groups()))
            })
            .collect())
    }

    /// Without detailed data, write estimated completion onto each session exercise
    /// and store estimated performance records
    async fn record_estimated_completion(
        &self,
        session: &CompletedSession<'_>,
        rows: &[SessionExerciseRow],
    ) {
        let user = session.user;
        let completion = session.feedback.completion_or_default();

        for row in rows {
            let query = RowQuery::table(tables::SESSION_EXERCISES).eq("id", &row.id);
            let patch = estimated_completion_patch(row, session.feedback);
            if let Err(e) = self
                .resources
                .datastore
                .update(&user.access_token, &query, &patch)
                .await
            {
                AppLogger::log_degraded_step(
                    &user.id,
                    &format!("session_exercise:{}", row.id),
                    &e.to_string(),
                );
            }
        }

        let records: Vec<PerformanceRecord> = rows
            .iter()
            .filter_map(|row| {
                PerformanceRecord::estimated(
                    row,
                    &user.id,
                    session.session_date.as_deref(),
                    session.feedback,
                )
            })
            .collect();
        let result = match serde_json::to_value(records) {
            Ok(body) => self
                .resources
                .datastore
                .insert(&user.access_token, tables::EXERCISE_PERFORMANCE, &body)
                .await
                .map(drop),
            Err(e) => Err(AppError::from(e)),
        };
        if let Err(e) = result {
            AppLogger::log_degraded_step(&user.id, "estimated_performance", &e.to_string());
        }
        debug!(
            completion,
            exercises = rows.len(),
            "Recorded estimated completion"
        );
    }

    /// Fold this session into the weekly metrics of every muscle group it trained
    async fn update_muscle_group_metrics(
        &self,
        session: &CompletedSession<'_>,
        rows: &[SessionExerciseRow],
    ) {
        let user = session.user;
        let Some(date) = session.session_date.as_deref().and_then(calendar_day) else {
            AppLogger::log_degraded_step(
                &user.id,
                "muscle_group_metrics",
                "session has no usable session_date",
            );
            return;
        };
        let week = week_start(date);

        for (group, totals) in aggregate(rows, session.performances, session.feedback) {
            let query = RowQuery::table(tables::MUSCLE_GROUP_METRICS)
                .eq("user_id", &user.id)
                .eq("muscle_group", &group)
                .eq("week_start", week);

            let result = async {
                let existing: Option<MuscleGroupMetric> = maybe_single(
                    self.resources
                        .datastore
                        .select(&user.access_token, &query)
                        .await?,
                )
                .map(serde_json::from_value)
                .transpose()?;

                let merged = totals.merge_into(existing.as_ref(), &user.id, &group, week);
                let mut body = serde_json::to_value(&merged)?;
                if existing.is_some() {
                    body["updated_at"] = json!(Utc::now().to_rfc3339());
                    self.resources
                        .datastore
                        .update(&user.access_token, &query, &body)
                        .await?;
                } else {
                    self.resources
                        .datastore
                        .insert(&user.access_token, tables::MUSCLE_GROUP_METRICS, &body)
                        .await?;
                }
                Ok::<(), AppError>(())
            }
            .await;

            if let Err(e) = result {
                AppLogger::log_degraded_step(
                    &user.id,
                    &format!("muscle_group_metrics:{group}"),
                    &e.to_string(),
                );
            }
        }
    }
}

/// Completion columns estimated from session-level feedback
fn estimated_completion_patch(row: &SessionExerciseRow, feedback: &SessionFeedback) -> Value {
    let completion = feedback.completion_or_default();
    json!({
        "sets_completed": row.sets_planned.map(|sets| (sets * completion).round()),
        "reps_completed": row.reps_planned.map(|reps| (reps * completion).round()),
        "rpe_reported": feedback.rpe_or_default(),
        "technical_quality": feedback.technique_or_default(),
        "notes": format!("Completed with {}% effectiveness", (completion * 100.0).round()),
        "circuits_completed": row.circuits_planned,
    })
}
