// ABOUTME: Routine service returning today's planned session in the client's routine shape
// ABOUTME: Groups session exercises into warm-up, main and cool-down blocks with per-block defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use bodyweight_core::models::numbers::compact;
use bodyweight_core::models::SessionExerciseRow;
use serde::Serialize;
use serde_json::Value;

use super::{conceal, non_empty_str, positive_number, today};
use crate::backend::{maybe_single, AuthenticatedUser, RowQuery};
use crate::constants::{block_types, messages, session_status, tables};
use crate::errors::AppResult;
use crate::resources::ServerResources;

/// Session columns with embedded exercises
const SESSION_COLUMNS: &str = "*, session_exercises (*, exercises (*))";

/// Duration used when the session has none
const DEFAULT_DURATION_MINUTES: f64 = 30.0;
/// Intensity used when the session has none
const DEFAULT_INTENSITY: f64 = 0.7;
/// Notes used when the session has none
const DEFAULT_NOTES: &str = "Personalized routine";
/// Focus areas reported for every routine
const FOCUS_AREAS: [&str; 2] = ["strength", "endurance"];

/// Prescription applied to block exercises with unset columns
#[derive(Debug, Clone, Copy)]
struct BlockDefaults {
    sets: f64,
    reps: f64,
    rest_seconds: f64,
    target_rpe: f64,
}

const WARMUP_DEFAULTS: BlockDefaults = BlockDefaults {
    sets: 1.0,
    reps: 10.0,
    rest_seconds: 30.0,
    target_rpe: 3.0,
};

const MAIN_DEFAULTS: BlockDefaults = BlockDefaults {
    sets: 3.0,
    reps: 10.0,
    rest_seconds: 60.0,
    target_rpe: 7.0,
};

const COOLDOWN_DEFAULTS: BlockDefaults = BlockDefaults {
    sets: 1.0,
    reps: 30.0,
    rest_seconds: 0.0,
    target_rpe: 2.0,
};

/// One exercise of a routine block
#[derive(Debug, Clone, Serialize)]
pub struct RoutineExercise {
    /// Embedded exercise record
    pub exercise: Value,
    /// Sets
    #[serde(serialize_with = "compact")]
    pub sets: f64,
    /// Reps per set
    #[serde(serialize_with = "compact")]
    pub reps: f64,
    /// Rest between sets in seconds
    #[serde(serialize_with = "compact")]
    pub rest_seconds: f64,
    /// Progression level of the exercise
    #[serde(serialize_with = "compact")]
    pub progression_level: f64,
    /// Target RPE
    #[serde(serialize_with = "compact")]
    pub target_rpe: f64,
}

/// Planned session reshaped for the clients
#[derive(Debug, Clone, Serialize)]
pub struct Routine {
    /// Session id
    pub id: Value,
    /// Session date
    pub date: Value,
    /// Planned duration in minutes
    #[serde(serialize_with = "compact")]
    pub duration_minutes: f64,
    /// Target intensity
    pub intensity: f64,
    /// Warm-up block
    pub warm_up: Vec<RoutineExercise>,
    /// Main block
    pub exercise_blocks: Vec<RoutineExercise>,
    /// Cool-down block
    pub cool_down: Vec<RoutineExercise>,
    /// Focus areas
    pub focus_areas: Vec<&'static str>,
    /// Session notes
    pub notes: String,
}

/// Body returned by `GET|POST /get-current-routine`
#[derive(Debug, Serialize)]
pub struct CurrentRoutineResponse {
    /// Today's routine, `null` when nothing is planned
    pub routine: Option<Routine>,
}

/// Routine operations
pub struct RoutineService {
    resources: Arc<ServerResources>,
}

impl RoutineService {
    /// Create a service over the shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Today's planned routine of `user`
    ///
    /// # Errors
    ///
    /// Returns a generic 500 when the datastore query fails
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn current(&self, user: &AuthenticatedUser) -> AppResult<CurrentRoutineResponse> {
        let query = RowQuery::table(tables::TRAINING_SESSIONS)
            .select(SESSION_COLUMNS)
            .eq("user_id", &user.id)
            .eq("session_date", today())
            .eq("status", session_status::PLANNED)
            .limit(1);

        let session = self
            .resources
            .datastore
            .select(&user.access_token, &query)
            .await
            .map(maybe_single)
            .map_err(conceal(&user.id, "get_current_routine", messages::DATABASE_ERROR))?;

        Ok(CurrentRoutineResponse {
            routine: session.as_ref().map(routine_from_session),
        })
    }
}

/// Reshape a session row with embedded exercises into a routine
#[must_use]
pub fn routine_from_session(session: &Value) -> Routine {
    let rows: Vec<SessionExerciseRow> = session
        .get("session_exercises")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| serde_json::from_value(row.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    let block = |block_type: &str, defaults: BlockDefaults, leveled: bool| -> Vec<RoutineExercise> {
        rows.iter()
            .filter(|row| row.is_block(block_type))
            .map(|row| routine_exercise(row, defaults, leveled))
            .collect()
    };

    Routine {
        id: session.get("id").cloned().unwrap_or(Value::Null),
        date: session.get("session_date").cloned().unwrap_or(Value::Null),
        duration_minutes: positive_number(session, "planned_duration")
            .unwrap_or(DEFAULT_DURATION_MINUTES),
        intensity: positive_number(session, "intensity_target").unwrap_or(DEFAULT_INTENSITY),
        warm_up: block(block_types::WARMUP, WARMUP_DEFAULTS, false),
        exercise_blocks: block(block_types::MAIN, MAIN_DEFAULTS, true),
        cool_down: block(block_types::COOLDOWN, COOLDOWN_DEFAULTS, false),
        focus_areas: FOCUS_AREAS.to_vec(),
        notes: non_empty_str(session, "notes")
            .unwrap_or(DEFAULT_NOTES)
            .to_owned(),
    }
}

/// Main-block exercises report their catalogue progression level; other blocks use level 1
fn routine_exercise(row: &SessionExerciseRow, defaults: BlockDefaults, leveled: bool) -> RoutineExercise {
    let set = |value: Option<f64>, default: f64| {
        value
            .filter(|v| v.is_finite() && *v != 0.0)
            .unwrap_or(default)
    };
    let exercise = row.exercises.clone().unwrap_or(Value::Null);
    let progression_level = if leveled {
        positive_number(&exercise, "progression_level").unwrap_or(1.0)
    } else {
        1.0
    };

    RoutineExercise {
        sets: set(row.sets_planned, defaults.sets),
        reps: set(row.reps_planned, defaults.reps),
        rest_seconds: set(row.rest_seconds, defaults.rest_seconds),
        progression_level,
        target_rpe: set(row.target_rpe, defaults.target_rpe),
        exercise,
    }
}
