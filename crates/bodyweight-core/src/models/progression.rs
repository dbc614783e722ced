// ABOUTME: Per-exercise progression rows and weekly per-muscle-group training metrics
// ABOUTME: Rows mirror the datastore tables updated after a session is completed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lowest progression level of an exercise
pub const MIN_LEVEL: i32 = 1;
/// Highest progression level of an exercise
pub const MAX_LEVEL: i32 = 7;

/// A user's progression on one exercise
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseProgression {
    /// Owner
    pub user_id: String,
    /// Exercise catalogue id
    pub exercise_id: String,
    /// Current level, 1-7
    pub current_level: i32,
    /// Successful sessions in a row at the current level
    pub consecutive_completions: i32,
    /// Date of the last attempt
    #[serde(default)]
    pub last_attempted_date: Option<String>,
    /// Date of the last successful attempt
    #[serde(default)]
    pub last_completed_date: Option<String>,
    /// Whether the progression is tracked
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl ExerciseProgression {
    /// Fresh progression at the lowest level
    #[must_use]
    pub fn starting(
        user_id: impl Into<String>,
        exercise_id: impl Into<String>,
        attempted: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            exercise_id: exercise_id.into(),
            current_level: MIN_LEVEL,
            consecutive_completions: 0,
            last_attempted_date: attempted,
            last_completed_date: None,
            is_active: true,
        }
    }
}

/// Weekly training volume and quality for one muscle group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MuscleGroupMetric {
    /// Owner
    pub user_id: String,
    /// Muscle group name
    pub muscle_group: String,
    /// Sunday starting the week
    pub week_start: NaiveDate,
    /// Sets performed
    #[serde(serialize_with = "super::numbers::compact")]
    pub total_sets: f64,
    /// Reps performed
    #[serde(serialize_with = "super::numbers::compact")]
    pub total_reps: f64,
    /// Attempt-weighted mean RPE
    pub avg_rpe: f64,
    /// Highest per-session RPE
    pub max_rpe: f64,
    /// Exercises attempted
    pub exercises_attempted: i64,
    /// Exercises completed (at least 80% of target reps)
    pub exercises_completed: i64,
    /// Attempt-weighted mean technique quality
    pub avg_technique_quality: f64,
}
