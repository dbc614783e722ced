// ABOUTME: Session feedback payloads, per-exercise performance, and session exercise rows
// ABOUTME: Includes circuit-format aggregates and the performance records written after a session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Completion rate assumed when feedback does not report one
pub const DEFAULT_COMPLETION_RATE: f64 = 0.8;
/// RPE assumed when feedback does not report one
pub const DEFAULT_RPE: f64 = 7.0;
/// Technique quality assumed when feedback does not report one
pub const DEFAULT_TECHNICAL_QUALITY: f64 = 4.0;

/// Zero and absent both mean "not reported"
fn reported(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

/// Save-feedback request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFeedbackRequest {
    /// Training session being completed
    pub session_id: Option<String>,
    /// Session-level feedback
    pub feedback: Option<SessionFeedback>,
    /// Optional per-exercise performance
    #[serde(default)]
    pub exercise_performance: Vec<ExercisePerformance>,
}

/// Session-level feedback
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFeedback {
    /// Rate of perceived exertion, 0-10
    pub rpe_reported: Option<f64>,
    /// Fraction of the planned work completed, 0-1
    pub completion_rate: Option<f64>,
    /// Technique quality, 1-5
    pub technical_quality: Option<f64>,
    /// Enjoyment, 1-5
    pub enjoyment_level: Option<f64>,
    /// Recovery feeling, 1-5
    pub recovery_feeling: Option<f64>,
    /// Actual duration in minutes
    pub actual_duration: Option<f64>,
}

impl SessionFeedback {
    /// Reported completion rate, or the default
    #[must_use]
    pub fn completion_or_default(&self) -> f64 {
        reported(self.completion_rate).unwrap_or(DEFAULT_COMPLETION_RATE)
    }

    /// Reported RPE, or the default
    #[must_use]
    pub fn rpe_or_default(&self) -> f64 {
        reported(self.rpe_reported).unwrap_or(DEFAULT_RPE)
    }

    /// Reported technique quality, or the default
    #[must_use]
    pub fn technique_or_default(&self) -> f64 {
        reported(self.technical_quality).unwrap_or(DEFAULT_TECHNICAL_QUALITY)
    }

    /// Session intensity stored on the training session (RPE / 10)
    #[must_use]
    pub fn actual_intensity(&self) -> Option<f64> {
        self.rpe_reported.map(|rpe| rpe / 10.0)
    }

    /// Human-readable summary stored in the session notes
    #[must_use]
    pub fn summary(&self) -> String {
        let show = |value: Option<f64>| value.map_or_else(|| "-".to_owned(), |v| format!("{v}"));
        let completed = self
            .completion_rate
            .map_or_else(|| "-".to_owned(), |c| format!("{}", (c * 100.0).round()));
        format!(
            "RPE: {}/10, Completed: {completed}%, Technique: {}/5",
            show(self.rpe_reported),
            show(self.technical_quality)
        )
    }
}

/// Circuit-format performance for one exercise
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CircuitData {
    /// Reps completed in each circuit
    #[serde(default)]
    pub reps_per_circuit: Vec<f64>,
    /// RPE reported for each circuit
    #[serde(default)]
    pub rpe_per_circuit: Vec<f64>,
    /// Technique score for each circuit
    #[serde(default)]
    pub technique_per_circuit: Vec<f64>,
    /// Rest taken between circuits (seconds)
    pub actual_rest_between_circuits: Option<Vec<f64>>,
    /// Rest taken between exercises (seconds)
    pub actual_rest_between_exercises: Option<Vec<f64>>,
    /// Perceived difficulty for each circuit
    pub perceived_difficulty_per_circuit: Option<Vec<f64>>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

impl CircuitData {
    /// Total reps across circuits
    #[must_use]
    pub fn total_reps(&self) -> f64 {
        self.reps_per_circuit.iter().sum()
    }

    /// Mean of the positive RPE entries
    #[must_use]
    pub fn mean_reported_rpe(&self) -> Option<f64> {
        mean(self.rpe_per_circuit.iter().copied().filter(|v| *v > 0.0))
    }

    /// Mean of the positive technique entries
    #[must_use]
    pub fn mean_reported_technique(&self) -> Option<f64> {
        mean(self.technique_per_circuit.iter().copied().filter(|v| *v > 0.0))
    }

    /// Mean of all RPE entries, including unreported zeros
    #[must_use]
    pub fn mean_rpe(&self) -> Option<f64> {
        mean(self.rpe_per_circuit.iter().copied())
    }

    /// Mean of all technique entries, including unreported zeros
    #[must_use]
    pub fn mean_technique(&self) -> Option<f64> {
        mean(self.technique_per_circuit.iter().copied())
    }
}

/// Detailed performance for one exercise of a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePerformance {
    /// Session exercise row this performance belongs to
    pub session_exercise_id: Option<String>,
    /// Exercise catalogue id; entries without one are ignored
    #[serde(default)]
    pub exercise_id: Option<String>,
    /// Set number
    pub set_number: Option<i32>,
    /// Reps completed
    pub reps_completed: Option<f64>,
    /// RPE reported for the exercise
    pub rpe_reported: Option<f64>,
    /// Technique quality
    pub technique_quality: Option<f64>,
    /// Rest actually taken (seconds)
    pub rest_time_actual: Option<f64>,
    /// Perceived difficulty
    pub difficulty_perceived: Option<f64>,
    /// Circuit-format data
    pub circuit_data: Option<CircuitData>,
}

/// A session exercise row with its embedded exercise
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionExerciseRow {
    /// Row id
    pub id: String,
    /// Exercise catalogue id
    pub exercise_id: Option<String>,
    /// `warmup`, `main` or `cooldown`
    pub block_type: Option<String>,
    /// Planned sets
    pub sets_planned: Option<f64>,
    /// Planned reps per set
    pub reps_planned: Option<f64>,
    /// Planned circuits (circuit format)
    pub circuits_planned: Option<f64>,
    /// Completed sets
    pub sets_completed: Option<f64>,
    /// Completed reps per set
    pub reps_completed: Option<f64>,
    /// RPE reported for the exercise
    pub rpe_reported: Option<f64>,
    /// Technique quality reported for the exercise
    pub technical_quality: Option<f64>,
    /// Planned rest between sets (seconds)
    pub rest_seconds: Option<f64>,
    /// Target RPE
    pub target_rpe: Option<f64>,
    /// Embedded exercise record
    pub exercises: Option<Value>,
}

impl SessionExerciseRow {
    /// Muscle groups of the embedded exercise
    #[must_use]
    pub fn muscle_groups(&self) -> Vec<String> {
        self.exercises
            .as_ref()
            .and_then(|exercise| exercise.get("muscle_groups"))
            .and_then(Value::as_array)
            .map(|groups| {
                groups
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether this row belongs to the block of `block_type`
    #[must_use]
    pub fn is_block(&self, block_type: &str) -> bool {
        self.block_type.as_deref() == Some(block_type)
    }

    /// Planned rounds: circuits, else sets, else one
    #[must_use]
    pub fn planned_rounds(&self) -> f64 {
        reported(self.circuits_planned)
            .or_else(|| reported(self.sets_planned))
            .unwrap_or(1.0)
    }
}

/// Performance row written to the datastore after a session
///
/// Rows are inserted in batches, so every column is always present (null when
/// unknown).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceRecord {
    /// Session exercise row
    pub session_exercise_id: Option<String>,
    /// Owner
    pub user_id: String,
    /// Exercise catalogue id
    pub exercise_id: String,
    /// Session date
    pub session_date: Option<String>,
    /// Set number
    pub set_number: i32,
    /// Reps completed
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub reps_completed: Option<f64>,
    /// RPE reported
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub rpe_reported: Option<f64>,
    /// Technique quality
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub technique_quality: Option<f64>,
    /// Rest actually taken
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub rest_time_actual: Option<f64>,
    /// Perceived difficulty
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub difficulty_perceived: Option<f64>,
    /// Muscle groups worked
    pub muscle_groups: Vec<String>,
    /// Raw circuit data
    pub circuit_data: Option<CircuitData>,
    /// RPE per circuit
    pub circuit_rpe: Option<Vec<f64>>,
    /// Technique per circuit
    pub circuit_technique_quality: Option<Vec<f64>>,
    /// Rest between circuits
    pub actual_rest_between_circuits: Option<Vec<f64>>,
    /// Rest between exercises
    pub actual_rest_between_exercises: Option<Vec<f64>>,
    /// Total reps across circuits
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub total_circuit_reps: Option<f64>,
    /// Mean circuit RPE
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub avg_circuit_rpe: Option<f64>,
    /// Mean circuit technique
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub avg_circuit_technique: Option<f64>,
}

impl PerformanceRecord {
    /// Record built from client-reported performance, `None` without an exercise id
    #[must_use]
    pub fn from_reported(
        performance: &ExercisePerformance,
        user_id: &str,
        session_date: Option<&str>,
        muscle_groups: Vec<String>,
    ) -> Option<Self> {
        let exercise_id = performance.exercise_id.clone().filter(|id| !id.is_empty())?;
        let circuit = performance.circuit_data.as_ref();
        Some(Self {
            session_exercise_id: performance.session_exercise_id.clone(),
            user_id: user_id.to_owned(),
            exercise_id,
            session_date: session_date.map(str::to_owned),
            set_number: performance.set_number.unwrap_or(1),
            reps_completed: performance.reps_completed,
            rpe_reported: performance.rpe_reported,
            technique_quality: performance.technique_quality,
            rest_time_actual: performance.rest_time_actual,
            difficulty_perceived: performance.difficulty_perceived,
            muscle_groups,
            circuit_data: circuit.cloned(),
            circuit_rpe: circuit.map(|c| c.rpe_per_circuit.clone()),
            circuit_technique_quality: circuit.map(|c| c.technique_per_circuit.clone()),
            actual_rest_between_circuits: circuit
                .and_then(|c| c.actual_rest_between_circuits.clone()),
            actual_rest_between_exercises: circuit
                .and_then(|c| c.actual_rest_between_exercises.clone()),
            total_circuit_reps: circuit
                .map(CircuitData::total_reps)
                .filter(|total| *total != 0.0)
                .or(performance.reps_completed),
            avg_circuit_rpe: circuit
                .and_then(CircuitData::mean_rpe)
                .or(performance.rpe_reported),
            avg_circuit_technique: circuit
                .and_then(CircuitData::mean_technique)
                .or(performance.technique_quality),
        })
    }

    /// Record estimated from session-level feedback, `None` when the row names no exercise
    #[must_use]
    pub fn estimated(
        row: &SessionExerciseRow,
        user_id: &str,
        session_date: Option<&str>,
        feedback: &SessionFeedback,
    ) -> Option<Self> {
        let exercise_id = row.exercise_id.clone().filter(|id| !id.is_empty())?;
        let completion = feedback.completion_or_default();
        Some(Self {
            session_exercise_id: Some(row.id.clone()),
            user_id: user_id.to_owned(),
            exercise_id,
            session_date: session_date.map(str::to_owned),
            set_number: 1,
            reps_completed: row.reps_planned.map(|reps| (reps * completion).round()),
            rpe_reported: Some(feedback.rpe_or_default()),
            technique_quality: Some(feedback.technique_or_default()),
            rest_time_actual: None,
            difficulty_perceived: None,
            muscle_groups: row.muscle_groups(),
            circuit_data: None,
            circuit_rpe: None,
            circuit_technique_quality: None,
            actual_rest_between_circuits: None,
            actual_rest_between_exercises: None,
            total_circuit_reps: None,
            avg_circuit_rpe: None,
            avg_circuit_technique: None,
        })
    }
}
