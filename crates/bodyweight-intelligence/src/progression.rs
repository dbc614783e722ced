// ABOUTME: Exercise progression engine advancing or regressing levels after each session
// ABOUTME: Combines session feedback with per-exercise circuit or set performance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use bodyweight_core::models::progression::{MAX_LEVEL, MIN_LEVEL};
use bodyweight_core::models::{
    ExercisePerformance, ExerciseProgression, SessionExerciseRow, SessionFeedback,
};
use serde::{Deserialize, Serialize};

/// Reps assumed when a set-format exercise has no planned reps (circuits assume none)
pub const DEFAULT_REPS_PLANNED: f64 = 10.0;

/// Detailed performance reported for the exercise planned in `row`
#[must_use]
pub fn performance_for<'a>(
    row: &SessionExerciseRow,
    performances: &'a [ExercisePerformance],
) -> Option<&'a ExercisePerformance> {
    let exercise_id = row.exercise_id.as_deref().filter(|id| !id.is_empty())?;
    performances
        .iter()
        .find(|p| p.exercise_id.as_deref() == Some(exercise_id))
}

fn reported(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// How well one exercise went
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEstimate {
    /// Fraction of the target reps completed, at most 1
    pub completion_rate: f64,
    /// Rate of perceived exertion
    pub rpe: f64,
    /// Technique quality
    pub technique: f64,
}

impl PerformanceEstimate {
    /// Estimate from session-level feedback alone
    #[must_use]
    pub fn from_feedback(feedback: &SessionFeedback) -> Self {
        Self {
            completion_rate: feedback.completion_or_default(),
            rpe: feedback.rpe_or_default(),
            technique: feedback.technique_or_default(),
        }
    }

    /// Refine with the detailed performance reported for `row`, if any
    #[must_use]
    pub fn refine(self, row: &SessionExerciseRow, performance: Option<&ExercisePerformance>) -> Self {
        let Some(performance) = performance else {
            return self;
        };

        if let Some(circuit) = &performance.circuit_data {
            // Unplanned reps count as zero
            let target = row.reps_planned.unwrap_or(0.0) * row.planned_rounds();
            Self {
                completion_rate: (circuit.total_reps() / target.max(1.0)).min(1.0),
                rpe: circuit.mean_reported_rpe().unwrap_or(self.rpe),
                technique: circuit.mean_reported_technique().unwrap_or(self.technique),
            }
        } else {
            let target = reported(row.reps_planned).unwrap_or(DEFAULT_REPS_PLANNED);
            Self {
                completion_rate: performance
                    .reps_completed
                    .map_or(self.completion_rate, |reps| (reps / target.max(1.0)).min(1.0)),
                rpe: reported(performance.rpe_reported).unwrap_or(self.rpe),
                technique: reported(performance.technique_quality).unwrap_or(self.technique),
            }
        }
    }
}

/// Direction a level moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelChange {
    /// Moved one level up
    Advanced,
    /// Moved one level down
    Regressed,
    /// Stayed
    Unchanged,
}

/// Result of applying one session to a progression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionOutcome {
    /// Progression after the session
    pub progression: ExerciseProgression,
    /// Whether the attempt counted as a success
    pub successful: bool,
    /// Level movement
    pub change: LevelChange,
}

/// Level progression rules
///
/// A success needs high completion, tolerable effort and acceptable technique.
/// Three successes in a row move up one level; a very poor or very hard
/// session moves down one.
#[derive(Debug, Clone, Copy)]
pub struct ProgressionEngine {
    /// Minimum completion rate of a successful attempt
    pub success_completion: f64,
    /// Maximum RPE of a successful attempt
    pub success_max_rpe: f64,
    /// Minimum technique of a successful attempt
    pub success_min_technique: f64,
    /// Successes in a row needed to advance
    pub completions_to_advance: i32,
    /// Completion rate below which a failed attempt regresses
    pub regress_completion: f64,
    /// RPE at or above which a failed attempt regresses
    pub regress_rpe: f64,
}

impl Default for ProgressionEngine {
    fn default() -> Self {
        Self {
            success_completion: 0.8,
            success_max_rpe: 8.0,
            success_min_technique: 3.0,
            completions_to_advance: 3,
            regress_completion: 0.5,
            regress_rpe: 9.0,
        }
    }
}

impl ProgressionEngine {
    /// Whether `estimate` counts as a successful attempt
    #[must_use]
    pub fn is_successful(&self, estimate: &PerformanceEstimate) -> bool {
        estimate.completion_rate >= self.success_completion
            && estimate.rpe <= self.success_max_rpe
            && estimate.technique >= self.success_min_technique
    }

    /// Apply one attempt on `session_date` to `current`
    #[must_use]
    pub fn apply(
        &self,
        current: &ExerciseProgression,
        estimate: &PerformanceEstimate,
        session_date: Option<&str>,
    ) -> ProgressionOutcome {
        let successful = self.is_successful(estimate);
        let mut next = current.clone();
        let mut change = LevelChange::Unchanged;

        if successful {
            next.consecutive_completions += 1;
            if next.consecutive_completions >= self.completions_to_advance
                && next.current_level < MAX_LEVEL
            {
                next.current_level += 1;
                next.consecutive_completions = 0;
                change = LevelChange::Advanced;
            }
            next.last_completed_date = session_date.map(str::to_owned);
        } else {
            next.consecutive_completions = 0;
            let struggled = estimate.completion_rate < self.regress_completion
                || estimate.rpe >= self.regress_rpe;
            if struggled && next.current_level > MIN_LEVEL {
                next.current_level -= 1;
                change = LevelChange::Regressed;
            }
        }
        next.last_attempted_date = session_date.map(str::to_owned);

        ProgressionOutcome {
            progression: next,
            successful,
            change,
        }
    }
}
