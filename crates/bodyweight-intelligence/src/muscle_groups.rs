// ABOUTME: Weekly per-muscle-group volume and quality aggregated from a completed session
// ABOUTME: Merges session totals into existing weekly metrics with attempt-weighted averages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::BTreeMap;

use bodyweight_core::models::{
    ExercisePerformance, MuscleGroupMetric, SessionExerciseRow, SessionFeedback,
};
use chrono::{Datelike, Duration, NaiveDate};

use crate::progression::{performance_for, DEFAULT_REPS_PLANNED};

/// Share of the target reps that marks an exercise as completed
const COMPLETED_SHARE: f64 = 0.8;

/// Sunday on or before `date`
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

fn reported(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Work done on one session exercise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExerciseLoad {
    /// Sets (or circuits) performed
    pub sets: f64,
    /// Reps performed
    pub reps: f64,
    /// Mean RPE
    pub rpe: f64,
    /// Mean technique quality
    pub technique: f64,
    /// Whether at least 80% of the target reps were done
    pub completed: bool,
}

impl ExerciseLoad {
    /// Load of `row` given the session's detailed performance and feedback
    ///
    /// With detailed performance for the session, exercises lacking their own
    /// entry count as attempted with no recorded volume. Without any detailed
    /// performance, volume is estimated from the planned work and the reported
    /// completion rate.
    #[must_use]
    pub fn derive(
        row: &SessionExerciseRow,
        performances: &[ExercisePerformance],
        feedback: &SessionFeedback,
    ) -> Self {
        let completion = feedback.completion_or_default();
        let mut load = Self {
            sets: 0.0,
            reps: 0.0,
            rpe: feedback.rpe_or_default(),
            technique: feedback.technique_or_default(),
            completed: feedback
                .completion_rate
                .is_some_and(|rate| rate >= COMPLETED_SHARE),
        };

        if performances.is_empty() {
            load.sets = (reported(row.sets_planned).unwrap_or(1.0) * completion).round();
            load.reps = (reported(row.reps_planned).unwrap_or(1.0) * completion).round();
            return load;
        }

        match performance_for(row, performances) {
            Some(ExercisePerformance {
                circuit_data: Some(circuit),
                ..
            }) => {
                load.sets = row.planned_rounds();
                load.reps = circuit.total_reps();
                load.rpe = circuit.mean_reported_rpe().unwrap_or(load.rpe);
                load.technique = circuit.mean_reported_technique().unwrap_or(load.technique);
                let target = row.reps_planned.unwrap_or(0.0) * load.sets;
                load.completed = load.reps >= target * COMPLETED_SHARE;
            }
            Some(performance) => {
                load.sets = reported(row.sets_completed).unwrap_or_else(|| {
                    (reported(row.sets_planned).unwrap_or(1.0) * completion).round()
                });
                load.reps = performance.reps_completed.unwrap_or(0.0);
                load.rpe = reported(performance.rpe_reported).unwrap_or(load.rpe);
                load.technique = reported(performance.technique_quality).unwrap_or(load.technique);
                let target = reported(row.reps_planned).unwrap_or(DEFAULT_REPS_PLANNED);
                load.completed = load.reps >= target * COMPLETED_SHARE;
            }
            None => {}
        }
        load
    }
}

/// Session totals for one muscle group
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MuscleGroupTotals {
    /// Sets performed
    pub total_sets: f64,
    /// Reps performed
    pub total_reps: f64,
    /// Sum of per-exercise RPE
    pub rpe_sum: f64,
    /// Sum of per-exercise technique quality
    pub technique_sum: f64,
    /// Exercises attempted
    pub exercises_attempted: i64,
    /// Exercises completed
    pub exercises_completed: i64,
}

impl MuscleGroupTotals {
    fn add(&mut self, load: &ExerciseLoad) {
        self.total_sets += load.sets;
        self.total_reps += load.reps;
        self.rpe_sum += load.rpe;
        self.technique_sum += load.technique;
        self.exercises_attempted += 1;
        self.exercises_completed += i64::from(load.completed);
    }

    fn attempts(&self) -> f64 {
        self.exercises_attempted as f64
    }

    /// Mean RPE over the attempted exercises
    #[must_use]
    pub fn avg_rpe(&self) -> f64 {
        self.rpe_sum / self.attempts()
    }

    /// Mean technique quality over the attempted exercises
    #[must_use]
    pub fn avg_technique(&self) -> f64 {
        self.technique_sum / self.attempts()
    }

    /// Fold these totals into the stored weekly metric, or start a new one
    #[must_use]
    pub fn merge_into(
        &self,
        existing: Option<&MuscleGroupMetric>,
        user_id: &str,
        muscle_group: &str,
        week_start: NaiveDate,
    ) -> MuscleGroupMetric {
        let avg_rpe = self.avg_rpe();
        let avg_technique = self.avg_technique();

        match existing {
            Some(metric) => {
                let previous = metric.exercises_attempted as f64;
                let attempted = metric.exercises_attempted + self.exercises_attempted;
                let weighted = |stored: f64, session: f64| {
                    stored.mul_add(previous, session * self.attempts()) / attempted as f64
                };
                MuscleGroupMetric {
                    user_id: metric.user_id.clone(),
                    muscle_group: metric.muscle_group.clone(),
                    week_start: metric.week_start,
                    total_sets: metric.total_sets + self.total_sets,
                    total_reps: metric.total_reps + self.total_reps,
                    avg_rpe: weighted(metric.avg_rpe, avg_rpe),
                    max_rpe: metric.max_rpe.max(avg_rpe),
                    exercises_attempted: attempted,
                    exercises_completed: metric.exercises_completed + self.exercises_completed,
                    avg_technique_quality: weighted(metric.avg_technique_quality, avg_technique),
                }
            }
            None => MuscleGroupMetric {
                user_id: user_id.to_owned(),
                muscle_group: muscle_group.to_owned(),
                week_start,
                total_sets: self.total_sets,
                total_reps: self.total_reps,
                avg_rpe,
                max_rpe: avg_rpe,
                exercises_attempted: self.exercises_attempted,
                exercises_completed: self.exercises_completed,
                avg_technique_quality: avg_technique,
            },
        }
    }
}

/// Per-muscle-group totals of a session, keyed by muscle group name
#[must_use]
pub fn aggregate(
    rows: &[SessionExerciseRow],
    performances: &[ExercisePerformance],
    feedback: &SessionFeedback,
) -> BTreeMap<String, MuscleGroupTotals> {
    let mut totals: BTreeMap<String, MuscleGroupTotals> = BTreeMap::new();
    for row in rows {
        let load = ExerciseLoad::derive(row, performances, feedback);
        for group in row.muscle_groups() {
            totals.entry(group).or_default().add(&load);
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_start_is_previous_sunday() {
        // 2024-05-15 is a Wednesday
        let wednesday = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        assert_eq!(week_start(wednesday), NaiveDate::from_ymd_opt(2024, 5, 12).unwrap());

        let sunday = NaiveDate::from_ymd_opt(2024, 5, 12).unwrap();
        assert_eq!(week_start(sunday), sunday);
    }
}
