// ABOUTME: Summary statistics over a page of training history
// ABOUTME: Completion, duration and adherence averages plus per-category exercise counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::{BTreeMap, BTreeSet};

use bodyweight_core::models::numbers::compact;
use bodyweight_core::models::{SessionExerciseRow, SessionRecord};
use serde::Serialize;
use serde_json::Value;

use crate::stats::{mean, round_to};

/// Category reported for exercises without an embedded catalogue record
const UNKNOWN_CATEGORY: &str = "unknown";
/// Name reported for exercises without an embedded catalogue record
const UNKNOWN_EXERCISE: &str = "Unknown";

/// Averages over the completed sessions of a page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    /// Sessions on the page
    pub total_sessions: usize,
    /// Completed sessions on the page
    pub completed_sessions: usize,
    /// Mean actual (else planned) duration, whole minutes
    #[serde(serialize_with = "compact")]
    pub average_duration_minutes: f64,
    /// Mean share of exercises with completed sets, two decimals
    pub average_completion_rate: f64,
    /// Mean adherence index, two decimals
    pub average_ica_score: f64,
}

/// Exercise count and mean RPE of one catalogue category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStatistics {
    /// Catalogue category
    pub category: String,
    /// Session exercises in the category
    pub count: usize,
    /// Mean reported RPE, unreported counting as zero
    pub average_rpe: f64,
}

/// Exercise counts over a page of sessions with embedded exercises
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseStatistics {
    /// Session exercises on the page
    pub total_exercises: usize,
    /// Distinct catalogue exercises
    pub unique_exercises: usize,
    /// Per-category counts, by category name
    pub exercises_by_category: Vec<CategoryStatistics>,
    /// Occurrences of each exercise, by exercise name
    pub most_frequent_exercises: BTreeMap<String, usize>,
}

/// Share of a session's exercises with at least one completed set
///
/// A session without exercises counts as fully completed.
#[must_use]
pub fn session_completion(session: &SessionRecord) -> f64 {
    let exercises = session.exercises();
    if exercises.is_empty() {
        return 1.0;
    }
    let done = exercises
        .iter()
        .filter(|row| row.sets_completed.is_some_and(|sets| sets > 0.0))
        .count();
    done as f64 / exercises.len() as f64
}

/// Summary of `sessions`; averages cover completed sessions only
#[must_use]
pub fn summarize(sessions: &[SessionRecord]) -> HistorySummary {
    let completed: Vec<&SessionRecord> = sessions.iter().filter(|s| s.is_completed()).collect();

    let duration = mean(completed.iter().map(|s| {
        s.actual_duration
            .filter(|d| *d != 0.0)
            .or(s.planned_duration)
            .unwrap_or(0.0)
    }));
    let completion = mean(completed.iter().map(|s| session_completion(s)));
    let ica = mean(completed.iter().map(|s| s.ica_score.unwrap_or(0.0)));

    HistorySummary {
        total_sessions: sessions.len(),
        completed_sessions: completed.len(),
        average_duration_minutes: duration.unwrap_or(0.0).round(),
        average_completion_rate: round_to(completion.unwrap_or(0.0), 2),
        average_ica_score: round_to(ica.unwrap_or(0.0), 2),
    }
}

fn embedded_text<'a>(row: &'a SessionExerciseRow, key: &str) -> Option<&'a str> {
    row.exercises
        .as_ref()
        .and_then(|exercise| exercise.get(key))
        .and_then(Value::as_str)
}

/// Exercise counts over every exercise embedded in `sessions`
#[must_use]
pub fn exercise_statistics(sessions: &[SessionRecord]) -> ExerciseStatistics {
    let exercises: Vec<&SessionExerciseRow> =
        sessions.iter().flat_map(SessionRecord::exercises).collect();

    let mut by_category: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut by_name: BTreeMap<String, usize> = BTreeMap::new();
    for row in &exercises {
        by_category
            .entry(embedded_text(row, "category").unwrap_or(UNKNOWN_CATEGORY))
            .or_default()
            .push(row.rpe_reported.unwrap_or(0.0));
        *by_name
            .entry(embedded_text(row, "name").unwrap_or(UNKNOWN_EXERCISE).to_owned())
            .or_default() += 1;
    }

    let unique: BTreeSet<&str> = exercises
        .iter()
        .filter_map(|row| row.exercise_id.as_deref())
        .collect();

    ExerciseStatistics {
        total_exercises: exercises.len(),
        unique_exercises: unique.len(),
        exercises_by_category: by_category
            .into_iter()
            .map(|(category, rpes)| CategoryStatistics {
                category: category.to_owned(),
                count: rpes.len(),
                average_rpe: mean(rpes).unwrap_or(0.0),
            })
            .collect(),
        most_frequent_exercises: by_name,
    }
}
