// ABOUTME: Training history queries and the read-only session, performance, and metric rows analysed
// ABOUTME: Row views ignore unknown columns so embedded relations can be selected freely
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::session::SessionExerciseRow;

/// Sessions returned when the request does not ask for a page size
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
/// Largest page of sessions returned by one request
pub const MAX_HISTORY_LIMIT: usize = 100;

/// `YYYY-MM-DD` prefix of a date or timestamp column
#[must_use]
pub fn calendar_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d").ok()
}

/// Session status selected by a history request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    /// Generated, not yet trained
    Planned,
    /// Started, not yet finished
    InProgress,
    /// Feedback saved
    #[default]
    Completed,
    /// Skipped by the user
    Skipped,
    /// Every status
    All,
}

impl HistoryStatus {
    /// Parse the wire name of a status
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "planned" => Some(Self::Planned),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "skipped" => Some(Self::Skipped),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Value of the `status` column to filter on, `None` for every status
    #[must_use]
    pub const fn column_value(self) -> Option<&'static str> {
        match self {
            Self::Planned => Some("planned"),
            Self::InProgress => Some("in_progress"),
            Self::Completed => Some("completed"),
            Self::Skipped => Some("skipped"),
            Self::All => None,
        }
    }
}

/// Training history request
///
/// Every field is optional; a page of ten completed sessions with their
/// exercises is returned by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingHistoryRequest {
    /// Page size, capped at 100
    pub limit: Option<i64>,
    /// Sessions skipped before the page
    pub offset: Option<i64>,
    /// Status filter, `completed` when absent
    pub status: Option<HistoryStatus>,
    /// Earliest session date, inclusive
    pub start_date: Option<NaiveDate>,
    /// Latest session date, inclusive
    pub end_date: Option<NaiveDate>,
    /// Embed the session exercises, `true` when absent
    pub include_exercises: Option<bool>,
    /// Embed per-set performance under each exercise
    pub include_performance: Option<bool>,
}

impl TrainingHistoryRequest {
    /// Page size: absent or non-positive values use the default, large ones are capped
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
            .filter(|limit| *limit > 0)
            .map_or(DEFAULT_HISTORY_LIMIT, |limit| {
                usize::try_from(limit).unwrap_or(MAX_HISTORY_LIMIT)
            })
            .min(MAX_HISTORY_LIMIT)
    }

    /// Rows to skip, zero when absent or negative
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
            .and_then(|offset| usize::try_from(offset).ok())
            .unwrap_or(0)
    }

    /// Status filter
    #[must_use]
    pub fn status(&self) -> HistoryStatus {
        self.status.unwrap_or_default()
    }

    /// Whether session exercises are embedded
    #[must_use]
    pub fn include_exercises(&self) -> bool {
        self.include_exercises.unwrap_or(true)
    }

    /// Whether per-set performance is embedded
    #[must_use]
    pub fn include_performance(&self) -> bool {
        self.include_performance.unwrap_or(false)
    }
}

/// A training session with its embedded exercises, as read for history and analysis
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionRecord {
    /// Session date
    pub session_date: Option<String>,
    /// Session status
    pub status: Option<String>,
    /// Planned duration in minutes
    pub planned_duration: Option<f64>,
    /// Actual duration in minutes
    pub actual_duration: Option<f64>,
    /// Adherence index computed for the session
    pub ica_score: Option<f64>,
    /// Embedded session exercises
    pub session_exercises: Option<Vec<SessionExerciseRow>>,
}

impl SessionRecord {
    /// Calendar day of the session
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.session_date.as_deref().and_then(calendar_day)
    }

    /// Embedded exercises, empty when none were selected
    #[must_use]
    pub fn exercises(&self) -> &[SessionExerciseRow] {
        self.session_exercises.as_deref().unwrap_or_default()
    }

    /// Whether feedback was saved for the session
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }
}

/// A stored performance record, as read for muscle-group analysis
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PerformanceEntry {
    /// Date of the session the set belongs to
    pub session_date: Option<String>,
    /// Reps completed
    pub reps_completed: Option<f64>,
    /// RPE reported
    pub rpe_reported: Option<f64>,
    /// Muscle groups trained
    pub muscle_groups: Option<Vec<String>>,
    /// Embedded exercise record
    pub exercises: Option<Value>,
}

impl PerformanceEntry {
    /// Calendar day of the session
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.session_date.as_deref().and_then(calendar_day)
    }

    /// Catalogue progression level of the exercise, when embedded
    #[must_use]
    pub fn progression_level(&self) -> Option<f64> {
        self.exercises
            .as_ref()
            .and_then(|exercise| exercise.get("progression_level"))
            .and_then(Value::as_f64)
            .filter(|level| *level > 0.0)
    }
}

/// Weekly set volume of one muscle group, as read for evolution analysis
#[derive(Debug, Clone, Deserialize)]
pub struct WeeklyVolume {
    /// Muscle group name
    pub muscle_group: String,
    /// Sunday starting the week
    pub week_start: NaiveDate,
    /// Sets performed
    #[serde(default)]
    pub total_sets: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_limit_defaults_and_caps() {
        let request = |limit: Option<i64>| TrainingHistoryRequest {
            limit,
            ..TrainingHistoryRequest::default()
        };
        assert_eq!(request(None).limit(), 10);
        assert_eq!(request(Some(0)).limit(), 10);
        assert_eq!(request(Some(-3)).limit(), 10);
        assert_eq!(request(Some(25)).limit(), 25);
        assert_eq!(request(Some(500)).limit(), 100);
    }

    #[test]
    fn test_session_record_tolerates_missing_relations() {
        let record: SessionRecord = serde_json::from_value(json!({
            "id": "s-1",
            "session_date": "2024-05-15T00:00:00Z",
            "status": "completed"
        }))
        .unwrap();
        assert!(record.exercises().is_empty());
        assert!(record.is_completed());
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2024, 5, 15));
    }
}
