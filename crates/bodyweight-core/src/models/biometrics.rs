// ABOUTME: Biometric snapshot rows, update requests, and the latest-biometrics response
// ABOUTME: Snapshots are point-in-time records distinct from the live profile row
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Origin of a biometric snapshot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Written by the onboarding flow
    Onboarding,
    /// Entered by the user
    #[default]
    Manual,
    /// Captured right before a routine
    PreRoutine,
    /// Imported automatically
    Automatic,
}

/// Snapshot row written to the datastore
///
/// Absent fields are omitted from the JSON so an upsert never clears a value
/// recorded earlier the same day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiometricSnapshotRow {
    /// Owner
    pub user_id: String,
    /// Calendar day (UTC) the snapshot describes
    pub snapshot_date: NaiveDate,
    /// Where the data came from
    pub data_source: DataSource,
    /// Weight in kilograms
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::numbers::compact_opt"
    )]
    pub weight: Option<f64>,
    /// Height in centimetres
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::numbers::compact_opt"
    )]
    pub height: Option<f64>,
    /// Body-fat percentage
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::numbers::compact_opt"
    )]
    pub body_fat_percentage: Option<f64>,
    /// Resting heart rate
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::numbers::compact_opt"
    )]
    pub resting_hr: Option<f64>,
    /// Average training heart rate
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::numbers::compact_opt"
    )]
    pub training_hr_avg: Option<f64>,
    /// Heart-rate variability trend
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::numbers::compact_opt"
    )]
    pub hrv_trend: Option<f64>,
    /// Sleep hours
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::numbers::compact_opt"
    )]
    pub sleep_hours: Option<f64>,
    /// Sleep quality
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::numbers::compact_opt"
    )]
    pub sleep_quality: Option<f64>,
    /// Fatigue level
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::numbers::compact_opt"
    )]
    pub fatigue_level: Option<f64>,
    /// Age at snapshot time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BiometricSnapshotRow {
    /// Empty snapshot for `user_id` on `snapshot_date`
    #[must_use]
    pub fn new(user_id: impl Into<String>, snapshot_date: NaiveDate, data_source: DataSource) -> Self {
        Self {
            user_id: user_id.into(),
            snapshot_date,
            data_source,
            weight: None,
            height: None,
            body_fat_percentage: None,
            resting_hr: None,
            training_hr_avg: None,
            hrv_trend: None,
            sleep_hours: None,
            sleep_quality: None,
            fatigue_level: None,
            age: None,
            notes: None,
        }
    }
}

/// Partial biometric update sent by clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BiometricUpdateRequest {
    /// Weight in kilograms (30-200)
    pub weight: Option<f64>,
    /// Body-fat percentage (5-50)
    pub body_fat_percentage: Option<f64>,
    /// Resting heart rate (40-120)
    pub resting_hr: Option<f64>,
    /// Average training heart rate (80-200)
    pub training_hr_avg: Option<f64>,
    /// Heart-rate variability trend
    pub hrv_trend: Option<f64>,
    /// Sleep hours (4-12)
    pub sleep_hours: Option<f64>,
    /// Sleep quality (1-5)
    pub sleep_quality: Option<f64>,
    /// Fatigue level (1-5)
    pub fatigue_level: Option<f64>,
    /// Snapshot origin, `manual` when absent
    pub data_source: Option<DataSource>,
    /// Free-form notes
    pub notes: Option<String>,
}

impl BiometricUpdateRequest {
    /// Names of the fields present in this update, in declaration order
    #[must_use]
    pub fn present_fields(&self) -> Vec<&'static str> {
        let flags = [
            ("weight", self.weight.is_some()),
            ("body_fat_percentage", self.body_fat_percentage.is_some()),
            ("resting_hr", self.resting_hr.is_some()),
            ("training_hr_avg", self.training_hr_avg.is_some()),
            ("hrv_trend", self.hrv_trend.is_some()),
            ("sleep_hours", self.sleep_hours.is_some()),
            ("sleep_quality", self.sleep_quality.is_some()),
            ("fatigue_level", self.fatigue_level.is_some()),
            ("data_source", self.data_source.is_some()),
            ("notes", self.notes.is_some()),
        ];
        flags
            .into_iter()
            .filter_map(|(name, present)| present.then_some(name))
            .collect()
    }
}

/// Metrics derived from a stored snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DerivedMetrics {
    /// Body-mass index rounded to one decimal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    /// Training HR minus resting HR
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate_reserve: Option<f64>,
}

/// Latest biometrics returned to clients
///
/// Built either from the most recent snapshot or, when the user has none, from
/// the live profile row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LatestBiometrics {
    /// Weight in kilograms
    pub weight: Option<Value>,
    /// Height in centimetres
    pub height: Option<Value>,
    /// Body-fat percentage
    pub body_fat_percentage: Option<Value>,
    /// Resting heart rate
    pub resting_hr: Option<Value>,
    /// Average training heart rate
    pub training_hr_avg: Option<Value>,
    /// Sleep hours
    pub sleep_hours: Option<Value>,
    /// Sleep quality
    pub sleep_quality: Option<Value>,
    /// Fatigue level
    pub fatigue_level: Option<Value>,
    /// Age (snapshot only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<Value>,
    /// Body-mass index (snapshot only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<Value>,
    /// Profile write timestamp (profile only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Value>,
    /// Snapshot date or profile `updated_at`
    pub last_updated: Option<Value>,
    /// Age of the snapshot in days (snapshot only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_old: Option<Value>,
}

impl LatestBiometrics {
    /// Build from a row returned by the latest-biometrics RPC
    #[must_use]
    pub fn from_snapshot(row: &Value) -> Self {
        let field = |name: &str| row.get(name).filter(|v| !v.is_null()).cloned();
        Self {
            weight: field("weight"),
            height: field("height"),
            body_fat_percentage: field("body_fat_percentage"),
            resting_hr: field("resting_hr"),
            training_hr_avg: field("training_hr_avg"),
            sleep_hours: field("sleep_hours"),
            sleep_quality: field("sleep_quality"),
            fatigue_level: field("fatigue_level"),
            age: field("age"),
            bmi: field("bmi"),
            updated_at: None,
            last_updated: field("snapshot_date"),
            days_old: field("days_old"),
        }
    }

    /// Build from the live profile row
    #[must_use]
    pub fn from_profile(row: &Value) -> Self {
        let field = |name: &str| row.get(name).filter(|v| !v.is_null()).cloned();
        Self {
            weight: field("weight"),
            height: field("height"),
            body_fat_percentage: field("body_fat_percentage"),
            resting_hr: field("resting_hr"),
            training_hr_avg: field("training_hr_avg"),
            sleep_hours: field("sleep_hours"),
            sleep_quality: field("sleep_quality"),
            fatigue_level: field("fatigue_level"),
            age: None,
            bmi: None,
            updated_at: field("updated_at"),
            last_updated: field("updated_at"),
            days_old: None,
        }
    }
}
