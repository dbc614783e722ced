// ABOUTME: Biometric service for latest-value lookup and manual updates
// ABOUTME: Reads snapshots through the datastore RPC and writes today's snapshot on update
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use bodyweight_core::models::{
    BiometricSnapshotRow, BiometricUpdateRequest, DerivedMetrics, LatestBiometrics,
};
use bodyweight_intelligence::biometrics::{age_on, body_mass_index, round_to_tenth};
use bodyweight_intelligence::validate_biometric_update;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::{conceal, non_empty_str, positive_number, today};
use crate::backend::{single, AuthenticatedUser, RowQuery};
use crate::constants::{conflicts, messages, rpc, tables};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use crate::resources::ServerResources;

/// Profile columns returned when the user has no snapshot yet
const PROFILE_BIOMETRIC_COLUMNS: &str = "weight, height, body_fat_percentage, resting_hr, \
     training_hr_avg, sleep_hours, sleep_quality, fatigue_level, updated_at";

/// Body returned by `POST /update-biometrics`
#[derive(Debug, Serialize)]
pub struct BiometricUpdateResponse {
    /// Always `true`
    pub success: bool,
    /// Snapshot row as stored
    pub biometric_snapshot: Value,
    /// Metrics computed from the stored snapshot
    pub derived_metrics: DerivedMetrics,
    /// Request fields that were present
    pub updated_fields: Vec<&'static str>,
    /// Confirmation message
    pub message: &'static str,
}

/// Biometric operations
pub struct BiometricsService {
    resources: Arc<ServerResources>,
}

impl BiometricsService {
    /// Create a service over the shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Latest biometrics of `user`
    ///
    /// Prefers the most recent snapshot; falls back to the live profile when the
    /// RPC fails or finds nothing.
    ///
    /// # Errors
    ///
    /// Returns a 400 carrying the datastore message when the profile fallback fails
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn latest(&self, user: &AuthenticatedUser) -> AppResult<LatestBiometrics> {
        let args = json!({ "user_uuid": user.id });
        match self
            .resources
            .datastore
            .rpc(&user.access_token, rpc::GET_LATEST_BIOMETRICS, &args)
            .await
        {
            Ok(result) => {
                if let Some(row) = first_row(&result) {
                    return Ok(LatestBiometrics::from_snapshot(row));
                }
                debug!("No biometric snapshot found, reading profile");
            }
            Err(e) => warn!("Latest biometrics RPC failed, reading profile: {e}"),
        }

        let query = RowQuery::table(tables::USER_PROFILES)
            .select(PROFILE_BIOMETRIC_COLUMNS)
            .eq("id", &user.id);
        let profile = self
            .resources
            .datastore
            .select(&user.access_token, &query)
            .await
            .and_then(|rows| single(rows, "Profile"))
            .map_err(|e| AppError::invalid_input(e.message))?;

        Ok(LatestBiometrics::from_profile(&profile))
    }

    /// Record a manual biometric update for today
    ///
    /// Values are range-checked, written as today's snapshot, and copied onto
    /// the profile's quick-access columns. Onboarding estimates are never
    /// recomputed.
    ///
    /// # Errors
    ///
    /// Returns a 400 listing every range violation, and a generic 500 when the
    /// profile cannot be read or the snapshot cannot be written
    #[tracing::instrument(skip(self, user, update), fields(user_id = %user.id))]
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        update: BiometricUpdateRequest,
    ) -> AppResult<BiometricUpdateResponse> {
        let violations = validate_biometric_update(&update);
        if !violations.is_empty() {
            return Err(
                AppError::new(ErrorCode::ValueOutOfRange, messages::VALIDATION_FAILED)
                    .with_field("validation_errors", json!(violations)),
            );
        }

        let profile = self
            .baseline_profile(user)
            .await
            .map_err(conceal(&user.id, "update_biometrics", messages::INTERNAL_ERROR))?;

        let snapshot_date = today();
        let row = snapshot_from_update(&user.id, snapshot_date, &update, &profile);
        let snapshot = self
            .write_snapshot(user, &row)
            .await
            .map_err(conceal(&user.id, "update_biometrics", messages::INTERNAL_ERROR))?;

        if let Some(patch) = quick_access_patch(&update) {
            let query = RowQuery::table(tables::USER_PROFILES).eq("id", &user.id);
            if let Err(e) = self
                .resources
                .datastore
                .update(&user.access_token, &query, &patch)
                .await
            {
                AppLogger::log_degraded_step(&user.id, "profile_quick_access", &e.to_string());
            }
        }

        Ok(BiometricUpdateResponse {
            success: true,
            derived_metrics: derived_metrics(&snapshot),
            biometric_snapshot: snapshot,
            updated_fields: update.present_fields(),
            message: messages::BIOMETRICS_UPDATED,
        })
    }

    async fn baseline_profile(&self, user: &AuthenticatedUser) -> AppResult<Value> {
        let query = RowQuery::table(tables::USER_PROFILES)
            .select("height, birth_date, age")
            .eq("id", &user.id);
        let rows = self
            .resources
            .datastore
            .select(&user.access_token, &query)
            .await?;
        single(rows, "Profile")
    }

    async fn write_snapshot(
        &self,
        user: &AuthenticatedUser,
        row: &BiometricSnapshotRow,
    ) -> AppResult<Value> {
        let rows = self
            .resources
            .datastore
            .upsert(
                &user.access_token,
                tables::BIOMETRIC_SNAPSHOTS,
                &serde_json::to_value(row)?,
                Some(conflicts::SNAPSHOT_PER_DAY),
            )
            .await?;
        single(rows, "Biometric snapshot")
    }
}

/// First row of an RPC result, which may be an array or a bare object
fn first_row(result: &Value) -> Option<&Value> {
    match result {
        Value::Array(rows) => rows.first(),
        Value::Object(_) => Some(result),
        _ => None,
    }
}

/// Stored age, or the age computed from the stored birth date
fn profile_age(profile: &Value, on: NaiveDate) -> Option<i32> {
    let stored = profile
        .get("age")
        .and_then(Value::as_i64)
        .filter(|age| *age != 0)
        .and_then(|age| i32::try_from(age).ok());
    stored.or_else(|| {
        non_empty_str(profile, "birth_date")
            .and_then(|raw| NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d").ok())
            .map(|birth| age_on(birth, on))
            .filter(|age| *age != 0)
    })
}

/// Snapshot row for a manual update, carrying height and age from the profile
fn snapshot_from_update(
    user_id: &str,
    snapshot_date: NaiveDate,
    update: &BiometricUpdateRequest,
    profile: &Value,
) -> BiometricSnapshotRow {
    BiometricSnapshotRow {
        weight: update.weight,
        body_fat_percentage: update.body_fat_percentage,
        resting_hr: update.resting_hr,
        training_hr_avg: update.training_hr_avg,
        hrv_trend: update.hrv_trend,
        sleep_hours: update.sleep_hours,
        sleep_quality: update.sleep_quality,
        fatigue_level: update.fatigue_level,
        notes: update.notes.clone().filter(|notes| !notes.is_empty()),
        height: positive_number(profile, "height"),
        age: profile_age(profile, snapshot_date),
        ..BiometricSnapshotRow::new(
            user_id,
            snapshot_date,
            update.data_source.unwrap_or_default(),
        )
    }
}

/// Profile columns mirrored from an update, `None` when nothing applies
fn quick_access_patch(update: &BiometricUpdateRequest) -> Option<Value> {
    let mut patch = Map::new();
    if let Some(weight) = update.weight {
        patch.insert("weight".into(), json!(weight));
    }
    if let Some(hours) = update.sleep_hours {
        patch.insert("sleep_hours".into(), json!(hours));
    }
    if let Some(quality) = update.sleep_quality {
        patch.insert("sleep_quality".into(), json!(quality));
    }
    if let Some(fatigue) = update.fatigue_level {
        patch.insert("fatigue_level".into(), json!(fatigue));
    }
    if patch.is_empty() {
        return None;
    }
    patch.insert("updated_at".into(), json!(Utc::now().to_rfc3339()));
    Some(Value::Object(patch))
}

/// BMI and heart-rate reserve of a stored snapshot
fn derived_metrics(snapshot: &Value) -> DerivedMetrics {
    let bmi = positive_number(snapshot, "weight")
        .zip(positive_number(snapshot, "height"))
        .map(|(weight, height)| round_to_tenth(body_mass_index(weight, height)));
    let heart_rate_reserve = positive_number(snapshot, "resting_hr")
        .zip(positive_number(snapshot, "training_hr_avg"))
        .map(|(resting, training)| training - resting);
    DerivedMetrics {
        bmi,
        heart_rate_reserve,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_metrics_need_both_inputs() {
        let full = json!({ "weight": 80, "height": 180, "resting_hr": 60, "training_hr_avg": 140 });
        let metrics = derived_metrics(&full);
        assert_eq!(metrics.bmi, Some(24.7));
        assert_eq!(metrics.heart_rate_reserve, Some(80.0));

        let partial = json!({ "weight": 80, "resting_hr": 60 });
        assert_eq!(derived_metrics(&partial), DerivedMetrics::default());
    }

    #[test]
    fn test_profile_age_prefers_stored_value() {
        let on = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(profile_age(&json!({ "age": 33, "birth_date": "2000-01-01" }), on), Some(33));
        assert_eq!(profile_age(&json!({ "age": null, "birth_date": "2000-01-01" }), on), Some(24));
        assert_eq!(profile_age(&json!({ "age": null }), on), None);
    }

    #[test]
    fn test_quick_access_patch_only_when_relevant() {
        let notes_only = BiometricUpdateRequest {
            notes: Some("felt good".into()),
            ..BiometricUpdateRequest::default()
        };
        assert!(quick_access_patch(&notes_only).is_none());

        let weight = BiometricUpdateRequest {
            weight: Some(72.5),
            ..BiometricUpdateRequest::default()
        };
        let patch = quick_access_patch(&weight).unwrap();
        assert_eq!(patch["weight"], 72.5);
        assert!(patch.get("updated_at").is_some());
        assert!(patch.get("sleep_hours").is_none());
    }
}
