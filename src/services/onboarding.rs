// ABOUTME: Onboarding service deriving the initial profile from a client submission
// ABOUTME: Estimates missing biometrics, writes the profile, and records the first snapshot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use bodyweight_core::models::{
    BiometricSnapshotRow, CalculatedValues, DataSource, OnboardingRequest, ProfileUpdate,
};
use bodyweight_intelligence::biometrics::round_to_tenth;
use bodyweight_intelligence::{BiometricEstimator, BiometricInput, DerivedBiometrics};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{conceal, today};
use crate::backend::{maybe_single, single, AuthenticatedUser, RowQuery};
use crate::constants::{conflicts, messages, tables};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use crate::resources::ServerResources;

/// Notes stored on the snapshot written by onboarding
pub const ONBOARDING_SNAPSHOT_NOTES: &str = "Initial onboarding data with BMI-based estimates";

/// Body returned by `POST /complete-onboarding`
#[derive(Debug, Serialize)]
pub struct OnboardingResponse {
    /// Always `true`
    pub success: bool,
    /// Profile row as stored
    pub profile: Value,
    /// Snapshot row as stored, `null` when the snapshot write failed
    pub biometric_snapshot: Option<Value>,
    /// Values computed from the submission
    pub calculated_values: CalculatedValues,
    /// Confirmation message
    pub message: &'static str,
}

/// Parse a birth date given as `YYYY-MM-DD` or as a full RFC 3339 timestamp
///
/// # Errors
///
/// Returns `InvalidFormat` when neither form parses
pub fn parse_birth_date(raw: &str) -> AppResult<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| {
            AppError::new(
                ErrorCode::InvalidFormat,
                "Invalid birth_date: expected YYYY-MM-DD",
            )
        })
}

/// Onboarding operations
pub struct OnboardingService {
    resources: Arc<ServerResources>,
}

impl OnboardingService {
    /// Create a service over the shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Complete onboarding for `user`
    ///
    /// # Errors
    ///
    /// Returns a 400 when a required field is missing or `birth_date` does not
    /// parse, and a generic 500 when the profile update fails. A failed
    /// snapshot write is logged and reported as a `null` snapshot.
    #[tracing::instrument(skip(self, user, request), fields(user_id = %user.id))]
    pub async fn complete(
        &self,
        user: &AuthenticatedUser,
        request: OnboardingRequest,
    ) -> AppResult<OnboardingResponse> {
        let (birth_date, weight, height) = request
            .required_fields()
            .ok_or_else(|| AppError::missing_fields(messages::MISSING_ONBOARDING_FIELDS))?;
        let birth_date = parse_birth_date(birth_date)?;

        let snapshot_date = today();
        let derived = BiometricEstimator::derive(
            &BiometricInput {
                weight_kg: weight,
                height_cm: height,
                birth_date,
                body_fat_percentage: request.body_fat_percentage,
                resting_hr: request.resting_hr,
                training_hr_avg: request.training_hr_avg,
            },
            snapshot_date,
        );
        info!(
            age = derived.age,
            bmi = derived.bmi,
            body_fat_estimated = derived.body_fat_percentage.estimated,
            resting_hr_estimated = derived.resting_hr.estimated,
            training_hr_estimated = derived.training_hr_avg.estimated,
            "Derived onboarding biometrics"
        );

        let profile = self
            .update_profile(user, profile_update(user, &request, birth_date, &derived))
            .await
            .map_err(conceal(&user.id, "complete_onboarding", messages::INTERNAL_ERROR))?;

        let snapshot_row = initial_snapshot(&user.id, snapshot_date, &request, &derived);
        let biometric_snapshot = match self.write_snapshot(user, &snapshot_row).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                AppLogger::log_degraded_step(&user.id, "onboarding_snapshot", &e.to_string());
                None
            }
        };

        Ok(OnboardingResponse {
            success: true,
            profile,
            biometric_snapshot,
            calculated_values: CalculatedValues {
                age: derived.age,
                bmi: round_to_tenth(derived.bmi),
                estimated_body_fat: derived.body_fat_percentage.value,
                estimated_resting_hr: derived.resting_hr.value,
                estimated_training_hr: derived.training_hr_avg.value,
            },
            message: messages::ONBOARDING_COMPLETED,
        })
    }

    async fn update_profile(
        &self,
        user: &AuthenticatedUser,
        profile: ProfileUpdate,
    ) -> AppResult<Value> {
        let query = RowQuery::table(tables::USER_PROFILES).eq("id", &user.id);
        let rows = self
            .resources
            .datastore
            .update(&user.access_token, &query, &serde_json::to_value(profile)?)
            .await?;
        single(rows, "Profile")
    }

    async fn write_snapshot(
        &self,
        user: &AuthenticatedUser,
        snapshot: &BiometricSnapshotRow,
    ) -> AppResult<Option<Value>> {
        let rows = self
            .resources
            .datastore
            .upsert(
                &user.access_token,
                tables::BIOMETRIC_SNAPSHOTS,
                &serde_json::to_value(snapshot)?,
                Some(conflicts::SNAPSHOT_PER_DAY),
            )
            .await?;
        Ok(maybe_single(rows))
    }
}

/// Profile row combining the submission with derived values
fn profile_update(
    user: &AuthenticatedUser,
    request: &OnboardingRequest,
    birth_date: NaiveDate,
    derived: &DerivedBiometrics,
) -> ProfileUpdate {
    ProfileUpdate {
        id: user.id.clone(),
        email: user.email.clone(),
        birth_date,
        age: derived.age,
        weight: request.weight.unwrap_or_default(),
        height: request.height.unwrap_or_default(),
        body_fat_percentage: derived.body_fat_percentage.value,
        resting_hr: derived.resting_hr.value,
        training_hr_avg: derived.training_hr_avg.value,
        sleep_hours: request.sleep_hours,
        sleep_quality: request.sleep_quality,
        fatigue_level: request.fatigue_level,
        fitness_level: request.fitness_level,
        experience_years: request.experience_years,
        activity_level: request.activity_level,
        available_days_per_week: request.available_days_per_week,
        preferred_session_duration: request.preferred_session_duration,
        preferred_intensity: request.preferred_intensity,
        updated_at: Utc::now(),
    }
}

/// First snapshot of a user, dated `snapshot_date`
fn initial_snapshot(
    user_id: &str,
    snapshot_date: NaiveDate,
    request: &OnboardingRequest,
    derived: &DerivedBiometrics,
) -> BiometricSnapshotRow {
    BiometricSnapshotRow {
        weight: request.weight,
        height: request.height,
        body_fat_percentage: Some(derived.body_fat_percentage.value),
        resting_hr: Some(derived.resting_hr.value),
        training_hr_avg: Some(derived.training_hr_avg.value),
        sleep_hours: request.sleep_hours,
        sleep_quality: request.sleep_quality,
        fatigue_level: request.fatigue_level,
        age: Some(derived.age),
        notes: Some(ONBOARDING_SNAPSHOT_NOTES.to_owned()),
        ..BiometricSnapshotRow::new(user_id, snapshot_date, DataSource::Onboarding)
    }
}
