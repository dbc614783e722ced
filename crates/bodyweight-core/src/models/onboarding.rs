// ABOUTME: Onboarding submission payload and the profile row derived from it
// ABOUTME: Lifestyle enums and the calculated values returned to the client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Self-reported fitness level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FitnessLevel {
    /// New to structured training
    Beginner,
    /// Trains regularly
    Intermediate,
    /// Years of consistent training
    Advanced,
}

/// Daily activity outside training
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no activity
    Sedentary,
    /// Light activity
    Light,
    /// Moderate activity
    Moderate,
    /// Active most days
    Active,
    /// Physically demanding daily routine
    VeryActive,
}

/// Onboarding submission as sent by the clients
///
/// `birth_date`, `weight` and `height` are required; everything else is
/// optional on the wire and forwarded as given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnboardingRequest {
    /// Birth date, `YYYY-MM-DD`
    pub birth_date: Option<String>,
    /// Weight in kilograms
    pub weight: Option<f64>,
    /// Height in centimetres
    pub height: Option<f64>,

    /// Body-fat percentage, estimated when absent
    pub body_fat_percentage: Option<f64>,
    /// Resting heart rate (BPM), estimated when absent
    pub resting_hr: Option<f64>,
    /// Average training heart rate (BPM), estimated when absent
    pub training_hr_avg: Option<f64>,

    /// Average nightly sleep in hours
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub sleep_hours: Option<f64>,
    /// Sleep quality, 1-5
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub sleep_quality: Option<f64>,
    /// Fatigue level, 1-5
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub fatigue_level: Option<f64>,

    /// Self-reported fitness level
    pub fitness_level: Option<FitnessLevel>,
    /// Years of training experience
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub experience_years: Option<f64>,
    /// Daily activity level
    pub activity_level: Option<ActivityLevel>,

    /// Training days available per week
    pub available_days_per_week: Option<i32>,
    /// Preferred session length in minutes
    pub preferred_session_duration: Option<i32>,
    /// Preferred intensity
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub preferred_intensity: Option<f64>,
}

impl OnboardingRequest {
    /// Required fields, `None` when any is missing, empty, or zero
    #[must_use]
    pub fn required_fields(&self) -> Option<(&str, f64, f64)> {
        let birth_date = self.birth_date.as_deref().filter(|s| !s.trim().is_empty())?;
        let weight = self.weight.filter(|w| *w != 0.0)?;
        let height = self.height.filter(|h| *h != 0.0)?;
        Some((birth_date, weight, height))
    }
}

/// Profile row written by onboarding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// Auth user id (primary key)
    pub id: String,
    /// Account email
    pub email: Option<String>,
    /// Birth date
    pub birth_date: NaiveDate,
    /// Age in whole years at submission
    pub age: i32,
    /// Weight in kilograms
    #[serde(serialize_with = "super::numbers::compact")]
    pub weight: f64,
    /// Height in centimetres
    #[serde(serialize_with = "super::numbers::compact")]
    pub height: f64,
    /// Provided or estimated body-fat percentage
    #[serde(serialize_with = "super::numbers::compact")]
    pub body_fat_percentage: f64,
    /// Provided or estimated resting heart rate
    #[serde(serialize_with = "super::numbers::compact")]
    pub resting_hr: f64,
    /// Provided or estimated training heart rate
    #[serde(serialize_with = "super::numbers::compact")]
    pub training_hr_avg: f64,
    /// Sleep hours
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub sleep_hours: Option<f64>,
    /// Sleep quality
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub sleep_quality: Option<f64>,
    /// Fatigue level
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub fatigue_level: Option<f64>,
    /// Fitness level
    pub fitness_level: Option<FitnessLevel>,
    /// Experience years
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub experience_years: Option<f64>,
    /// Activity level
    pub activity_level: Option<ActivityLevel>,
    /// Available days per week
    pub available_days_per_week: Option<i32>,
    /// Preferred session duration
    pub preferred_session_duration: Option<i32>,
    /// Preferred intensity
    #[serde(serialize_with = "super::numbers::compact_opt")]
    pub preferred_intensity: Option<f64>,
    /// Write timestamp
    pub updated_at: DateTime<Utc>,
}

/// Values computed during onboarding, echoed back to the client
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CalculatedValues {
    /// Age in whole years
    pub age: i32,
    /// Body-mass index rounded to one decimal
    #[serde(serialize_with = "super::numbers::compact")]
    pub bmi: f64,
    /// Body-fat percentage stored on the profile
    #[serde(serialize_with = "super::numbers::compact")]
    pub estimated_body_fat: f64,
    /// Resting heart rate stored on the profile
    #[serde(serialize_with = "super::numbers::compact")]
    pub estimated_resting_hr: f64,
    /// Training heart rate stored on the profile
    #[serde(serialize_with = "super::numbers::compact")]
    pub estimated_training_hr: f64,
}
