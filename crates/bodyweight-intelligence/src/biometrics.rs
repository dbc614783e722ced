// ABOUTME: Biometric estimator filling in body fat and heart rates missing from a submission
// ABOUTME: Banded BMI and age heuristics; supplied values are always kept as given
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Reference age of the body-fat heuristic
const BODY_FAT_REFERENCE_AGE: f64 = 25.0;
/// Body-fat percentage added per year above the reference age
const BODY_FAT_PER_YEAR: f64 = 0.2;

/// Resting heart rate at the reference age
const RESTING_HR_BASE: f64 = 70.0;
/// Reference age of the resting heart-rate heuristic
const RESTING_HR_REFERENCE_AGE: f64 = 30.0;
/// BPM added per year above the reference age
const RESTING_HR_PER_YEAR: f64 = 0.5;

/// Training HR as a multiple of resting HR
const TRAINING_HR_FACTOR: f64 = 1.6;

/// Whole years between `birth_date` and `reference`
///
/// One year is subtracted when the reference month/day falls before the
/// birthday. Dates in the future yield negative ages; no validation happens
/// here.
#[must_use]
pub fn age_on(birth_date: NaiveDate, reference: NaiveDate) -> i32 {
    let years = reference.year() - birth_date.year();
    if (reference.month(), reference.day()) < (birth_date.month(), birth_date.day()) {
        years - 1
    } else {
        years
    }
}

/// Body-mass index from kilograms and centimetres
#[must_use]
pub fn body_mass_index(weight_kg: f64, height_cm: f64) -> f64 {
    let meters = height_cm / 100.0;
    weight_kg / (meters * meters)
}

/// Round to one decimal place
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Default body-fat percentage for a BMI band, adjusted for age
#[must_use]
pub fn estimate_body_fat(bmi: f64, age: i32) -> f64 {
    let base = if bmi < 18.5 {
        12.0
    } else if bmi < 25.0 {
        18.0
    } else if bmi < 30.0 {
        25.0
    } else {
        32.0
    };
    BODY_FAT_PER_YEAR
        .mul_add(f64::from(age) - BODY_FAT_REFERENCE_AGE, base)
        .round()
}

/// Default resting heart rate from BMI and age
#[must_use]
pub fn estimate_resting_hr(bmi: f64, age: i32) -> f64 {
    let adjustment = if bmi > 28.0 {
        10.0
    } else if bmi < 22.0 {
        -5.0
    } else {
        0.0
    };
    RESTING_HR_PER_YEAR
        .mul_add(f64::from(age) - RESTING_HR_REFERENCE_AGE, RESTING_HR_BASE + adjustment)
        .round()
}

/// Default average training heart rate from resting heart rate
#[must_use]
pub fn estimate_training_hr(resting_hr: f64) -> f64 {
    (resting_hr * TRAINING_HR_FACTOR).round()
}

/// Measurements the estimator works from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiometricInput {
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Height in centimetres
    pub height_cm: f64,
    /// Birth date
    pub birth_date: NaiveDate,
    /// Body-fat percentage, if the user supplied one
    pub body_fat_percentage: Option<f64>,
    /// Resting heart rate, if the user supplied one
    pub resting_hr: Option<f64>,
    /// Training heart rate, if the user supplied one
    pub training_hr_avg: Option<f64>,
}

/// A value and whether the estimator produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// The value to store
    pub value: f64,
    /// `true` when the value was not supplied
    pub estimated: bool,
}

impl Estimate {
    fn supplied_or(supplied: Option<f64>, estimate: impl FnOnce() -> f64) -> Self {
        supplied.map_or_else(
            || Self {
                value: estimate(),
                estimated: true,
            },
            |value| Self {
                value,
                estimated: false,
            },
        )
    }
}

/// Output of [`BiometricEstimator::derive`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedBiometrics {
    /// Age in whole years on the reference date
    pub age: i32,
    /// Unrounded body-mass index
    pub bmi: f64,
    /// Body-fat percentage
    pub body_fat_percentage: Estimate,
    /// Resting heart rate
    pub resting_hr: Estimate,
    /// Average training heart rate
    pub training_hr_avg: Estimate,
}

/// Fills in biometrics the user did not provide during onboarding
#[derive(Debug, Clone, Copy, Default)]
pub struct BiometricEstimator;

impl BiometricEstimator {
    /// Derive age, BMI and the three optional biometrics as of `today`
    ///
    /// Training HR is estimated from the supplied resting HR when there is one.
    #[must_use]
    pub fn derive(input: &BiometricInput, today: NaiveDate) -> DerivedBiometrics {
        let age = age_on(input.birth_date, today);
        let bmi = body_mass_index(input.weight_kg, input.height_cm);

        let body_fat_percentage =
            Estimate::supplied_or(input.body_fat_percentage, || estimate_body_fat(bmi, age));
        let resting_hr = Estimate::supplied_or(input.resting_hr, || estimate_resting_hr(bmi, age));
        let training_hr_avg = Estimate::supplied_or(input.training_hr_avg, || {
            estimate_training_hr(resting_hr.value)
        });

        DerivedBiometrics {
            age,
            bmi,
            body_fat_percentage,
            resting_hr,
            training_hr_avg,
        }
    }
}
