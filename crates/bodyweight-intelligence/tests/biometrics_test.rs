// ABOUTME: Unit tests for the onboarding biometric estimator and update range validation
// ABOUTME: Pure algorithm tests without database or network dependencies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use bodyweight_core::models::BiometricUpdateRequest;
use bodyweight_intelligence::biometrics::{
    age_on, body_mass_index, estimate_body_fat, estimate_resting_hr, estimate_training_hr,
    round_to_tenth,
};
use bodyweight_intelligence::validation::{self, validate_biometric_update};
use bodyweight_intelligence::{BiometricEstimator, BiometricInput};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn input(body_fat: Option<f64>, resting: Option<f64>, training: Option<f64>) -> BiometricInput {
    BiometricInput {
        weight_kg: 76.5,
        height_cm: 175.0,
        birth_date: date(1994, 3, 10),
        body_fat_percentage: body_fat,
        resting_hr: resting,
        training_hr_avg: training,
    }
}

// === Age ===

#[test]
fn test_age_one_year_exactly() {
    assert_eq!(age_on(date(2023, 8, 1), date(2024, 8, 1)), 1);
}

#[test]
fn test_age_born_today() {
    let today = date(2024, 8, 1);
    assert_eq!(age_on(today, today), 0);
}

#[test]
fn test_age_day_before_birthday() {
    assert_eq!(age_on(date(1990, 12, 31), date(2024, 12, 30)), 33);
}

#[test]
fn test_age_leap_day_birthday() {
    // Feb 29 birthdays turn over on Mar 1 in non-leap years
    assert_eq!(age_on(date(2000, 2, 29), date(2023, 2, 28)), 22);
    assert_eq!(age_on(date(2000, 2, 29), date(2023, 3, 1)), 23);
}

// === BMI ===

#[test]
fn test_bmi() {
    let bmi = body_mass_index(76.5, 175.0);
    assert!((bmi - 24.98).abs() < 0.01);
    assert_eq!(round_to_tenth(bmi), 25.0);
}

// === Estimates ===

#[test]
fn test_body_fat_bands() {
    assert_eq!(estimate_body_fat(22.0, 25), 18.0);
    assert_eq!(estimate_body_fat(17.0, 25), 12.0);
    assert_eq!(estimate_body_fat(27.0, 25), 25.0);
    assert_eq!(estimate_body_fat(31.0, 25), 32.0);
    // 18 + 0.2 * 20 = 22
    assert_eq!(estimate_body_fat(22.0, 45), 22.0);
}

#[test]
fn test_resting_hr() {
    assert_eq!(estimate_resting_hr(24.0, 30), 70.0);
    assert_eq!(estimate_resting_hr(29.0, 30), 80.0);
    assert_eq!(estimate_resting_hr(21.0, 30), 65.0);
    // 70 + 0.5 * 10 = 75
    assert_eq!(estimate_resting_hr(24.0, 40), 75.0);
}

#[test]
fn test_training_hr() {
    assert_eq!(estimate_training_hr(70.0), 112.0);
    assert_eq!(estimate_training_hr(58.0), 93.0);
}

#[test]
fn test_derive_keeps_supplied_values() {
    let derived = BiometricEstimator::derive(&input(Some(14.5), Some(52.0), Some(131.0)), date(2024, 6, 1));

    assert_eq!(derived.age, 30);
    assert_eq!(derived.body_fat_percentage.value, 14.5);
    assert!(!derived.body_fat_percentage.estimated);
    assert_eq!(derived.resting_hr.value, 52.0);
    assert!(!derived.resting_hr.estimated);
    assert_eq!(derived.training_hr_avg.value, 131.0);
    assert!(!derived.training_hr_avg.estimated);
}

#[test]
fn test_derive_estimates_missing_values() {
    let derived = BiometricEstimator::derive(&input(None, None, None), date(2024, 6, 1));

    // BMI 24.98, age 30: 18 + 0.2 * 5 = 19
    assert_eq!(derived.body_fat_percentage.value, 19.0);
    assert!(derived.body_fat_percentage.estimated);
    assert_eq!(derived.resting_hr.value, 70.0);
    assert_eq!(derived.training_hr_avg.value, 112.0);
}

#[test]
fn test_training_hr_follows_supplied_resting_hr() {
    let derived = BiometricEstimator::derive(&input(None, Some(60.0), None), date(2024, 6, 1));
    assert_eq!(derived.training_hr_avg.value, 96.0);
    assert!(derived.training_hr_avg.estimated);
    assert!(!derived.resting_hr.estimated);
}

#[test]
fn test_estimator_does_not_validate() {
    let mut odd = input(None, None, None);
    odd.height_cm = 0.0;
    let derived = BiometricEstimator::derive(&odd, date(2024, 6, 1));
    assert!(derived.bmi.is_infinite());
}

// === Validation ===

#[test]
fn test_validation_accepts_in_range_and_bounds() {
    let update = BiometricUpdateRequest {
        weight: Some(30.0),
        body_fat_percentage: Some(50.0),
        resting_hr: Some(60.0),
        training_hr_avg: Some(200.0),
        sleep_hours: Some(4.0),
        sleep_quality: Some(5.0),
        fatigue_level: Some(1.0),
        ..BiometricUpdateRequest::default()
    };
    assert!(validate_biometric_update(&update).is_empty());
}

#[test]
fn test_validation_reports_every_violation() {
    let update = BiometricUpdateRequest {
        weight: Some(250.0),
        body_fat_percentage: Some(2.0),
        resting_hr: Some(130.0),
        training_hr_avg: Some(70.0),
        sleep_hours: Some(13.0),
        sleep_quality: Some(0.0),
        fatigue_level: Some(6.0),
        ..BiometricUpdateRequest::default()
    };
    let errors = validate_biometric_update(&update);
    assert_eq!(
        errors,
        vec![
            validation::WEIGHT.message,
            validation::BODY_FAT.message,
            validation::RESTING_HR.message,
            validation::TRAINING_HR.message,
            validation::SLEEP_HOURS.message,
            validation::SLEEP_QUALITY.message,
            validation::FATIGUE_LEVEL.message,
        ]
    );
}

#[test]
fn test_validation_ignores_absent_fields() {
    let update = BiometricUpdateRequest {
        resting_hr: Some(35.0),
        ..BiometricUpdateRequest::default()
    };
    assert_eq!(
        validate_biometric_update(&update),
        vec!["Resting heart rate must be between 40 and 120 BPM"]
    );
}
