// ABOUTME: Inclusive range checks applied to manual biometric updates
// ABOUTME: Collects every violation instead of stopping at the first one
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use bodyweight_core::models::BiometricUpdateRequest;

/// Inclusive accepted range for one biometric field
#[derive(Debug, Clone, Copy)]
pub struct RangeRule {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
    /// Message reported on violation
    pub message: &'static str,
}

impl RangeRule {
    /// Whether `value` lies within the range; NaN never does
    #[must_use]
    pub fn accepts(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Weight in kilograms
pub const WEIGHT: RangeRule = RangeRule {
    min: 30.0,
    max: 200.0,
    message: "Weight must be between 30 and 200 kg",
};
/// Body-fat percentage
pub const BODY_FAT: RangeRule = RangeRule {
    min: 5.0,
    max: 50.0,
    message: "Body fat percentage must be between 5% and 50%",
};
/// Resting heart rate
pub const RESTING_HR: RangeRule = RangeRule {
    min: 40.0,
    max: 120.0,
    message: "Resting heart rate must be between 40 and 120 BPM",
};
/// Average training heart rate
pub const TRAINING_HR: RangeRule = RangeRule {
    min: 80.0,
    max: 200.0,
    message: "Training heart rate must be between 80 and 200 BPM",
};
/// Sleep hours
pub const SLEEP_HOURS: RangeRule = RangeRule {
    min: 4.0,
    max: 12.0,
    message: "Sleep hours must be between 4 and 12 hours",
};
/// Sleep quality
pub const SLEEP_QUALITY: RangeRule = RangeRule {
    min: 1.0,
    max: 5.0,
    message: "Sleep quality must be between 1 and 5",
};
/// Fatigue level
pub const FATIGUE_LEVEL: RangeRule = RangeRule {
    min: 1.0,
    max: 5.0,
    message: "Fatigue level must be between 1 and 5",
};

/// Every range violation in `update`, in field order
///
/// An empty list means the update is acceptable. Absent fields are not checked.
#[must_use]
pub fn validate_biometric_update(update: &BiometricUpdateRequest) -> Vec<&'static str> {
    let checks = [
        (update.weight, WEIGHT),
        (update.body_fat_percentage, BODY_FAT),
        (update.resting_hr, RESTING_HR),
        (update.training_hr_avg, TRAINING_HR),
        (update.sleep_hours, SLEEP_HOURS),
        (update.sleep_quality, SLEEP_QUALITY),
        (update.fatigue_level, FATIGUE_LEVEL),
    ];

    checks
        .into_iter()
        .filter_map(|(value, rule)| match value {
            Some(v) if !rule.accepts(v) => Some(rule.message),
            _ => None,
        })
        .collect()
}
