// ABOUTME: Serde helpers that write whole-valued floats as JSON integers
// ABOUTME: Keeps integer datastore columns happy when a measurement has no fractional part
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::Serializer;

/// Largest magnitude that round-trips exactly through `i64` and `f64`
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

/// Serialize `value` as an integer when it has no fractional part
///
/// # Errors
///
/// Propagates serializer errors
#[allow(clippy::trivially_copy_pass_by_ref)] // serde's serialize_with passes by reference
pub fn compact<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Optional variant of [`compact`]
///
/// # Errors
///
/// Propagates serializer errors
#[allow(clippy::ref_option)] // serde's serialize_with passes by reference
pub fn compact_opt<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => compact(v, serializer),
        None => serializer.serialize_none(),
    }
}
