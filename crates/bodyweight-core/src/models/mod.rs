// ABOUTME: Wire models shared by the server and the intelligence crate
// ABOUTME: Request payloads, response bodies, and datastore rows for the training platform
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Biometric snapshots, updates, and retrieval
pub mod biometrics;
/// Training history requests and analysed row views
pub mod history;
/// Float serialization helpers for integer-typed columns
pub mod numbers;
/// Onboarding submission and derived profile
pub mod onboarding;
/// Exercise progression and weekly muscle-group metrics
pub mod progression;
/// Session feedback, performance records, and session exercise rows
pub mod session;

pub use biometrics::{
    BiometricSnapshotRow, BiometricUpdateRequest, DataSource, DerivedMetrics, LatestBiometrics,
};
pub use history::{
    HistoryStatus, PerformanceEntry, SessionRecord, TrainingHistoryRequest, WeeklyVolume,
};
pub use onboarding::{
    ActivityLevel, CalculatedValues, FitnessLevel, OnboardingRequest, ProfileUpdate,
};
pub use progression::{ExerciseProgression, MuscleGroupMetric};
pub use session::{
    CircuitData, ExercisePerformance, PerformanceRecord, SaveFeedbackRequest, SessionExerciseRow,
    SessionFeedback,
};
