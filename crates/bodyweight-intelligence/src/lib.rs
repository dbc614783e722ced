// ABOUTME: Training intelligence crate: biometric estimation, range validation, and progression
// ABOUTME: Pure, deterministic computations with no I/O, shared by the HTTP services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Bodyweight Intelligence
//!
//! Everything in this crate is a pure function of its inputs. The server crate
//! reads rows from the datastore, hands them here, and writes the results back.

/// Age, BMI, and default body-fat and heart-rate estimates
pub mod biometrics;
/// Multi-week adherence, level, balance and performance trends
pub mod evolution;
/// Summary statistics over a page of training history
pub mod history;
/// Four-week per-muscle-group volume and balance analysis
pub mod muscle_balance;
/// Weekly per-muscle-group aggregation of a completed session
pub mod muscle_groups;
/// Per-exercise level progression rules
pub mod progression;
/// Range checks for biometric updates
pub mod validation;

mod stats;

pub use biometrics::{BiometricEstimator, BiometricInput, DerivedBiometrics, Estimate};
pub use evolution::{EvolutionAnalysis, TrackedExercise, Trend};
pub use history::{ExerciseStatistics, HistorySummary};
pub use muscle_balance::{AnalysisWindow, BalanceSummary, MuscleGroupAnalysis};
pub use muscle_groups::{ExerciseLoad, MuscleGroupTotals};
pub use progression::{LevelChange, PerformanceEstimate, ProgressionEngine, ProgressionOutcome};
pub use validation::validate_biometric_update;
