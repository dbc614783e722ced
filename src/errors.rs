// ABOUTME: Error types for the server crate, re-exported from bodyweight-core
// ABOUTME: Handlers return AppResult; AppError renders itself as a JSON response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Unified Error Handling System
//!
//! The error model lives in `bodyweight-core` so the intelligence crate and the
//! server share one `ErrorCode` table. This module re-exports it under the
//! path handlers and tests use.

pub use bodyweight_core::errors::{AppError, AppResult, ErrorCode, ErrorResponse};
