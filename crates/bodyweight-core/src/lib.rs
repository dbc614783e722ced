// ABOUTME: Core types and constants for the Bodyweight adaptive training API
// ABOUTME: Foundation crate with error handling, wire models, and backend constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Bodyweight Core
//!
//! Foundation crate providing shared types and constants for the Bodyweight
//! training platform. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Table, function and header names of the hosted backend
//! - **models**: Request payloads and datastore rows exchanged with clients and the backend

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Backend table/function names and protocol constants
pub mod constants;

/// Wire models for requests, responses, and datastore rows
pub mod models;
