// ABOUTME: Main library entry point for the bodyweight training API server
// ABOUTME: Exposes configuration, backend seams, services, and HTTP routes to the binary and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Bodyweight Server
//!
//! HTTP API for a bodyweight training app. Every data endpoint authenticates
//! the caller's bearer token against the hosted auth provider and reads or
//! writes rows with that same token, so row-level security stays with the
//! datastore.
//!
//! ## Endpoints
//!
//! - `POST /complete-onboarding`: estimate missing biometrics and store the profile
//! - `GET|POST /get-latest-biometrics`: latest snapshot, or profile values
//! - `POST /update-biometrics`: validated manual update for today
//! - `POST /save-session-feedback`: complete a session and record progression history
//! - `GET|POST /get-current-routine`: today's planned session as a routine
//! - `GET|POST /get-training-history`: paged, filtered sessions with summaries
//! - `GET|POST /analyze-muscle-groups`: four-week balance per muscle group
//! - `GET|POST /analyze-evolution`: multi-week adherence, level and balance trends
//! - `POST /api/calculate-ica`, `/api/generate-routine`, `/api/update-progressions`:
//!   relays to remote functions
//!
//! Estimation, validation and progression rules live in the
//! `bodyweight-intelligence` crate; row and request models in `bodyweight-core`.

/// Backend traits and the Supabase client
pub mod backend;

/// Environment configuration
pub mod config;

/// Environment names, defaults, routes and client messages
pub mod constants;

/// Error types re-exported from `bodyweight-core`
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Bearer authentication, CORS and request tracing
pub mod middleware;

/// Shared resources injected into handlers
pub mod resources;

/// HTTP route groups
pub mod routes;

/// Router assembly and serve loop
pub mod server;

/// Business operations behind the routes
pub mod services;

/// Outbound HTTP client construction
pub mod utils;
