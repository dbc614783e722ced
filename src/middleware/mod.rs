// ABOUTME: HTTP middleware for bearer authentication and cross-origin access
// ABOUTME: Re-exports the authenticator used by handlers plus the CORS and tracing pieces of the router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Bearer token authentication against the auth provider
pub mod auth;
/// Fixed cross-origin resource sharing policy
pub mod cors;
/// Per-request tracing spans with correlation ids
pub mod tracing;

pub use auth::{bearer_token, BearerAuthenticator};
pub use cors::setup_cors;
pub use self::tracing::create_request_span;
