// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Unauthenticated liveness and readiness probes reporting service identity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Health check routes for load balancers and container orchestration

use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::constants::service_names;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes() -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
    }

    async fn handle_health() -> Json<Value> {
        Json(Self::status("healthy"))
    }

    /// Ready once the process serves requests; backend reachability is not probed
    async fn handle_ready() -> Json<Value> {
        Json(Self::status("ready"))
    }

    fn status(status: &str) -> Value {
        json!({
            "status": status,
            "service": service_names::BODYWEIGHT_SERVER,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339()
        })
    }
}
