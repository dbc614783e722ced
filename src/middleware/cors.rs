// ABOUTME: CORS middleware configuration for HTTP API endpoints
// ABOUTME: Applies the fixed permissive policy expected by the mobile and web clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use http::{header::HeaderName, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::constants::headers;

/// Headers clients may send cross-origin
pub const ALLOWED_HEADERS: [&str; 4] = ["authorization", headers::CLIENT_INFO, headers::API_KEY, "content-type"];

/// Configure CORS settings for the function endpoints
///
/// Any origin may call the API. Preflight requests are answered by the layer
/// itself with the allowed headers and methods; every other response carries
/// `Access-Control-Allow-Origin: *`.
#[must_use]
pub fn setup_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_headers(ALLOWED_HEADERS.map(HeaderName::from_static))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}
