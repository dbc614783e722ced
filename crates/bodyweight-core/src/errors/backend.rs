// ABOUTME: Conversions from HTTP client errors into AppError
// ABOUTME: Separates unreachable-backend failures from protocol and decoding failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::{AppError, ErrorCode};

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        let code = if error.is_connect() || error.is_timeout() {
            ErrorCode::ExternalServiceUnavailable
        } else if error.is_decode() {
            ErrorCode::SerializationError
        } else {
            ErrorCode::ExternalServiceError
        };
        Self::new(code, format!("Backend request failed: {error}")).with_source(error)
    }
}
