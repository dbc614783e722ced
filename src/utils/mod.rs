// ABOUTME: Utility modules for common functionality across the application
// ABOUTME: Contains the outbound HTTP client factory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// HTTP client configuration and helpers
pub mod http_client;
