// ABOUTME: Server-level constants: environment variable names, defaults, and service identity
// ABOUTME: Backend table and header names live in bodyweight-core and are re-exported here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

pub use bodyweight_core::constants::{
    block_types, conflicts, functions, headers, paths, rpc, session_status, tables,
};

/// Environment variable names read at startup
pub mod env_vars {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// HTTP listen address
    pub const HOST: &str = "HOST";
    /// Hosted backend base URL
    pub const SUPABASE_URL: &str = "SUPABASE_URL";
    /// Public (anon) project key
    pub const SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
    /// Service-role key for privileged remote function calls
    pub const SUPABASE_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
    /// Deployment environment name
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Whole-request timeout of the backend HTTP client
    pub const HTTP_CLIENT_TIMEOUT_SECS: &str = "HTTP_CLIENT_TIMEOUT_SECS";
    /// Connect timeout of the backend HTTP client
    pub const HTTP_CLIENT_CONNECT_TIMEOUT_SECS: &str = "HTTP_CLIENT_CONNECT_TIMEOUT_SECS";
}

/// Defaults applied when an environment variable is absent
pub mod defaults {
    /// HTTP listen port
    pub const HTTP_PORT: u16 = 8081;
    /// HTTP listen address
    pub const HOST: &str = "0.0.0.0";
    /// Backend request timeout in seconds
    pub const HTTP_CLIENT_TIMEOUT_SECS: u64 = 30;
    /// Backend connect timeout in seconds
    pub const HTTP_CLIENT_CONNECT_TIMEOUT_SECS: u64 = 10;
}

/// Service identity used in logs
pub mod service_names {
    /// Name of this service
    pub const BODYWEIGHT_SERVER: &str = "bodyweight-server";
}

/// Endpoint paths served by this process
pub mod routes {
    /// Onboarding submission
    pub const COMPLETE_ONBOARDING: &str = "/complete-onboarding";
    /// Latest biometrics lookup
    pub const GET_LATEST_BIOMETRICS: &str = "/get-latest-biometrics";
    /// Manual biometric update
    pub const UPDATE_BIOMETRICS: &str = "/update-biometrics";
    /// Session completion feedback
    pub const SAVE_SESSION_FEEDBACK: &str = "/save-session-feedback";
    /// Today's planned routine
    pub const GET_CURRENT_ROUTINE: &str = "/get-current-routine";
    /// Paged session history
    pub const GET_TRAINING_HISTORY: &str = "/get-training-history";
    /// Four-week muscle-group analysis
    pub const ANALYZE_MUSCLE_GROUPS: &str = "/analyze-muscle-groups";
    /// Multi-week training evolution
    pub const ANALYZE_EVOLUTION: &str = "/analyze-evolution";
    /// Adherence index relay
    pub const CALCULATE_ICA: &str = "/api/calculate-ica";
    /// Routine generation relay
    pub const GENERATE_ROUTINE: &str = "/api/generate-routine";
    /// Progression update relay
    pub const UPDATE_PROGRESSIONS: &str = "/api/update-progressions";
}

/// Messages returned to clients
pub mod messages {
    /// 500 body for unexpected failures
    pub const INTERNAL_ERROR: &str = "Internal server error";
    /// Onboarding required-field failure
    pub const MISSING_ONBOARDING_FIELDS: &str = "Missing required fields: birth_date, weight, height";
    /// Feedback required-field failure
    pub const MISSING_FEEDBACK_FIELDS: &str = "Missing sessionId or feedback";
    /// 500 body when today's routine cannot be read
    pub const DATABASE_ERROR: &str = "Database error";
    /// Feedback persistence failure
    pub const FEEDBACK_FAILED: &str = "Failed to save feedback";
    /// Range validation failure
    pub const VALIDATION_FAILED: &str = "Validation failed";
    /// Relay required-field failure
    pub const MISSING_REQUIRED_FIELDS: &str = "Missing required fields";
    /// Onboarding success
    pub const ONBOARDING_COMPLETED: &str = "Onboarding completed successfully";
    /// Biometric update success
    pub const BIOMETRICS_UPDATED: &str = "Biometric data updated successfully";
    /// Adherence index relay failure
    pub const ICA_FAILED: &str = "Failed to calculate ICA";
    /// Routine generation relay failure
    pub const ROUTINE_FAILED: &str = "Failed to generate routine";
    /// History read failure
    pub const HISTORY_FAILED: &str = "Failed to fetch training history";
    /// Muscle-group analysis failure
    pub const MUSCLE_ANALYSIS_FAILED: &str = "Failed to analyze muscle groups";
    /// Evolution analysis failure
    pub const EVOLUTION_FAILED: &str = "Failed to analyze evolution";
    /// Unknown history status filter
    pub const INVALID_STATUS: &str = "Invalid status: expected planned, in_progress, completed, skipped or all";
    /// Progression update relay failure
    pub const PROGRESSIONS_FAILED: &str = "Failed to update progressions";
}
