// ABOUTME: Constants naming the hosted backend's tables, functions, and protocol headers
// ABOUTME: Single source for every string the server sends to the datastore or auth provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Datastore tables
pub mod tables {
    /// Live, mutable user profile row (one per user)
    pub const USER_PROFILES: &str = "user_profiles";
    /// Point-in-time biometric records
    pub const BIOMETRIC_SNAPSHOTS: &str = "biometric_snapshots";
    /// Planned and completed training sessions
    pub const TRAINING_SESSIONS: &str = "training_sessions";
    /// Exercises planned within a session
    pub const SESSION_EXERCISES: &str = "session_exercises";
    /// Exercise catalogue
    pub const EXERCISES: &str = "exercises";
    /// Per-user progression level for each exercise
    pub const USER_EXERCISE_PROGRESSIONS: &str = "user_exercise_progressions";
    /// Per-set performance records
    pub const EXERCISE_PERFORMANCE: &str = "exercise_performance";
    /// Weekly per-muscle-group aggregates
    pub const MUSCLE_GROUP_METRICS: &str = "muscle_group_metrics";
}

/// Conflict targets used for upserts
pub mod conflicts {
    /// One snapshot per user and calendar day
    pub const SNAPSHOT_PER_DAY: &str = "user_id,snapshot_date";
    /// One metric row per user, muscle group and week
    pub const METRIC_PER_WEEK: &str = "user_id,muscle_group,week_start";
}

/// Datastore RPC functions
pub mod rpc {
    /// Returns the most recent snapshot for `user_uuid`, with `bmi` and `days_old`
    pub const GET_LATEST_BIOMETRICS: &str = "get_latest_biometrics";
}

/// Remote functions invoked through the functions gateway
pub mod functions {
    /// Adherence/performance index calculation
    pub const CALCULATE_ICA: &str = "calculate-ica";
    /// Routine generation
    pub const GENERATE_ROUTINE: &str = "generate-routine";
    /// Progression updates for a completed session
    pub const UPDATE_PROGRESSIONS: &str = "update-progressions";
}

/// Backend API paths
pub mod paths {
    /// Auth provider endpoint returning the user owning a token
    pub const AUTH_USER: &str = "/auth/v1/user";
    /// REST datastore prefix
    pub const REST: &str = "/rest/v1";
    /// RPC prefix within the REST datastore
    pub const RPC: &str = "/rest/v1/rpc";
    /// Functions gateway prefix
    pub const FUNCTIONS: &str = "/functions/v1";
}

/// Header names and values
pub mod headers {
    /// Project API key header expected by the backend
    pub const API_KEY: &str = "apikey";
    /// Client identification header
    pub const CLIENT_INFO: &str = "x-client-info";
    /// Client identification value sent on remote function calls
    pub const CLIENT_INFO_VALUE: &str = concat!("bodyweight-server/", env!("CARGO_PKG_VERSION"));
    /// Preference header for REST writes
    pub const PREFER: &str = "prefer";
    /// Return written rows
    pub const RETURN_REPRESENTATION: &str = "return=representation";
    /// Upsert and return written rows
    pub const UPSERT_REPRESENTATION: &str = "resolution=merge-duplicates,return=representation";
    /// Bearer scheme prefix
    pub const BEARER_PREFIX: &str = "Bearer ";
}

/// Session status values
pub mod session_status {
    /// Generated but not yet trained
    pub const PLANNED: &str = "planned";
    /// Feedback saved
    pub const COMPLETED: &str = "completed";
}

/// Session exercise block types
pub mod block_types {
    /// Warm-up block
    pub const WARMUP: &str = "warmup";
    /// Main training block (subject to progression)
    pub const MAIN: &str = "main";
    /// Cool-down block
    pub const COOLDOWN: &str = "cooldown";
}
