// ABOUTME: Integration tests for the training history endpoint
// ABOUTME: Covers ordering, paging, status and date filters, summaries and exercise statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use bodyweight_server::constants::tables;
use common::{create_test_app, InMemoryBackend, TEST_TOKEN, TEST_USER_ID};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

// ============================================================================
// Test Helpers
// ============================================================================

fn seed_history(backend: &InMemoryBackend) {
    backend.seed(
        tables::TRAINING_SESSIONS,
        vec![
            json!({
                "id": "s-1",
                "user_id": TEST_USER_ID,
                "session_date": "2024-05-01",
                "status": "completed",
                "planned_duration": 30,
                "actual_duration": 40,
                "ica_score": 0.8,
                "session_exercises": [
                    {
                        "id": "se-1",
                        "exercise_id": "ex-push",
                        "sets_completed": 3,
                        "rpe_reported": 7,
                        "exercises": { "id": "ex-push", "name": "Push-up", "category": "push" }
                    },
                    {
                        "id": "se-2",
                        "exercise_id": "ex-squat",
                        "sets_completed": 0,
                        "exercises": { "id": "ex-squat", "name": "Squat", "category": "legs" }
                    }
                ]
            }),
            json!({
                "id": "s-2",
                "user_id": TEST_USER_ID,
                "session_date": "2024-05-08",
                "status": "completed",
                "planned_duration": 30,
                "actual_duration": 0,
                "ica_score": 1.0,
                "session_exercises": [
                    {
                        "id": "se-3",
                        "exercise_id": "ex-push",
                        "sets_completed": 3,
                        "rpe_reported": 9,
                        "exercises": { "id": "ex-push", "name": "Push-up", "category": "push" }
                    }
                ]
            }),
            json!({
                "id": "s-3",
                "user_id": TEST_USER_ID,
                "session_date": "2024-05-15",
                "status": "planned"
            }),
            json!({
                "id": "s-4",
                "user_id": TEST_USER_ID,
                "session_date": "2024-05-20",
                "status": "completed",
                "actual_duration": 20,
                "ica_score": 0.6
            }),
            json!({
                "id": "other",
                "user_id": "someone-else",
                "session_date": "2024-05-10",
                "status": "completed"
            }),
        ],
    );
}

fn session_ids(body: &Value) -> Vec<&str> {
    body["training_history"]
        .as_array()
        .unwrap()
        .iter()
        .map(|session| session["id"].as_str().unwrap())
        .collect()
}

// ============================================================================
// Defaults
// ============================================================================

#[tokio::test]
async fn test_history_defaults_to_completed_sessions_newest_first() {
    let (app, backend) = create_test_app();
    seed_history(&backend);

    let body: Value = AxumTestRequest::post("/get-training-history")
        .bearer(TEST_TOKEN)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["success"], true);
    assert_eq!(session_ids(&body), ["s-4", "s-2", "s-1"]);
    assert_eq!(
        body["pagination"],
        json!({ "limit": 10, "offset": 0, "total_returned": 3, "has_more": false })
    );
    assert_eq!(body["filters"]["status"], "completed");
    assert_eq!(body["filters"]["include_exercises"], true);
    assert_eq!(body["filters"]["include_performance"], false);

    let summary = &body["summary"];
    assert_eq!(summary["total_sessions"], 3);
    assert_eq!(summary["completed_sessions"], 3);
    assert_eq!(summary["average_duration_minutes"], 30);
    assert_eq!(summary["average_completion_rate"], 0.83);
    assert_eq!(summary["average_ica_score"], 0.8);
}

#[tokio::test]
async fn test_history_reports_exercise_statistics() {
    let (app, backend) = create_test_app();
    seed_history(&backend);

    let body: Value = AxumTestRequest::get("/get-training-history")
        .bearer(TEST_TOKEN)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    let stats = &body["exercise_statistics"];
    assert_eq!(stats["total_exercises"], 3);
    assert_eq!(stats["unique_exercises"], 2);
    assert_eq!(
        stats["exercises_by_category"],
        json!([
            { "category": "legs", "count": 1, "average_rpe": 0.0 },
            { "category": "push", "count": 2, "average_rpe": 8.0 }
        ])
    );
    assert_eq!(stats["most_frequent_exercises"], json!({ "Push-up": 2, "Squat": 1 }));
}

// ============================================================================
// Filters and paging
// ============================================================================

#[tokio::test]
async fn test_history_pages_through_every_status() {
    let (app, backend) = create_test_app();
    seed_history(&backend);

    let body: Value = AxumTestRequest::get("/get-training-history?status=all&limit=2&offset=1")
        .bearer(TEST_TOKEN)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(session_ids(&body), ["s-3", "s-2"]);
    assert_eq!(body["filters"]["status"], "all");
    assert_eq!(body["pagination"]["offset"], 1);
    assert_eq!(body["pagination"]["has_more"], true);
    assert_eq!(body["summary"]["total_sessions"], 2);
    assert_eq!(body["summary"]["completed_sessions"], 1);
}

#[tokio::test]
async fn test_history_date_range_is_inclusive() {
    let (app, backend) = create_test_app();
    seed_history(&backend);

    let body: Value = AxumTestRequest::post("/get-training-history")
        .bearer(TEST_TOKEN)
        .json(&json!({
            "status": "all",
            "start_date": "2024-05-08",
            "end_date": "2024-05-15",
            "include_exercises": false
        }))
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(session_ids(&body), ["s-3", "s-2"]);
    assert_eq!(body["filters"]["start_date"], "2024-05-08");
    assert_eq!(body["filters"]["end_date"], "2024-05-15");
    assert!(body.get("exercise_statistics").is_none());
}

#[tokio::test]
async fn test_history_caps_page_size() {
    let (app, backend) = create_test_app();
    seed_history(&backend);

    let body: Value = AxumTestRequest::post("/get-training-history")
        .bearer(TEST_TOKEN)
        .json(&json!({ "limit": 500, "offset": -4 }))
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["pagination"]["limit"], 100);
    assert_eq!(body["pagination"]["offset"], 0);
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_history_rejects_unknown_status() {
    let (app, backend) = create_test_app();
    seed_history(&backend);

    let body: Value = AxumTestRequest::get("/get-training-history?status=archived")
        .bearer(TEST_TOKEN)
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid status"));

    AxumTestRequest::post("/get-training-history")
        .bearer(TEST_TOKEN)
        .json(&json!({ "status": "archived" }))
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_requires_authentication() {
    let (app, _backend) = create_test_app();

    AxumTestRequest::get("/get-training-history")
        .send(app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_history_read_failure_is_concealed() {
    let (app, backend) = create_test_app();
    backend.fail_table(tables::TRAINING_SESSIONS);

    let body: Value = AxumTestRequest::post("/get-training-history")
        .bearer(TEST_TOKEN)
        .send(app)
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .json();

    assert_eq!(body["error"], "Failed to fetch training history");
}
