// ABOUTME: Integration tests for the biometric route handlers
// ABOUTME: Covers latest-value lookup with profile fallback and validated manual updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use bodyweight_server::constants::{rpc, tables};
use bodyweight_server::errors::AppError;
use chrono::Utc;
use common::{create_test_app, TEST_TOKEN, TEST_USER_ID};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

fn profile() -> Value {
    json!({
        "id": TEST_USER_ID,
        "weight": 82,
        "height": 180,
        "birth_date": "1990-06-15",
        "age": 34,
        "resting_hr": 62,
        "sleep_hours": 7,
        "updated_at": "2024-05-01T08:00:00+00:00"
    })
}

// ============================================================================
// Latest biometrics
// ============================================================================

#[tokio::test]
async fn test_latest_biometrics_from_snapshot() {
    let (app, backend) = create_test_app();
    backend.set_rpc_result(
        rpc::GET_LATEST_BIOMETRICS,
        Ok(json!([{
            "weight": 79.5,
            "height": 180,
            "bmi": 24.5,
            "age": 34,
            "resting_hr": 58,
            "sleep_quality": null,
            "snapshot_date": "2024-05-14",
            "days_old": 1
        }])),
    );

    let body: Value = AxumTestRequest::get("/get-latest-biometrics")
        .bearer(TEST_TOKEN)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["weight"], 79.5);
    assert_eq!(body["bmi"], 24.5);
    assert_eq!(body["last_updated"], "2024-05-14");
    assert_eq!(body["days_old"], 1);
    assert_eq!(body["sleep_quality"], Value::Null);
    assert!(body.get("updated_at").is_none());
}

#[tokio::test]
async fn test_latest_biometrics_falls_back_to_profile() {
    let (app, backend) = create_test_app();
    backend.seed(tables::USER_PROFILES, vec![profile()]);

    let body: Value = AxumTestRequest::post("/get-latest-biometrics")
        .bearer(TEST_TOKEN)
        .json(&json!({ "ignored": true }))
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["weight"], 82);
    assert_eq!(body["resting_hr"], 62);
    assert_eq!(body["last_updated"], "2024-05-01T08:00:00+00:00");
    assert_eq!(body["updated_at"], "2024-05-01T08:00:00+00:00");
    assert!(body.get("days_old").is_none());
    assert!(body.get("bmi").is_none());
}

#[tokio::test]
async fn test_latest_biometrics_rpc_failure_falls_back_to_profile() {
    let (app, backend) = create_test_app();
    backend.seed(tables::USER_PROFILES, vec![profile()]);
    backend.set_rpc_result(
        rpc::GET_LATEST_BIOMETRICS,
        Err(AppError::database("function does not exist")),
    );

    let body: Value = AxumTestRequest::get("/get-latest-biometrics")
        .bearer(TEST_TOKEN)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["weight"], 82);
}

#[tokio::test]
async fn test_latest_biometrics_without_profile() {
    let (app, _backend) = create_test_app();

    let body: Value = AxumTestRequest::get("/get-latest-biometrics")
        .bearer(TEST_TOKEN)
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    assert_eq!(body["error"], "Profile not found");
}

// ============================================================================
// Manual updates
// ============================================================================

#[tokio::test]
async fn test_update_biometrics_writes_snapshot_and_profile() {
    let (app, backend) = create_test_app();
    backend.seed(tables::USER_PROFILES, vec![profile()]);

    let body: Value = AxumTestRequest::post("/update-biometrics")
        .bearer(TEST_TOKEN)
        .json(&json!({
            "weight": 80,
            "resting_hr": 60,
            "training_hr_avg": 140,
            "notes": ""
        }))
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Biometric data updated successfully");
    assert_eq!(body["derived_metrics"]["bmi"], 24.7);
    assert_eq!(body["derived_metrics"]["heart_rate_reserve"], 80.0);
    assert_eq!(
        body["updated_fields"],
        json!(["weight", "resting_hr", "training_hr_avg", "notes"])
    );

    let snapshot = &body["biometric_snapshot"];
    assert_eq!(snapshot["data_source"], "manual");
    assert_eq!(snapshot["height"], 180);
    assert_eq!(snapshot["age"], 34);
    assert_eq!(snapshot["snapshot_date"], Utc::now().date_naive().to_string());
    assert!(snapshot.get("notes").is_none());

    let stored = &backend.rows(tables::USER_PROFILES)[0];
    assert_eq!(stored["weight"], 80.0);
    assert_eq!(stored["resting_hr"], 62);
}

#[tokio::test]
async fn test_update_biometrics_same_day_merges() {
    let (app, backend) = create_test_app();
    backend.seed(tables::USER_PROFILES, vec![profile()]);

    for update in [json!({ "weight": 80 }), json!({ "sleep_hours": 8 })] {
        AxumTestRequest::post("/update-biometrics")
            .bearer(TEST_TOKEN)
            .json(&update)
            .send(app.clone())
            .await
            .assert_status(StatusCode::OK);
    }

    let snapshots = backend.rows(tables::BIOMETRIC_SNAPSHOTS);
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0]["weight"], 80);
    assert_eq!(snapshots[0]["sleep_hours"], 8);
}

#[tokio::test]
async fn test_update_biometrics_reports_every_violation() {
    let (app, backend) = create_test_app();
    backend.seed(tables::USER_PROFILES, vec![profile()]);

    let body: Value = AxumTestRequest::post("/update-biometrics")
        .bearer(TEST_TOKEN)
        .json(&json!({ "weight": 250, "sleep_hours": 2, "fatigue_level": 3 }))
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["code"], "VALUE_OUT_OF_RANGE");
    assert_eq!(
        body["validation_errors"],
        json!([
            "Weight must be between 30 and 200 kg",
            "Sleep hours must be between 4 and 12 hours"
        ])
    );
    assert!(backend.rows(tables::BIOMETRIC_SNAPSHOTS).is_empty());
}

#[tokio::test]
async fn test_update_biometrics_checks_fractional_wellness_scores() {
    let (app, backend) = create_test_app();
    backend.seed(tables::USER_PROFILES, vec![profile()]);

    let body: Value = AxumTestRequest::post("/update-biometrics")
        .bearer(TEST_TOKEN)
        .json(&json!({ "sleep_quality": 3.5 }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["biometric_snapshot"]["sleep_quality"], 3.5);

    let body: Value = AxumTestRequest::post("/update-biometrics")
        .bearer(TEST_TOKEN)
        .json(&json!({ "fatigue_level": 5.5 }))
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(
        body["validation_errors"],
        json!(["Fatigue level must be between 1 and 5"])
    );
}

#[tokio::test]
async fn test_update_biometrics_snapshot_failure_is_server_error() {
    let (app, backend) = create_test_app();
    backend.seed(tables::USER_PROFILES, vec![profile()]);
    backend.fail_table(tables::BIOMETRIC_SNAPSHOTS);

    let body: Value = AxumTestRequest::post("/update-biometrics")
        .bearer(TEST_TOKEN)
        .json(&json!({ "weight": 80 }))
        .send(app)
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .json();

    assert_eq!(body["error"], "Internal server error");
}
