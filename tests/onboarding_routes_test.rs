// ABOUTME: Integration tests for the onboarding route handler
// ABOUTME: Covers biometric estimation, profile and snapshot writes, and failure handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use bodyweight_intelligence::biometrics::{age_on, body_mass_index, estimate_body_fat};
use bodyweight_server::constants::tables;
use bodyweight_server::services::onboarding::ONBOARDING_SNAPSHOT_NOTES;
use chrono::{NaiveDate, Utc};
use common::{create_test_app, TEST_EMAIL, TEST_TOKEN, TEST_USER_ID};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

fn submission() -> Value {
    json!({
        "birth_date": "1990-06-15",
        "weight": 80,
        "height": 180,
        "resting_hr": 60,
        "sleep_hours": 7.5,
        "sleep_quality": 4,
        "fitness_level": "intermediate",
        "activity_level": "moderate",
        "available_days_per_week": 4
    })
}

fn expected_age() -> i32 {
    age_on(
        NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
        Utc::now().date_naive(),
    )
}

#[tokio::test]
async fn test_onboarding_derives_missing_biometrics() {
    let (app, backend) = create_test_app();
    backend.seed(tables::USER_PROFILES, vec![json!({ "id": TEST_USER_ID })]);

    let body: Value = AxumTestRequest::post("/complete-onboarding")
        .bearer(TEST_TOKEN)
        .json(&submission())
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    let age = expected_age();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Onboarding completed successfully");
    assert_eq!(body["calculated_values"]["age"], age);
    assert_eq!(body["calculated_values"]["bmi"], 24.7);
    assert_eq!(body["calculated_values"]["estimated_resting_hr"], 60);
    assert_eq!(body["calculated_values"]["estimated_training_hr"], 96);
    assert_eq!(
        body["calculated_values"]["estimated_body_fat"].as_f64().unwrap(),
        estimate_body_fat(body_mass_index(80.0, 180.0), age)
    );

    assert_eq!(body["profile"]["id"], TEST_USER_ID);
    assert_eq!(body["profile"]["email"], TEST_EMAIL);
    assert_eq!(body["profile"]["weight"], 80);
    assert_eq!(body["profile"]["training_hr_avg"], 96);
    assert_eq!(body["profile"]["fitness_level"], "intermediate");

    let snapshot = &body["biometric_snapshot"];
    assert_eq!(snapshot["user_id"], TEST_USER_ID);
    assert_eq!(snapshot["data_source"], "onboarding");
    assert_eq!(snapshot["notes"], ONBOARDING_SNAPSHOT_NOTES);
    assert_eq!(snapshot["snapshot_date"], Utc::now().date_naive().to_string());
    assert_eq!(snapshot["resting_hr"], 60);
}

#[tokio::test]
async fn test_onboarding_persists_profile_and_snapshot() {
    let (app, backend) = create_test_app();
    backend.seed(tables::USER_PROFILES, vec![json!({ "id": TEST_USER_ID })]);

    AxumTestRequest::post("/complete-onboarding")
        .bearer(TEST_TOKEN)
        .json(&submission())
        .send(app)
        .await
        .assert_status(StatusCode::OK);

    let profiles = backend.rows(tables::USER_PROFILES);
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["birth_date"], "1990-06-15");
    assert_eq!(profiles[0]["age"], expected_age());

    let snapshots = backend.rows(tables::BIOMETRIC_SNAPSHOTS);
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0]["weight"], 80);
    assert_eq!(snapshots[0]["height"], 180);
}

#[tokio::test]
async fn test_onboarding_forwards_fractional_wellness_scores() {
    let (app, backend) = create_test_app();
    backend.seed(tables::USER_PROFILES, vec![json!({ "id": TEST_USER_ID })]);

    let mut request = submission();
    request["sleep_quality"] = json!(3.5);
    request["fatigue_level"] = json!(2);

    let body: Value = AxumTestRequest::post("/complete-onboarding")
        .bearer(TEST_TOKEN)
        .json(&request)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["profile"]["sleep_quality"], 3.5);
    assert_eq!(body["profile"]["fatigue_level"], json!(2));
    assert_eq!(backend.rows(tables::USER_PROFILES)[0]["sleep_quality"], 3.5);
}

#[tokio::test]
async fn test_onboarding_twice_keeps_one_snapshot_per_day() {
    let (app, backend) = create_test_app();
    backend.seed(tables::USER_PROFILES, vec![json!({ "id": TEST_USER_ID })]);

    for weight in [80, 78] {
        let mut request = submission();
        request["weight"] = json!(weight);
        AxumTestRequest::post("/complete-onboarding")
            .bearer(TEST_TOKEN)
            .json(&request)
            .send(app.clone())
            .await
            .assert_status(StatusCode::OK);
    }

    let snapshots = backend.rows(tables::BIOMETRIC_SNAPSHOTS);
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0]["weight"], 78);
}

#[tokio::test]
async fn test_onboarding_missing_required_fields() {
    let (app, backend) = create_test_app();
    backend.seed(tables::USER_PROFILES, vec![json!({ "id": TEST_USER_ID })]);

    let mut request = submission();
    request["height"] = json!(0);

    let body: Value = AxumTestRequest::post("/complete-onboarding")
        .bearer(TEST_TOKEN)
        .json(&request)
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    assert_eq!(body["error"], "Missing required fields: birth_date, weight, height");
    assert!(backend.rows(tables::BIOMETRIC_SNAPSHOTS).is_empty());
}

#[tokio::test]
async fn test_onboarding_rejects_unparseable_birth_date() {
    let (app, backend) = create_test_app();
    backend.seed(tables::USER_PROFILES, vec![json!({ "id": TEST_USER_ID })]);

    let mut request = submission();
    request["birth_date"] = json!("June 15th");

    let body: Value = AxumTestRequest::post("/complete-onboarding")
        .bearer(TEST_TOKEN)
        .json(&request)
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    assert_eq!(body["code"], "INVALID_FORMAT");
}

#[tokio::test]
async fn test_onboarding_snapshot_failure_still_succeeds() {
    let (app, backend) = create_test_app();
    backend.seed(tables::USER_PROFILES, vec![json!({ "id": TEST_USER_ID })]);
    backend.fail_table(tables::BIOMETRIC_SNAPSHOTS);

    let body: Value = AxumTestRequest::post("/complete-onboarding")
        .bearer(TEST_TOKEN)
        .json(&submission())
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["success"], true);
    assert_eq!(body["biometric_snapshot"], Value::Null);
    assert_eq!(body["profile"]["weight"], 80);
}

#[tokio::test]
async fn test_onboarding_profile_failure_hides_details() {
    let (app, backend) = create_test_app();
    backend.fail_table(tables::USER_PROFILES);

    let body: Value = AxumTestRequest::post("/complete-onboarding")
        .bearer(TEST_TOKEN)
        .json(&submission())
        .send(app)
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .json();

    assert_eq!(body["error"], "Internal server error");
    assert!(!body.to_string().contains("relation"));
}

#[tokio::test]
async fn test_onboarding_requires_a_body() {
    let (app, _backend) = create_test_app();

    let body: Value = AxumTestRequest::post("/complete-onboarding")
        .bearer(TEST_TOKEN)
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    assert_eq!(body["error"], "Request body is required");
}
