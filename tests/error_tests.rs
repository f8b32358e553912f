// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use pawtrail::error::AppError;
use pawtrail::services::TrackingError;

#[test]
fn test_tracking_errors_map_to_status() {
    let err: AppError = TrackingError::AlreadyTracking.into();
    assert_eq!(err.status(), StatusCode::CONFLICT);

    let err: AppError = TrackingError::NotTracking.into();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);

    let err: AppError = TrackingError::LocationUnavailable("GPS off".to_string()).into();
    assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(matches!(err, AppError::LocationUnavailable(ref msg) if msg == "GPS off"));

    let err: AppError = TrackingError::InvalidParameters("weight".to_string()).into();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let err: AppError = TrackingError::InvalidFix {
        latitude: 91.0,
        longitude: 0.0,
    }
    .into();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_internal_errors_hide_details() {
    let err = AppError::Internal(anyhow::anyhow!("store exploded"));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let err = AppError::Database("connection reset".to_string());
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_error_response_body() {
    let response = AppError::Conflict("already tracking".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let bytes = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "conflict");
    assert_eq!(json["details"], "already tracking");

    let response = AppError::Database("secret dsn".to_string()).into_response();
    let bytes = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "database_error");
    assert!(json.get("details").is_none());
}
