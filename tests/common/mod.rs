// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use pawtrail::config::Config;
use pawtrail::db::MemoryStore;
use pawtrail::routes::create_router;
use pawtrail::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test app backed by an in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        Config::default(),
        Arc::new(MemoryStore::new()),
    ));
    (create_router(state.clone()), state)
}

/// Send a request and return the status plus the JSON body (Null if empty).
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
