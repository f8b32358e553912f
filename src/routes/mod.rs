// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod activities;
pub mod tracking;

use crate::error::{AppError, Result};
use crate::AppState;
use axum::http::{header, Method};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Longest dog id accepted in paths.
const MAX_DOG_ID_LEN: usize = 64;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

/// Reject dog ids that are empty, too long, or not URL-safe.
pub(crate) fn validate_dog_id(dog_id: &str) -> Result<()> {
    let well_formed = !dog_id.is_empty()
        && dog_id.len() <= MAX_DOG_ID_LEN
        && dog_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if well_formed {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Invalid dog id: must be 1-{} characters of [A-Za-z0-9_-]",
            MAX_DOG_ID_LEN
        )))
    }
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(health_check))
        .merge(tracking::routes())
        .merge(activities::routes())
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_dog_id() {
        assert!(validate_dog_id("rex").is_ok());
        assert!(validate_dog_id("dog_42-b").is_ok());
        assert!(validate_dog_id("").is_err());
        assert!(validate_dog_id("has space").is_err());
        assert!(validate_dog_id("../etc").is_err());
        assert!(validate_dog_id(&"a".repeat(65)).is_err());
    }
}
