// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live tracking routes.
//!
//! The device is the location provider: it starts a session, streams its
//! fixes here, and either stops (producing a record) or reports a failure.

use crate::error::{AppError, Result};
use crate::models::{ActivityType, GeoFix, SessionSnapshot, StoredActivity};
use crate::routes::validate_dog_id;
use crate::services::SessionParams;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Most fixes accepted in one push.
const MAX_FIXES_PER_PUSH: usize = 500;
/// Longest error message kept, in characters.
const MAX_ERROR_LEN: usize = 500;

/// Tracking routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/dogs/{dog_id}/tracking",
            post(start_tracking)
                .get(get_tracking)
                .delete(abandon_tracking),
        )
        .route("/api/dogs/{dog_id}/tracking/fixes", post(push_fixes))
        .route("/api/dogs/{dog_id}/tracking/error", post(report_error))
        .route("/api/dogs/{dog_id}/tracking/stop", post(stop_tracking))
}

// ─── Start / Status ──────────────────────────────────────────

#[derive(Deserialize)]
struct StartTrackingRequest {
    activity_type: ActivityType,
    weight_kg: f64,
    /// Device's own report of whether location services are usable
    #[serde(default = "default_true")]
    location_available: bool,
}

fn default_true() -> bool {
    true
}

/// Start a live session.
async fn start_tracking(
    State(state): State<Arc<AppState>>,
    Path(dog_id): Path<String>,
    Json(req): Json<StartTrackingRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>)> {
    validate_dog_id(&dog_id)?;

    let params = SessionParams {
        dog_id,
        activity_type: req.activity_type,
        weight_kg: req.weight_kg,
    };
    let snapshot = state.tracking.start(params, req.location_available)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Current state of the live session.
async fn get_tracking(
    State(state): State<Arc<AppState>>,
    Path(dog_id): Path<String>,
) -> Result<Json<SessionSnapshot>> {
    validate_dog_id(&dog_id)?;
    Ok(Json(state.tracking.snapshot(&dog_id)?))
}

// ─── Fixes ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct FixInput {
    latitude: f64,
    longitude: f64,
    /// Defaults to the time the server received it
    timestamp: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct PushFixesRequest {
    fixes: Vec<FixInput>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PushFixesResponse {
    pub accepted: u32,
}

/// Stream device fixes into the session.
async fn push_fixes(
    State(state): State<Arc<AppState>>,
    Path(dog_id): Path<String>,
    Json(req): Json<PushFixesRequest>,
) -> Result<(StatusCode, Json<PushFixesResponse>)> {
    validate_dog_id(&dog_id)?;

    if req.fixes.len() > MAX_FIXES_PER_PUSH {
        return Err(AppError::BadRequest(format!(
            "At most {} fixes per request",
            MAX_FIXES_PER_PUSH
        )));
    }

    let received_at = Utc::now();
    let fixes: Vec<GeoFix> = req
        .fixes
        .into_iter()
        .map(|f| GeoFix::new(f.latitude, f.longitude, f.timestamp.unwrap_or(received_at)))
        .collect();

    let accepted = state.tracking.push_fixes(&dog_id, &fixes).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(PushFixesResponse {
            accepted: accepted as u32,
        }),
    ))
}

// ─── Provider Errors ─────────────────────────────────────────

#[derive(Deserialize)]
struct LocationErrorRequest {
    message: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionEndedResponse {
    pub status: String,
}

/// Device lost its location capability; the session is discarded.
async fn report_error(
    State(state): State<Arc<AppState>>,
    Path(dog_id): Path<String>,
    Json(req): Json<LocationErrorRequest>,
) -> Result<Json<SessionEndedResponse>> {
    validate_dog_id(&dog_id)?;

    let message: String = req.message.chars().take(MAX_ERROR_LEN).collect();
    state
        .tracking
        .report_location_error(&dog_id, &message)
        .await?;

    Ok(Json(SessionEndedResponse {
        status: "aborted".to_string(),
    }))
}

// ─── Stop / Abandon ──────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct StopTrackingRequest {
    #[validate(length(max = 500))]
    #[serde(default)]
    notes: Option<String>,
}

/// Stop the session and persist it.
async fn stop_tracking(
    State(state): State<Arc<AppState>>,
    Path(dog_id): Path<String>,
    Json(req): Json<StopTrackingRequest>,
) -> Result<(StatusCode, Json<StoredActivity>)> {
    validate_dog_id(&dog_id)?;
    req.validate()?;

    let stored = state.tracking.stop(&dog_id, req.notes).await?;
    tracing::info!(
        dog_id = %dog_id,
        activity_id = stored.id,
        distance_km = stored.record.distance_km,
        "Tracked activity recorded"
    );
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Cancel the session without a record.
async fn abandon_tracking(
    State(state): State<Arc<AppState>>,
    Path(dog_id): Path<String>,
) -> Result<StatusCode> {
    validate_dog_id(&dog_id)?;
    state.tracking.abandon(&dog_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
