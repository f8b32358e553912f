// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recorded activity routes: manual entry, listing, stats, route export.

use crate::error::{AppError, Result};
use crate::models::{ActivitySummary, ManualActivity, StoredActivity};
use crate::routes::validate_dog_id;
use crate::services::distance::{encode_route, route_feature};
use crate::services::estimate_calories;
use crate::time_utils::DateRange;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MAX_PER_PAGE: u32 = 100;

/// Activity routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/dogs/{dog_id}/activities",
            get(list_activities).post(log_activity),
        )
        .route("/api/dogs/{dog_id}/stats", get(get_stats))
        .route("/api/activities/{id}", get(get_activity))
        .route("/api/activities/{id}/route", get(get_route))
}

fn parse_timestamp(name: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    raw.map(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| {
                AppError::BadRequest(format!(
                    "Invalid '{}' parameter: must be RFC3339 datetime",
                    name
                ))
            })
    })
    .transpose()
}

fn parse_range(from: Option<&str>, to: Option<&str>) -> Result<DateRange> {
    let range = DateRange::new(parse_timestamp("from", from)?, parse_timestamp("to", to)?);
    if range.is_inverted() {
        return Err(AppError::BadRequest(
            "'from' must be before 'to'".to_string(),
        ));
    }
    Ok(range)
}

// ─── Manual Entry ────────────────────────────────────────────

/// Log an activity that was not tracked live.
async fn log_activity(
    State(state): State<Arc<AppState>>,
    Path(dog_id): Path<String>,
    Json(entry): Json<ManualActivity>,
) -> Result<(StatusCode, Json<StoredActivity>)> {
    validate_dog_id(&dog_id)?;
    entry.validate()?;

    let max_weight = state.config.max_subject_weight_kg;
    if let Some(weight) = entry.weight_kg.filter(|&w| w > max_weight) {
        return Err(AppError::BadRequest(format!(
            "weight_kg must be in (0, {}], got {}",
            max_weight, weight
        )));
    }

    let calories = match (entry.calories_burned, entry.weight_kg) {
        (Some(calories), _) => calories,
        (None, Some(weight)) => estimate_calories(
            entry.activity_type,
            f64::from(entry.duration_minutes),
            entry.distance_km.unwrap_or(0.0),
            weight,
        ),
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either calories_burned or weight_kg is required".to_string(),
            ))
        }
    };

    let stored = state.store.save(entry.into_record(&dog_id, calories)).await?;
    tracing::info!(
        dog_id = %dog_id,
        activity_id = stored.id,
        "Manual activity logged"
    );
    Ok((StatusCode::CREATED, Json(stored)))
}

// ─── Listing ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Start of window, inclusive (RFC3339)
    from: Option<String>,
    /// End of window, exclusive (RFC3339)
    to: Option<String>,
    /// Pagination: page number (1-indexed)
    #[serde(default = "default_page")]
    page: u32,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    50
}

/// Paginated activities. Routes are left out; fetch them per activity.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitiesResponse {
    pub activities: Vec<StoredActivity>,
    pub total: u32,
    pub page: u32,
    pub per_page: u32,
}

async fn list_activities(
    State(state): State<Arc<AppState>>,
    Path(dog_id): Path<String>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<ActivitiesResponse>> {
    validate_dog_id(&dog_id)?;
    let range = parse_range(params.from.as_deref(), params.to.as_deref())?;

    let page = params.page.max(1);
    let per_page = params.per_page.clamp(1, MAX_PER_PAGE);

    let all = state.store.list_for_dog(&dog_id, range).await?;
    let total = all.len() as u32;
    let offset = ((page - 1) as usize).saturating_mul(per_page as usize);

    let activities = all
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .map(|mut activity| {
            activity.record.route = None;
            activity
        })
        .collect();

    Ok(Json(ActivitiesResponse {
        activities,
        total,
        page,
        per_page,
    }))
}

// ─── Stats ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct StatsQuery {
    from: Option<String>,
    to: Option<String>,
}

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(dog_id): Path<String>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<ActivitySummary>> {
    validate_dog_id(&dog_id)?;
    let range = parse_range(params.from.as_deref(), params.to.as_deref())?;

    let activities = state.store.list_for_dog(&dog_id, range).await?;
    Ok(Json(ActivitySummary::from_activities(
        &activities,
        state.config.daily_goal_minutes,
        Utc::now().date_naive(),
    )))
}

// ─── Single Activity ─────────────────────────────────────────

async fn load_activity(state: &AppState, id: u64) -> Result<StoredActivity> {
    state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", id)))
}

async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<StoredActivity>> {
    Ok(Json(load_activity(&state, id).await?))
}

/// Route as a GeoJSON feature, with the encoded polyline as a property.
async fn get_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<geojson::Feature>> {
    let activity = load_activity(&state, id).await?;
    let fixes = activity
        .record
        .route
        .as_deref()
        .ok_or_else(|| AppError::NotFound(format!("Activity {} has no route", id)))?;

    let mut feature = route_feature(id, fixes, activity.record.distance_km)
        .map_err(|e| AppError::NotFound(e.to_string()))?;
    let polyline = encode_route(fixes).map_err(|e| AppError::Internal(e.into()))?;
    feature.set_property("polyline", polyline);

    Ok(Json(feature))
}
