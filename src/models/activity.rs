// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity record model for storage and API.

use crate::models::GeoFix;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Kind of activity, which selects the calorie formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ActivityType {
    Walk,
    Run,
    Hike,
    Play,
    Training,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Walk => "walk",
            ActivityType::Run => "run",
            ActivityType::Hike => "hike",
            ActivityType::Play => "play",
            ActivityType::Training => "training",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an activity was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum TrackingMethod {
    #[default]
    Manual,
    Gps,
    Accelerometer,
}

/// A finished activity. Never mutated once handed to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityRecord {
    /// Dog the activity belongs to
    pub dog_id: String,
    pub activity_type: ActivityType,
    /// Elapsed time, rounded to whole minutes
    pub duration_minutes: u32,
    /// Distance in kilometers
    pub distance_km: f64,
    /// Estimated energy expenditure (kcal)
    pub calories_burned: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub tracking_method: TrackingMethod,
    /// Recorded fixes, absent for manual entries and empty GPS sessions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Vec<GeoFix>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Activity record as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StoredActivity {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    #[serde(flatten)]
    pub record: ActivityRecord,
}

/// Manually logged activity (no live tracking).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ManualActivity {
    pub activity_type: ActivityType,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: u32,
    #[validate(range(min = 0.0, max = 200.0))]
    #[serde(default)]
    pub distance_km: Option<f64>,
    /// Overrides the estimate when the owner knows better
    #[validate(range(max = 20000))]
    #[serde(default)]
    pub calories_burned: Option<u32>,
    /// Needed for the estimate when `calories_burned` is absent; the upper
    /// bound is the configured subject weight limit
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default)]
    pub weight_kg: Option<f64>,
    pub start_time: DateTime<Utc>,
    /// `manual` or `accelerometer` (pedometer-derived entries)
    #[serde(default)]
    pub tracking_method: TrackingMethod,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub notes: Option<String>,
}

impl ManualActivity {
    /// Build the record; `calories` is the final calorie figure.
    pub fn into_record(self, dog_id: &str, calories: u32) -> ActivityRecord {
        let end_time = self.start_time + Duration::minutes(i64::from(self.duration_minutes));
        ActivityRecord {
            dog_id: dog_id.to_string(),
            activity_type: self.activity_type,
            duration_minutes: self.duration_minutes,
            distance_km: self.distance_km.unwrap_or(0.0),
            calories_burned: calories,
            start_time: self.start_time,
            end_time,
            tracking_method: self.tracking_method,
            route: None,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        }
    }
}
