// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live tracking session view for API responses.

use crate::models::{ActivityType, GeoFix};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Point-in-time view of an active session, refreshed on every fix and tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionSnapshot {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub session_id: u64,
    pub dog_id: String,
    pub activity_type: ActivityType,
    pub start_time: DateTime<Utc>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub elapsed_seconds: i64,
    pub distance_km: f64,
    pub calories: u32,
    pub fix_count: u32,
    pub last_fix: Option<GeoFix>,
}
