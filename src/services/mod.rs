// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod calories;
pub mod distance;
pub mod location;
pub mod recorder;
pub mod tracker;
pub mod tracking;

pub use calories::estimate_calories;
pub use distance::{haversine_km, route_distance_km};
pub use location::{
    FixSender, LocationError, LocationEvent, LocationProvider, PushLocationProvider,
    ReplayLocationProvider,
};
pub use tracker::{SessionParams, Tracker, TrackerPhase, TrackingError};
pub use tracking::{TrackingService, TrackingSettings};
