// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tracking session state machine.
//!
//! `Idle → Tracking → Stopped`, with a provider error or an abandon taking
//! `Tracking` straight back to `Idle` and discarding everything collected.
//! The tracker is clock-free: callers pass `now` in.

use crate::models::{ActivityRecord, ActivityType, GeoFix, SessionSnapshot, TrackingMethod};
use crate::services::calories::estimate_calories;
use crate::services::distance::haversine_km;
use crate::services::location::{FixStream, LocationProvider};
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};

/// Default upper bound on subject weight (kg).
pub const DEFAULT_MAX_WEIGHT_KG: f64 = 120.0;

/// Errors from tracker transitions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackingError {
    #[error("Tracking already in progress")]
    AlreadyTracking,

    #[error("No tracking session in progress")]
    NotTracking,

    #[error("Location provider unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Fix out of range: ({latitude}, {longitude})")]
    InvalidFix { latitude: f64, longitude: f64 },
}

/// What the caller supplies to start a session.
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub dog_id: String,
    pub activity_type: ActivityType,
    pub weight_kg: f64,
}

/// In-memory state of one active session.
#[derive(Debug, Clone)]
pub struct TrackingSession {
    session_id: u64,
    dog_id: String,
    activity_type: ActivityType,
    subject_weight_kg: f64,
    start_time: DateTime<Utc>,
    fixes: Vec<GeoFix>,
    cumulative_distance_km: f64,
    elapsed_minutes: f64,
    calories: u32,
}

impl TrackingSession {
    pub fn new(session_id: u64, params: SessionParams, start_time: DateTime<Utc>) -> Self {
        Self {
            session_id,
            dog_id: params.dog_id,
            activity_type: params.activity_type,
            subject_weight_kg: params.weight_kg,
            start_time,
            fixes: Vec::new(),
            cumulative_distance_km: 0.0,
            elapsed_minutes: 0.0,
            calories: 0,
        }
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn fixes(&self) -> &[GeoFix] {
        &self.fixes
    }

    pub fn distance_km(&self) -> f64 {
        self.cumulative_distance_km
    }

    pub fn calories(&self) -> u32 {
        self.calories
    }

    /// Append a fix and return the distance it added.
    ///
    /// The first fix only seeds the route. Out-of-range fixes are rejected
    /// and leave the session untouched.
    pub fn record_fix(&mut self, fix: GeoFix) -> Result<f64, TrackingError> {
        if !fix.is_valid() {
            return Err(TrackingError::InvalidFix {
                latitude: fix.latitude,
                longitude: fix.longitude,
            });
        }

        let increment = self
            .fixes
            .last()
            .map(|prev| haversine_km(prev, &fix))
            .unwrap_or(0.0);

        self.fixes.push(fix);
        self.cumulative_distance_km += increment;
        self.recompute_calories();
        Ok(increment)
    }

    /// Recompute elapsed time and calories as of `now`.
    pub fn refresh(&mut self, now: DateTime<Utc>) {
        self.elapsed_minutes = minutes_between(self.start_time, now);
        self.recompute_calories();
    }

    fn recompute_calories(&mut self) {
        self.calories = estimate_calories(
            self.activity_type,
            self.elapsed_minutes,
            self.cumulative_distance_km,
            self.subject_weight_kg,
        );
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            dog_id: self.dog_id.clone(),
            activity_type: self.activity_type,
            start_time: self.start_time,
            elapsed_seconds: (now - self.start_time).num_seconds().max(0),
            distance_km: self.cumulative_distance_km,
            calories: self.calories,
            fix_count: self.fixes.len() as u32,
            last_fix: self.fixes.last().copied(),
        }
    }

    /// Consume the session into a finished record.
    pub fn finish(mut self, end_time: DateTime<Utc>, notes: Option<String>) -> ActivityRecord {
        self.refresh(end_time);

        let route = if self.fixes.is_empty() {
            None
        } else {
            Some(self.fixes)
        };

        ActivityRecord {
            dog_id: self.dog_id,
            activity_type: self.activity_type,
            duration_minutes: self.elapsed_minutes.round() as u32,
            distance_km: self.cumulative_distance_km,
            calories_burned: self.calories,
            start_time: self.start_time,
            end_time,
            tracking_method: TrackingMethod::Gps,
            route,
            notes: notes.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// Fractional minutes from `start` to `end`, never negative.
fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let millis = (end - start).num_milliseconds().max(0);
    millis as f64 / 60_000.0
}

/// Coarse tracker state for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    Idle,
    Tracking,
    Stopped,
}

#[derive(Debug)]
enum TrackerState {
    Idle,
    Tracking(TrackingSession),
    Stopped,
}

/// Session lifecycle for a single subject.
#[derive(Debug)]
pub struct Tracker {
    state: TrackerState,
    max_weight_kg: f64,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WEIGHT_KG)
    }
}

impl Tracker {
    pub fn new(max_weight_kg: f64) -> Self {
        Self {
            state: TrackerState::Idle,
            max_weight_kg,
        }
    }

    pub fn phase(&self) -> TrackerPhase {
        match self.state {
            TrackerState::Idle => TrackerPhase::Idle,
            TrackerState::Tracking(_) => TrackerPhase::Tracking,
            TrackerState::Stopped => TrackerPhase::Stopped,
        }
    }

    /// Active session, if tracking.
    pub fn session(&self) -> Option<&TrackingSession> {
        match &self.state {
            TrackerState::Tracking(session) => Some(session),
            _ => None,
        }
    }

    fn session_mut(&mut self) -> Result<&mut TrackingSession, TrackingError> {
        match &mut self.state {
            TrackerState::Tracking(session) => Ok(session),
            _ => Err(TrackingError::NotTracking),
        }
    }

    /// Start tracking (`Idle`/`Stopped → Tracking`).
    ///
    /// Subscribes to the provider first; if that fails the tracker stays put.
    pub fn start<P: LocationProvider + ?Sized>(
        &mut self,
        provider: &P,
        session_id: u64,
        params: SessionParams,
        now: DateTime<Utc>,
    ) -> Result<FixStream, TrackingError> {
        if matches!(self.state, TrackerState::Tracking(_)) {
            return Err(TrackingError::AlreadyTracking);
        }

        let weight = params.weight_kg;
        if !weight.is_finite() || weight <= 0.0 || weight > self.max_weight_kg {
            return Err(TrackingError::InvalidParameters(format!(
                "weight_kg must be in (0, {}], got {}",
                self.max_weight_kg, weight
            )));
        }

        let stream = provider
            .watch()
            .map_err(|e| TrackingError::LocationUnavailable(e.to_string()))?;

        tracing::info!(
            session_id,
            dog_id = %params.dog_id,
            activity_type = %params.activity_type,
            start_time = %format_utc_rfc3339(now),
            "Tracking started"
        );
        if let Ok(fix) = provider.current_fix() {
            tracing::debug!(
                session_id,
                latitude = fix.latitude,
                longitude = fix.longitude,
                "Initial position"
            );
        }

        self.state = TrackerState::Tracking(TrackingSession::new(session_id, params, now));
        Ok(stream)
    }

    /// Feed a fix into the active session.
    pub fn record_fix(&mut self, fix: GeoFix) -> Result<f64, TrackingError> {
        let session = self.session_mut()?;
        let increment = session.record_fix(fix)?;
        tracing::debug!(
            session_id = session.session_id,
            increment_km = increment,
            total_km = session.cumulative_distance_km,
            "Fix recorded"
        );
        Ok(increment)
    }

    /// Periodic recompute of elapsed time and calories.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<(), TrackingError> {
        self.session_mut()?.refresh(now);
        Ok(())
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Option<SessionSnapshot> {
        self.session().map(|s| s.snapshot(now))
    }

    /// Stop tracking (`Tracking → Stopped`) and build the record.
    pub fn stop(
        &mut self,
        now: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<ActivityRecord, TrackingError> {
        match std::mem::replace(&mut self.state, TrackerState::Stopped) {
            TrackerState::Tracking(session) => {
                let session_id = session.session_id;
                let record = session.finish(now, notes);
                tracing::info!(
                    session_id,
                    distance_km = record.distance_km,
                    duration_minutes = record.duration_minutes,
                    calories = record.calories_burned,
                    "Tracking stopped"
                );
                Ok(record)
            }
            previous => {
                self.state = previous;
                Err(TrackingError::NotTracking)
            }
        }
    }

    /// Drop the active session without a record (`Tracking → Idle`).
    ///
    /// Returns the number of discarded fixes, or `None` if not tracking.
    pub fn abort(&mut self, reason: &str) -> Option<usize> {
        match std::mem::replace(&mut self.state, TrackerState::Idle) {
            TrackerState::Tracking(session) => {
                let discarded = session.fixes.len();
                tracing::warn!(
                    session_id = session.session_id,
                    discarded_fixes = discarded,
                    reason,
                    "Tracking aborted"
                );
                Some(discarded)
            }
            previous => {
                self.state = previous;
                None
            }
        }
    }
}
