// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location provider capability.
//!
//! A provider hands out a stream of [`LocationEvent`]s. The tracker never
//! polls the device directly; everything arrives as events on the stream.

use crate::models::GeoFix;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Event delivered by a location provider.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    Fix(GeoFix),
    /// Provider failure; ends the session that receives it
    Error(String),
}

/// Continuous stream of location events.
pub type FixStream = mpsc::Receiver<LocationEvent>;

/// Errors from location providers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Location provider unavailable: {0}")]
    Unavailable(String),

    #[error("No location fix available")]
    NoFix,

    #[error("Location stream closed")]
    Closed,
}

/// Source of geographic fixes.
pub trait LocationProvider: Send + Sync {
    /// Latest known fix (single shot).
    fn current_fix(&self) -> Result<GeoFix, LocationError>;

    /// Start continuous updates.
    fn watch(&self) -> Result<FixStream, LocationError>;
}

// ─── Push Provider ───────────────────────────────────────────

/// Provider fed from outside, e.g. by a device posting fixes over HTTP.
///
/// The stream can be watched once; pushes go through [`FixSender`].
pub struct PushLocationProvider {
    available: bool,
    latest: Arc<Mutex<Option<GeoFix>>>,
    sender: FixSender,
    receiver: Mutex<Option<FixStream>>,
}

impl PushLocationProvider {
    /// Create an available provider buffering up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let latest = Arc::new(Mutex::new(None));
        Self {
            available: true,
            latest: latest.clone(),
            sender: FixSender { tx, latest },
            receiver: Mutex::new(Some(rx)),
        }
    }

    /// Provider for a device that reported no location capability.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(1)
        }
    }

    /// Handle for pushing events into the stream.
    pub fn sender(&self) -> FixSender {
        self.sender.clone()
    }
}

impl LocationProvider for PushLocationProvider {
    fn current_fix(&self) -> Result<GeoFix, LocationError> {
        if !self.available {
            return Err(LocationError::Unavailable(
                "device has no location capability".to_string(),
            ));
        }
        let latest = *self
            .latest
            .lock()
            .map_err(|_| LocationError::Unavailable("latest fix lock poisoned".to_string()))?;
        latest.ok_or(LocationError::NoFix)
    }

    fn watch(&self) -> Result<FixStream, LocationError> {
        if !self.available {
            return Err(LocationError::Unavailable(
                "device has no location capability".to_string(),
            ));
        }
        self.receiver
            .lock()
            .map_err(|_| LocationError::Unavailable("receiver lock poisoned".to_string()))?
            .take()
            .ok_or_else(|| LocationError::Unavailable("location stream already in use".to_string()))
    }
}

/// Cloneable handle that pushes events into a [`PushLocationProvider`].
#[derive(Clone)]
pub struct FixSender {
    tx: mpsc::Sender<LocationEvent>,
    latest: Arc<Mutex<Option<GeoFix>>>,
}

impl FixSender {
    /// Push a fix; waits for buffer space.
    pub async fn send_fix(&self, fix: GeoFix) -> Result<(), LocationError> {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(fix);
        }
        self.tx
            .send(LocationEvent::Fix(fix))
            .await
            .map_err(|_| LocationError::Closed)
    }

    /// Report a provider failure.
    pub async fn send_error(&self, message: impl Into<String>) -> Result<(), LocationError> {
        self.tx
            .send(LocationEvent::Error(message.into()))
            .await
            .map_err(|_| LocationError::Closed)
    }
}

// ─── Replay Provider ─────────────────────────────────────────

/// Provider that replays a prerecorded event list, all queued at once.
pub struct ReplayLocationProvider {
    events: Vec<LocationEvent>,
}

impl ReplayLocationProvider {
    pub fn new(events: Vec<LocationEvent>) -> Self {
        Self { events }
    }

    /// Replay plain fixes.
    pub fn from_fixes(fixes: impl IntoIterator<Item = GeoFix>) -> Self {
        Self::new(fixes.into_iter().map(LocationEvent::Fix).collect())
    }
}

impl LocationProvider for ReplayLocationProvider {
    fn current_fix(&self) -> Result<GeoFix, LocationError> {
        self.events
            .iter()
            .find_map(|e| match e {
                LocationEvent::Fix(fix) => Some(*fix),
                LocationEvent::Error(_) => None,
            })
            .ok_or(LocationError::NoFix)
    }

    fn watch(&self) -> Result<FixStream, LocationError> {
        let (tx, rx) = mpsc::channel(self.events.len().max(1));
        for event in &self.events {
            tx.try_send(event.clone())
                .map_err(|e| LocationError::Unavailable(e.to_string()))?;
        }
        // Dropping `tx` closes the stream once the queue drains
        Ok(rx)
    }
}
