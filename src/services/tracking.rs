// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registry of active tracking sessions, at most one per dog.
//!
//! Each session runs in its own task (see [`crate::services::recorder`]);
//! the registry only keeps the handles used to talk to it.

use crate::db::ActivityStore;
use crate::error::{AppError, Result};
use crate::models::{GeoFix, SessionSnapshot, StoredActivity};
use crate::services::location::{FixSender, LocationProvider, PushLocationProvider};
use crate::services::recorder::{run_session, SessionChannels, SessionCommand};
use crate::services::tracker::{SessionParams, Tracker};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};

/// Capacity of each session's command channel.
const COMMAND_BUFFER: usize = 8;

/// Tunables for new sessions.
#[derive(Debug, Clone)]
pub struct TrackingSettings {
    pub tick_interval: Duration,
    pub fix_buffer: usize,
    pub max_weight_kg: f64,
}

/// Channels for talking to one running session.
struct SessionHandle {
    session_id: u64,
    commands: mpsc::Sender<SessionCommand>,
    /// Present when the device pushes its fixes to us
    fixes: Option<FixSender>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

/// Service for starting, feeding, and stopping tracking sessions.
#[derive(Clone)]
pub struct TrackingService {
    sessions: Arc<DashMap<String, SessionHandle>>,
    next_session_id: Arc<AtomicU64>,
    store: Arc<dyn ActivityStore>,
    settings: TrackingSettings,
}

impl TrackingService {
    pub fn new(store: Arc<dyn ActivityStore>, settings: TrackingSettings) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            next_session_id: Arc::new(AtomicU64::new(1)),
            store,
            settings,
        }
    }

    /// Number of sessions currently tracking.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Start a session fed by fixes pushed through [`Self::push_fixes`].
    ///
    /// `location_available` is the device's own report of its capability.
    pub fn start(&self, params: SessionParams, location_available: bool) -> Result<SessionSnapshot> {
        let provider = if location_available {
            PushLocationProvider::new(self.settings.fix_buffer)
        } else {
            PushLocationProvider::unavailable()
        };
        let sender = provider.sender();
        self.start_session(params, &provider, Some(sender))
    }

    /// Start a session driven by an arbitrary provider.
    pub fn start_with_provider(
        &self,
        params: SessionParams,
        provider: &dyn LocationProvider,
    ) -> Result<SessionSnapshot> {
        self.start_session(params, provider, None)
    }

    fn start_session(
        &self,
        params: SessionParams,
        provider: &dyn LocationProvider,
        push: Option<FixSender>,
    ) -> Result<SessionSnapshot> {
        let dog_id = params.dog_id.clone();

        // Holding the entry keeps a concurrent start for the same dog out
        let vacant = match self.sessions.entry(dog_id.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(format!(
                    "Dog {} is already being tracked",
                    dog_id
                )))
            }
            Entry::Vacant(vacant) => vacant,
        };

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let mut tracker = Tracker::new(self.settings.max_weight_kg);
        let fixes = tracker.start(provider, session_id, params, now)?;
        let snapshot = tracker
            .snapshot(now)
            .ok_or_else(|| anyhow::anyhow!("Tracker has no session right after start"))?;

        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snap_tx, snap_rx) = watch::channel(snapshot.clone());

        vacant.insert(SessionHandle {
            session_id,
            commands: cmd_tx,
            fixes: push,
            snapshot: snap_rx,
        });

        let sessions = self.sessions.clone();
        let store = self.store.clone();
        let tick_interval = self.settings.tick_interval;
        tokio::spawn(async move {
            let outcome = run_session(
                tracker,
                SessionChannels {
                    fixes,
                    commands: cmd_rx,
                    snapshots: snap_tx,
                },
                store,
                tick_interval,
            )
            .await;

            // A newer session for the same dog may already be registered
            sessions.remove_if(&dog_id, |_, handle| handle.session_id == session_id);
            tracing::info!(session_id, dog_id = %dog_id, outcome = ?outcome, "Session ended");
        });

        Ok(snapshot)
    }

    /// Latest published state of a dog's session.
    pub fn snapshot(&self, dog_id: &str) -> Result<SessionSnapshot> {
        self.sessions
            .get(dog_id)
            .map(|handle| handle.snapshot.borrow().clone())
            .ok_or_else(|| not_tracking(dog_id))
    }

    /// Push device fixes into a session. All fixes are checked first; one
    /// bad fix rejects the whole batch.
    pub async fn push_fixes(&self, dog_id: &str, fixes: &[GeoFix]) -> Result<usize> {
        if let Some(bad) = fixes.iter().find(|f| !f.is_valid()) {
            return Err(AppError::BadRequest(format!(
                "Fix out of range: ({}, {})",
                bad.latitude, bad.longitude
            )));
        }

        let sender = self.push_sender(dog_id)?;
        for fix in fixes {
            sender
                .send_fix(*fix)
                .await
                .map_err(|_| not_tracking(dog_id))?;
        }
        Ok(fixes.len())
    }

    /// Report a device-side location failure; the session ends without a record.
    pub async fn report_location_error(&self, dog_id: &str, message: &str) -> Result<()> {
        let sender = self.push_sender(dog_id)?;
        self.sessions.remove(dog_id);

        tracing::warn!(dog_id, error = message, "Location provider error reported");
        if sender.send_error(message).await.is_err() {
            tracing::debug!(dog_id, "Session already gone when error arrived");
        }
        Ok(())
    }

    /// Stop a dog's session and persist the record.
    pub async fn stop(&self, dog_id: &str, notes: Option<String>) -> Result<StoredActivity> {
        let (_, handle) = self
            .sessions
            .remove(dog_id)
            .ok_or_else(|| not_tracking(dog_id))?;

        let (reply, response) = oneshot::channel();
        handle
            .commands
            .send(SessionCommand::Stop { notes, reply })
            .await
            .map_err(|_| not_tracking(dog_id))?;

        response
            .await
            .map_err(|_| anyhow::anyhow!("Session for dog {} ended without a reply", dog_id))?
    }

    /// Cancel a dog's session without a record.
    pub async fn abandon(&self, dog_id: &str) -> Result<()> {
        let (_, handle) = self
            .sessions
            .remove(dog_id)
            .ok_or_else(|| not_tracking(dog_id))?;

        if handle.commands.send(SessionCommand::Abandon).await.is_err() {
            tracing::debug!(dog_id, "Session already gone when abandoned");
        }
        Ok(())
    }

    fn push_sender(&self, dog_id: &str) -> Result<FixSender> {
        let handle = self.sessions.get(dog_id).ok_or_else(|| not_tracking(dog_id))?;
        handle.fixes.clone().ok_or_else(|| {
            AppError::BadRequest(format!(
                "Session for dog {} does not accept pushed locations",
                dog_id
            ))
        })
    }
}

fn not_tracking(dog_id: &str) -> AppError {
    AppError::NotFound(format!("No tracking session for dog {}", dog_id))
}
