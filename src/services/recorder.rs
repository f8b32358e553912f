// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-session event loop.
//!
//! One task owns the [`Tracker`] and serializes everything that touches it:
//! fixes from the provider stream, the periodic tick, and stop/abandon
//! commands. Live state is published on a `watch` channel after each change.

use crate::db::ActivityStore;
use crate::error::AppError;
use crate::models::{GeoFix, SessionSnapshot, StoredActivity};
use crate::services::location::{FixStream, LocationEvent};
use crate::services::tracker::Tracker;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;

/// Control messages for a running session.
#[derive(Debug)]
pub enum SessionCommand {
    /// Finish, persist, and reply with the stored activity
    Stop {
        notes: Option<String>,
        reply: oneshot::Sender<Result<StoredActivity, AppError>>,
    },
    /// Discard without a record
    Abandon,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Stopped and persisted under this id
    Recorded(u64),
    /// Stopped, but the store rejected the record
    PersistFailed,
    /// Provider reported an error
    Aborted { reason: String },
    /// Cancelled by the client, or every handle was dropped
    Abandoned,
}

/// Everything the loop needs besides the tracker itself.
pub struct SessionChannels {
    pub fixes: FixStream,
    pub commands: mpsc::Receiver<SessionCommand>,
    pub snapshots: watch::Sender<SessionSnapshot>,
}

/// Drive a started tracker until it stops or is aborted.
pub async fn run_session(
    mut tracker: Tracker,
    channels: SessionChannels,
    store: Arc<dyn ActivityStore>,
    tick_interval: Duration,
) -> SessionOutcome {
    let SessionChannels {
        mut fixes,
        mut commands,
        snapshots,
    } = channels;

    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut fixes_open = true;

    loop {
        tokio::select! {
            event = fixes.recv(), if fixes_open => match event {
                Some(LocationEvent::Fix(fix)) => {
                    apply_fix(&mut tracker, fix);
                    publish(&tracker, &snapshots);
                }
                Some(LocationEvent::Error(reason)) => {
                    tracker.abort(&reason);
                    return SessionOutcome::Aborted { reason };
                }
                None => {
                    // No more fixes; keep ticking until stopped
                    tracing::debug!("Location stream closed");
                    fixes_open = false;
                }
            },
            command = commands.recv() => match command {
                Some(SessionCommand::Stop { notes, reply }) => {
                    // Fixes delivered before the stop still count
                    while let Ok(event) = fixes.try_recv() {
                        match event {
                            LocationEvent::Fix(fix) => apply_fix(&mut tracker, fix),
                            LocationEvent::Error(reason) => {
                                tracker.abort(&reason);
                                let _ = reply.send(Err(AppError::LocationUnavailable(reason.clone())));
                                return SessionOutcome::Aborted { reason };
                            }
                        }
                    }
                    return finish(&mut tracker, notes, reply, store.as_ref()).await;
                }
                Some(SessionCommand::Abandon) | None => {
                    tracker.abort("abandoned");
                    return SessionOutcome::Abandoned;
                }
            },
            _ = ticker.tick() => {
                if tracker.tick(Utc::now()).is_ok() {
                    publish(&tracker, &snapshots);
                }
            }
        }
    }
}

fn apply_fix(tracker: &mut Tracker, fix: GeoFix) {
    if let Err(e) = tracker.record_fix(fix) {
        tracing::warn!(error = %e, "Fix rejected");
    }
}

fn publish(tracker: &Tracker, snapshots: &watch::Sender<SessionSnapshot>) {
    if let Some(snapshot) = tracker.snapshot(Utc::now()) {
        snapshots.send_replace(snapshot);
    }
}

async fn finish(
    tracker: &mut Tracker,
    notes: Option<String>,
    reply: oneshot::Sender<Result<StoredActivity, AppError>>,
    store: &dyn ActivityStore,
) -> SessionOutcome {
    let result = match tracker.stop(Utc::now(), notes) {
        Ok(record) => store.save(record).await,
        Err(e) => Err(e.into()),
    };

    let outcome = match &result {
        Ok(stored) => SessionOutcome::Recorded(stored.id),
        Err(e) => {
            tracing::error!(error = %e, "Failed to persist activity");
            SessionOutcome::PersistFailed
        }
    };

    if reply.send(result).is_err() {
        tracing::warn!("Stop requester went away before the reply");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::ActivityType;
    use crate::services::location::{LocationProvider, ReplayLocationProvider};
    use crate::services::tracker::SessionParams;
    use chrono::Duration as ChronoDuration;

    struct Harness {
        commands: mpsc::Sender<SessionCommand>,
        snapshots: watch::Receiver<SessionSnapshot>,
        task: tokio::task::JoinHandle<SessionOutcome>,
        store: Arc<MemoryStore>,
    }

    fn spawn_session(provider: &dyn LocationProvider) -> Harness {
        let mut tracker = Tracker::default();
        let now = Utc::now();
        let params = SessionParams {
            dog_id: "pepper".to_string(),
            activity_type: ActivityType::Walk,
            weight_kg: 15.0,
        };
        let fixes = tracker.start(provider, 1, params, now).unwrap();
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let (snap_tx, snap_rx) = watch::channel(tracker.snapshot(now).unwrap());
        let store = Arc::new(MemoryStore::new());

        let task = tokio::spawn(run_session(
            tracker,
            SessionChannels {
                fixes,
                commands: cmd_rx,
                snapshots: snap_tx,
            },
            store.clone(),
            Duration::from_millis(10),
        ));

        Harness {
            commands: cmd_tx,
            snapshots: snap_rx,
            task,
            store,
        }
    }

    fn equator_walk() -> Vec<GeoFix> {
        let t = Utc::now();
        vec![
            GeoFix::new(0.0, 0.0, t),
            GeoFix::new(0.0, 0.001, t + ChronoDuration::seconds(1)),
            GeoFix::new(0.0, 0.002, t + ChronoDuration::seconds(2)),
        ]
    }

    async fn stop(harness: &Harness) -> Result<StoredActivity, AppError> {
        let (reply, rx) = oneshot::channel();
        harness
            .commands
            .send(SessionCommand::Stop { notes: None, reply })
            .await
            .unwrap();
        rx.await.unwrap()
    }

    #[tokio::test]
    async fn test_stop_persists_all_delivered_fixes() {
        let provider = ReplayLocationProvider::from_fixes(equator_walk());
        let harness = spawn_session(&provider);

        let stored = stop(&harness).await.unwrap();
        assert!((stored.record.distance_km - 0.222).abs() < 0.001);
        assert_eq!(stored.record.route.as_ref().map(Vec::len), Some(3));

        assert_eq!(harness.task.await.unwrap(), SessionOutcome::Recorded(stored.id));
        assert_eq!(harness.store.len(), 1);
    }

    #[tokio::test]
    async fn test_provider_error_aborts_without_record() {
        let provider = ReplayLocationProvider::new(vec![LocationEvent::Error(
            "permission revoked".to_string(),
        )]);
        let harness = spawn_session(&provider);

        let outcome = harness.task.await.unwrap();
        assert_eq!(
            outcome,
            SessionOutcome::Aborted {
                reason: "permission revoked".to_string()
            }
        );
        assert!(harness.store.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_handles_abandon() {
        let provider = ReplayLocationProvider::from_fixes(equator_walk());
        let Harness {
            commands,
            task,
            store,
            ..
        } = spawn_session(&provider);

        drop(commands);
        assert_eq!(task.await.unwrap(), SessionOutcome::Abandoned);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_ticks_publish_snapshots() {
        let provider = ReplayLocationProvider::from_fixes(equator_walk());
        let mut harness = spawn_session(&provider);

        // Wait until all three fixes show up in the published snapshot
        loop {
            harness.snapshots.changed().await.unwrap();
            if harness.snapshots.borrow().fix_count == 3 {
                break;
            }
        }
        let snapshot = harness.snapshots.borrow().clone();
        assert_eq!(snapshot.dog_id, "pepper");
        assert!((snapshot.distance_km - 0.222).abs() < 0.001);

        harness.commands.send(SessionCommand::Abandon).await.unwrap();
        assert_eq!(harness.task.await.unwrap(), SessionOutcome::Abandoned);
    }
}
