// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! PawTrail: GPS activity tracking for dogs
//!
//! This crate provides the tracking core (distance accumulation, calorie
//! estimation, session lifecycle) and the backend API a mobile client uses
//! to drive live sessions and read back recorded activities.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::ActivityStore;
use services::TrackingService;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ActivityStore>,
    pub tracking: TrackingService,
}

impl AppState {
    /// Wire up state around a store.
    pub fn new(config: Config, store: Arc<dyn ActivityStore>) -> Self {
        let tracking = TrackingService::new(store.clone(), config.tracking_settings());
        Self {
            config,
            store,
            tracking,
        }
    }
}
