// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod fix;
pub mod session;
pub mod stats;

pub use activity::{ActivityRecord, ActivityType, ManualActivity, StoredActivity, TrackingMethod};
pub use fix::GeoFix;
pub use session::SessionSnapshot;
pub use stats::ActivitySummary;
