// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity aggregates for the dashboard.
//!
//! Computed on read from the activities in a date range; nothing here is
//! persisted.

use crate::models::StoredActivity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Totals and breakdowns over a set of activities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitySummary {
    // ─── Totals ──────────────────────────────────────────────────
    pub total_activities: u32,
    pub total_distance_km: f64,
    pub total_minutes: u32,
    pub total_calories: u32,

    // ─── By Activity Type ────────────────────────────────────────
    /// Activity count per type (for pie charts)
    pub activities_by_type: HashMap<String, u32>,
    /// Total distance per type (km)
    pub distance_by_type: HashMap<String, f64>,

    // ─── Time Series ─────────────────────────────────────────────
    /// Active minutes per day ("YYYY-MM-DD")
    pub minutes_by_day: BTreeMap<String, u32>,

    // ─── Daily Goal ──────────────────────────────────────────────
    pub daily_goal_minutes: u32,
    /// Days in the set whose minutes reached the goal
    pub days_goal_met: u32,
    /// Active minutes on `today`
    pub today_minutes: u32,
    /// `today_minutes` as a percentage of the goal, capped at 100
    pub today_goal_percent: f64,
}

impl ActivitySummary {
    /// Aggregate `activities`; days are bucketed by activity start date (UTC).
    pub fn from_activities(
        activities: &[StoredActivity],
        daily_goal_minutes: u32,
        today: NaiveDate,
    ) -> Self {
        let mut summary = Self {
            daily_goal_minutes,
            ..Self::default()
        };

        for activity in activities {
            summary.add(activity);
        }

        summary.days_goal_met = if daily_goal_minutes == 0 {
            summary.minutes_by_day.len() as u32
        } else {
            summary
                .minutes_by_day
                .values()
                .filter(|&&m| m >= daily_goal_minutes)
                .count() as u32
        };

        summary.today_minutes = summary
            .minutes_by_day
            .get(&day_key(today))
            .copied()
            .unwrap_or(0);
        summary.today_goal_percent = goal_percent(summary.today_minutes, daily_goal_minutes);

        summary
    }

    fn add(&mut self, activity: &StoredActivity) {
        let record = &activity.record;
        let kind = record.activity_type.as_str().to_string();

        // Totals saturate rather than overflow
        self.total_activities = self.total_activities.saturating_add(1);
        self.total_distance_km += record.distance_km;
        self.total_minutes = self.total_minutes.saturating_add(record.duration_minutes);
        self.total_calories = self.total_calories.saturating_add(record.calories_burned);

        let count = self.activities_by_type.entry(kind.clone()).or_insert(0);
        *count = count.saturating_add(1);
        *self.distance_by_type.entry(kind).or_insert(0.0) += record.distance_km;

        let day = self
            .minutes_by_day
            .entry(day_key(record.start_time.date_naive()))
            .or_insert(0);
        *day = day.saturating_add(record.duration_minutes);
    }
}

fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Percentage of `goal` reached, capped at 100. A zero goal counts as met.
pub fn goal_percent(minutes: u32, goal: u32) -> f64 {
    if goal == 0 {
        return 100.0;
    }
    (f64::from(minutes) / f64::from(goal) * 100.0).min(100.0)
}
