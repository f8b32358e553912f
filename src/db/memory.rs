// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process activity store.

use crate::db::ActivityStore;
use crate::error::AppError;
use crate::models::{ActivityRecord, StoredActivity};
use crate::time_utils::DateRange;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Activity store backed by a concurrent map.
#[derive(Debug)]
pub struct MemoryStore {
    next_id: AtomicU64,
    activities: DashMap<u64, StoredActivity>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            activities: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn save(&self, record: ActivityRecord) -> Result<StoredActivity, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let stored = StoredActivity { id, record };
        self.activities.insert(id, stored.clone());

        tracing::debug!(
            id,
            dog_id = %stored.record.dog_id,
            "Activity saved"
        );
        Ok(stored)
    }

    async fn get(&self, id: u64) -> Result<Option<StoredActivity>, AppError> {
        Ok(self.activities.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_for_dog(
        &self,
        dog_id: &str,
        range: DateRange,
    ) -> Result<Vec<StoredActivity>, AppError> {
        let mut activities: Vec<StoredActivity> = self
            .activities
            .iter()
            .filter(|entry| {
                let record = &entry.value().record;
                record.dog_id == dog_id && range.contains(record.start_time)
            })
            .map(|entry| entry.value().clone())
            .collect();

        // Newest first; id breaks ties so ordering is stable
        activities.sort_by(|a, b| {
            b.record
                .start_time
                .cmp(&a.record.start_time)
                .then(b.id.cmp(&a.id))
        });
        Ok(activities)
    }
}
