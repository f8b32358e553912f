// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence layer for finished activities.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{ActivityRecord, StoredActivity};
use crate::time_utils::DateRange;
use async_trait::async_trait;

/// Store for finished activities.
///
/// Records are immutable once saved; the store assigns ids.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Persist a finished record.
    async fn save(&self, record: ActivityRecord) -> Result<StoredActivity, AppError>;

    /// Fetch one activity by id.
    async fn get(&self, id: u64) -> Result<Option<StoredActivity>, AppError>;

    /// Activities for a dog whose start time falls in `range`, newest first.
    async fn list_for_dog(
        &self,
        dog_id: &str,
        range: DateRange,
    ) -> Result<Vec<StoredActivity>, AppError>;
}
