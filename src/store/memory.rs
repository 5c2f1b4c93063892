use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use moka::future::Cache;

use crate::model::flag::FlagKey;
use crate::store::{FlagStore, StoreError};

/// key => flag date
///
/// Entries expire on their own after the retention period; `purge_before`
/// handles the calendar cutoff.
pub struct MemoryFlagStore {
    flags: Cache<String, NaiveDate>,
}

impl MemoryFlagStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            flags: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(retention)
                .build(),
        }
    }
}

#[async_trait]
impl FlagStore for MemoryFlagStore {
    async fn get(&self, key: &FlagKey) -> Result<bool, StoreError> {
        Ok(self.flags.get(&key.to_string()).await.is_some())
    }

    async fn set(&self, key: &FlagKey) -> Result<(), StoreError> {
        self.flags.insert(key.to_string(), key.date).await;
        Ok(())
    }

    async fn purge_before(&self, cutoff: NaiveDate) -> Result<usize, StoreError> {
        let expired: Vec<_> = self
            .flags
            .iter()
            .filter(|(_, date)| *date < cutoff)
            .map(|(key, _)| key)
            .collect();

        let futures: Vec<_> = expired.iter().map(|key| self.flags.invalidate(key.as_str())).collect();
        futures::future::join_all(futures).await;

        Ok(expired.len())
    }
}
