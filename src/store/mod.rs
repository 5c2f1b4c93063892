use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::model::flag::FlagKey;

pub mod file;
pub mod memory;

pub use file::FileFlagStore;
pub use memory::MemoryFlagStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("flag store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("flag store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable record of which slots are already resolved.
#[async_trait]
pub trait FlagStore: Send + Sync {
    async fn get(&self, key: &FlagKey) -> Result<bool, StoreError>;

    async fn set(&self, key: &FlagKey) -> Result<(), StoreError>;

    /// Drops every flag dated before `cutoff`; returns how many went.
    async fn purge_before(&self, cutoff: NaiveDate) -> Result<usize, StoreError>;
}
