use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::model::flag::FlagKey;
use crate::store::{FlagStore, StoreError};

/// JSON file of `key => flag date`, rewritten through a temp file on every
/// change. The in-memory map only changes once the write succeeded.
pub struct FileFlagStore {
    path: PathBuf,
    flags: Mutex<BTreeMap<String, NaiveDate>>,
}

impl FileFlagStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let flags = match fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), flags = flags.len(), "Flag store loaded");

        Ok(Self {
            path,
            flags: Mutex::new(flags),
        })
    }

    async fn persist(&self, flags: &BTreeMap<String, NaiveDate>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(flags)?).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), flags = flags.len(), "Flag store written");
        Ok(())
    }
}

#[async_trait]
impl FlagStore for FileFlagStore {
    async fn get(&self, key: &FlagKey) -> Result<bool, StoreError> {
        Ok(self.flags.lock().await.contains_key(&key.to_string()))
    }

    async fn set(&self, key: &FlagKey) -> Result<(), StoreError> {
        let mut flags = self.flags.lock().await;
        let name = key.to_string();
        if flags.contains_key(&name) {
            return Ok(());
        }

        let mut next = flags.clone();
        next.insert(name, key.date);
        self.persist(&next).await?;
        *flags = next;
        Ok(())
    }

    async fn purge_before(&self, cutoff: NaiveDate) -> Result<usize, StoreError> {
        let mut flags = self.flags.lock().await;
        let next: BTreeMap<_, _> = flags
            .iter()
            .filter(|(_, date)| **date >= cutoff)
            .map(|(key, date)| (key.clone(), *date))
            .collect();

        let purged = flags.len() - next.len();
        if purged > 0 {
            self.persist(&next).await?;
            *flags = next;
        }
        Ok(purged)
    }
}
