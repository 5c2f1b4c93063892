use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::attendance::clock::Clock;
use crate::dashboard::Dashboard;
use crate::store::FlagStore;

/// Periodic tick: auto-absent backstop plus the daily flag purge.
pub struct AutoAbsentScheduler {
    dashboard: Arc<Dashboard>,
    store: Arc<dyn FlagStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    retention_days: u64,
    last_purge: Option<NaiveDate>,
}

impl AutoAbsentScheduler {
    pub fn new(
        dashboard: Arc<Dashboard>,
        store: Arc<dyn FlagStore>,
        clock: Arc<dyn Clock>,
        interval: Duration,
        retention_days: u64,
    ) -> Self {
        Self {
            dashboard,
            store,
            clock,
            interval,
            retention_days,
            last_purge: None,
        }
    }

    pub async fn run(mut self, shutdown: CancellationToken) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_ms = self.interval.as_millis() as u64, "Auto-absent scheduler started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Auto-absent scheduler stopped");
                    break;
                }
                _ = ticker.tick() => self.tick().await,
            }
        }
    }

    pub async fn tick(&mut self) {
        let now = self.clock.now();
        let today = now.date();

        if self.last_purge != Some(today) {
            self.purge(today).await;
            self.last_purge = Some(today);
        }

        if let Err(e) = self.dashboard.tick(now).await {
            error!(error = %e, "Auto-absent tick failed");
        }
    }

    async fn purge(&self, today: NaiveDate) {
        let Some(cutoff) = today.checked_sub_days(Days::new(self.retention_days)) else {
            return;
        };

        match self.store.purge_before(cutoff).await {
            Ok(0) => debug!(%cutoff, "No expired flags"),
            Ok(purged) => info!(%cutoff, purged, "Expired submission flags purged"),
            Err(e) => error!(error = %e, "Flag purge failed"),
        }
    }
}
