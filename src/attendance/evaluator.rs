use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use strum::IntoEnumIterator;
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

use crate::error::AppError;
use crate::model::attendance::{AttendanceEntry, AttendanceRecord, Status};
use crate::model::flag::{FlagKey, FlagKind};
use crate::model::session::Session;
use crate::model::slot::{AbsentTriggers, Slot, SlotWindows};
use crate::remote::{AttendanceApi, RemoteError};
use crate::store::{FlagStore, StoreError};

/// A slot resolved and confirmed by the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub slot: Slot,
    pub record: AttendanceRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoAbsent {
    Marked(Resolution),
    /// Delivery failed; not retried by later ticks.
    Failed(Slot),
}

/// `present` when both IDs match after trimming, ignoring case.
pub fn resolve_manual(entered_id: &str, authenticated_id: &str) -> Status {
    if entered_id.trim().to_lowercase() == authenticated_id.trim().to_lowercase() {
        Status::Present
    } else {
        Status::Absent
    }
}

/// What this process must treat as resolved beyond what the store reports.
#[derive(Default)]
struct Ledger {
    /// Auto-absent keys attempted today, delivered or not.
    attempted: HashSet<FlagKey>,
    /// Delivered records whose flag could not be written.
    unflagged: HashSet<FlagKey>,
}

impl Ledger {
    fn roll_over(&mut self, today: NaiveDate) {
        self.attempted.retain(|key| key.date >= today);
        self.unflagged.retain(|key| key.date >= today);
    }
}

pub struct AttendanceEvaluator {
    windows: SlotWindows,
    triggers: AbsentTriggers,
    store: Arc<dyn FlagStore>,
    api: Arc<dyn AttendanceApi>,
    /// Held across check, delivery and flag write.
    ledger: Mutex<Ledger>,
}

impl AttendanceEvaluator {
    pub fn new(
        windows: SlotWindows,
        triggers: AbsentTriggers,
        store: Arc<dyn FlagStore>,
        api: Arc<dyn AttendanceApi>,
    ) -> Self {
        Self {
            windows,
            triggers,
            store,
            api,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    pub fn windows(&self) -> &SlotWindows {
        &self.windows
    }

    pub fn classify_slot(&self, now: NaiveTime) -> Option<Slot> {
        self.windows.classify(now)
    }

    /// False once the slot was resolved either manually or by auto-absent.
    pub async fn can_submit(&self, employee_id: &str, date: NaiveDate, slot: Slot) -> Result<bool, StoreError> {
        let ledger = self.ledger.lock().await;
        Ok(!self.resolved(&ledger, employee_id, date, slot).await?)
    }

    async fn resolved(
        &self,
        ledger: &Ledger,
        employee_id: &str,
        date: NaiveDate,
        slot: Slot,
    ) -> Result<bool, StoreError> {
        for kind in FlagKind::iter() {
            let key = FlagKey::new(kind, employee_id, date, slot);
            if ledger.unflagged.contains(&key) || self.store.get(&key).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    #[instrument(name = "submit_attendance", skip_all, fields(employee_id = %session.employee_id))]
    pub async fn submit_manual(
        &self,
        session: &Session,
        entered_id: &str,
        now: NaiveDateTime,
    ) -> Result<Resolution, AppError> {
        let slot = self
            .classify_slot(now.time())
            .ok_or_else(|| AppError::OutsideWindow(self.windows.describe()))?;

        let mut ledger = self.ledger.lock().await;

        let date = now.date();
        ledger.roll_over(date);
        if self.resolved(&ledger, &session.employee_id, date, slot).await? {
            info!(%slot, "Slot already resolved");
            return Err(AppError::AlreadySubmitted(slot));
        }

        let status = resolve_manual(entered_id, &session.employee_id);
        let record = AttendanceRecord::at(status, now);

        self.deliver(session, &record).await.map_err(|e| {
            error!(error = %e, %slot, "Attendance submission failed");
            AppError::Delivery(e)
        })?;

        self.flag(&mut ledger, FlagKey::new(FlagKind::Submitted, &session.employee_id, date, slot))
            .await;

        info!(%slot, %status, "Attendance recorded");
        Ok(Resolution { slot, record })
    }

    /// Marks a slot absent when `now` hits its trigger instant and the slot
    /// is still unresolved. Ticks outside the trigger windows do nothing.
    pub async fn resolve_auto_absent(
        &self,
        session: &Session,
        now: NaiveDateTime,
    ) -> Result<Vec<AutoAbsent>, AppError> {
        let mut ledger = self.ledger.lock().await;

        let date = now.date();
        ledger.roll_over(date);

        let mut outcomes = Vec::new();
        for slot in Slot::iter() {
            if !self.triggers.fires(slot, now.time()) {
                continue;
            }

            let key = FlagKey::new(FlagKind::Absent, &session.employee_id, date, slot);
            if ledger.attempted.contains(&key) || self.resolved(&ledger, &session.employee_id, date, slot).await? {
                continue;
            }
            ledger.attempted.insert(key.clone());

            let record = AttendanceRecord::at(Status::Absent, now);
            match self.deliver(session, &record).await {
                Ok(()) => {
                    self.flag(&mut ledger, key).await;
                    info!(employee_id = %session.employee_id, %slot, "Marked absent for missed slot");
                    outcomes.push(AutoAbsent::Marked(Resolution { slot, record }));
                }
                Err(e) => {
                    error!(error = %e, employee_id = %session.employee_id, %slot, "Auto-absent failed");
                    outcomes.push(AutoAbsent::Failed(slot));
                }
            }
        }

        Ok(outcomes)
    }

    /// The record is already delivered, so a failed write only costs the
    /// flag's persistence. The slot stays resolved for this process.
    async fn flag(&self, ledger: &mut Ledger, key: FlagKey) {
        if let Err(e) = self.store.set(&key).await {
            error!(error = %e, %key, "Flag write failed");
            ledger.unflagged.insert(key);
        }
    }

    async fn deliver(&self, session: &Session, record: &AttendanceRecord) -> Result<(), RemoteError> {
        let entry = AttendanceEntry {
            employee_id: session.employee_id.clone(),
            name: session.name.clone(),
            record: record.clone(),
        };
        self.api.post_attendance(&entry).await
    }
}
