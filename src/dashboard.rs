use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::attendance::clock::Clock;
use crate::attendance::evaluator::{AttendanceEvaluator, AutoAbsent, Resolution};
use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, Status, format_date, format_day, format_time};
use crate::model::session::Session;
use crate::models::{AuthForm, DashboardView};
use crate::remote::AttendanceApi;

#[derive(Default)]
struct DashboardState {
    session: Option<Session>,
    records: Vec<AttendanceRecord>,
    notices: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

/// The one session this kiosk serves, and what it shows.
pub struct Dashboard {
    evaluator: AttendanceEvaluator,
    api: Arc<dyn AttendanceApi>,
    clock: Arc<dyn Clock>,
    state: RwLock<DashboardState>,
}

impl Dashboard {
    pub fn new(evaluator: AttendanceEvaluator, api: Arc<dyn AttendanceApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            evaluator,
            api,
            clock,
            state: RwLock::new(DashboardState::default()),
        }
    }

    /// Authenticates against the remote API and replaces the current session.
    /// Nothing changes when the remote call fails.
    pub async fn authenticate(&self, mode: AuthMode, form: &AuthForm) -> Result<Session, AppError> {
        let identity = match mode {
            AuthMode::Login => self.api.login(form).await,
            AuthMode::Signup => self.api.signup(form).await,
        }
        .map_err(AppError::from_auth)?;

        let session = Session::new(identity.employee_id, identity.name);

        let records = match self.api.fetch_attendance(&session.employee_id).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, employee_id = %session.employee_id, "Fetch failed");
                Vec::new()
            }
        };

        let mut state = self.state.write().await;
        *state = DashboardState {
            session: Some(session.clone()),
            records,
            notices: Vec::new(),
        };

        info!(employee_id = %session.employee_id, ?mode, "Session started");
        Ok(session)
    }

    pub async fn logout(&self) {
        let mut state = self.state.write().await;
        if let Some(session) = state.session.take() {
            info!(employee_id = %session.employee_id, "Session ended");
        }
        *state = DashboardState::default();
    }

    pub async fn session(&self) -> Option<Session> {
        self.state.read().await.session.clone()
    }

    pub async fn view(&self, session: &Session) -> Result<DashboardView, AppError> {
        let now = self.clock.now();
        let current_slot = self.evaluator.classify_slot(now.time());

        let has_submitted = match current_slot {
            Some(slot) => !self.evaluator.can_submit(&session.employee_id, now.date(), slot).await?,
            None => false,
        };
        let can_submit = current_slot.is_some() && !has_submitted;

        let warning = match (current_slot, can_submit) {
            (_, true) => None,
            (Some(slot), false) => Some(format!("You've already submitted attendance for {slot} slot.")),
            (None, _) => Some(format!("Attendance window is {}.", self.evaluator.windows().describe())),
        };

        let mut state = self.state.write().await;
        let notices = std::mem::take(&mut state.notices);

        Ok(DashboardView {
            employee_id: session.employee_id.clone(),
            name: session.name.clone(),
            current_time: format_time(now),
            date: format_date(now),
            day: format_day(now),
            current_slot,
            has_submitted,
            can_submit,
            warning,
            records: state.records.clone(),
            notices,
        })
    }

    pub async fn submit(&self, session: &Session, entered_id: &str) -> Result<Resolution, AppError> {
        let resolution = self.evaluator.submit_manual(session, entered_id, self.clock.now()).await?;
        self.append(session, resolution.record.clone(), None).await;
        Ok(resolution)
    }

    /// Runs the auto-absent backstop for the signed-in employee, if any.
    pub async fn tick(&self, now: NaiveDateTime) -> Result<(), AppError> {
        let Some(session) = self.session().await else {
            return Ok(());
        };

        for outcome in self.evaluator.resolve_auto_absent(&session, now).await? {
            match outcome {
                AutoAbsent::Marked(Resolution { slot, record }) => {
                    let notice = format!("You were marked absent for not submitting on time ({slot} slot).");
                    self.append(&session, record, Some(notice)).await;
                }
                AutoAbsent::Failed(slot) => {
                    let notice = format!("Could not record automatic absence for the {slot} slot.");
                    self.notify(&session, notice).await;
                }
            }
        }
        Ok(())
    }

    /// Appends only if `session` is still the active one.
    async fn append(&self, session: &Session, record: AttendanceRecord, notice: Option<String>) {
        let mut state = self.state.write().await;
        if state.session.as_ref().map(|s| s.id) != Some(session.id) {
            return;
        }
        state.records.push(record);
        state.notices.extend(notice);
    }

    async fn notify(&self, session: &Session, notice: String) {
        let mut state = self.state.write().await;
        if state.session.as_ref().map(|s| s.id) == Some(session.id) {
            state.notices.push(notice);
        }
    }
}

pub fn submission_message(status: Status) -> &'static str {
    match status {
        Status::Present => "Attendance marked: Present",
        Status::Absent => "Invalid Employee ID. Marked as Absent.",
    }
}

#[cfg(test)]
pub mod testing {
    use std::time::Duration;

    use super::*;
    use crate::attendance::clock::ManualClock;
    use crate::model::slot::{AbsentTriggers, SlotWindows};
    use crate::remote::fake::FakeAttendanceApi;
    use crate::store::MemoryFlagStore;

    pub struct Fixture {
        pub dashboard: Arc<Dashboard>,
        pub api: Arc<FakeAttendanceApi>,
        pub clock: Arc<ManualClock>,
    }

    pub fn fixture(hour: u32, minute: u32) -> Fixture {
        let api = Arc::new(FakeAttendanceApi::default());
        let clock = Arc::new(ManualClock::at(hour, minute));
        let store = Arc::new(MemoryFlagStore::new(Duration::from_secs(3600)));
        let evaluator = AttendanceEvaluator::new(
            SlotWindows::default(),
            AbsentTriggers::default(),
            store,
            api.clone(),
        );
        let dashboard = Arc::new(Dashboard::new(evaluator, api.clone(), clock.clone()));
        Fixture { dashboard, api, clock }
    }

    pub fn login_form(employee_id: &str) -> AuthForm {
        AuthForm {
            name: String::new(),
            email: "ada@company.com".into(),
            employee_id: employee_id.into(),
            password: "secret".into(),
        }
    }
}
