use crate::model::attendance::{AttendanceRecord, Status};
use crate::model::slot::Slot;
use crate::models::{
    AuthForm, DashboardView, SessionResponse, SubmitAttendanceReq, SubmitAttendanceResponse,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Kiosk API",
        version = "0.1.0",
        description = r#"
## Attendance Kiosk

Local API behind a single-employee attendance check-in screen.

### Flow
- **Login / Sign up** against the remote attendance API
- **Dashboard** shows the current time, the active slot and the status history
- **Submit** the employee ID once per slot:
  - morning window 9:00–9:50 AM, evening window 5:00–5:45 PM (configurable)
  - a matching ID records **present**, anything else **absent**
- Slots left unsubmitted are marked **absent** automatically once their window closes

### Errors
Every error body has the shape `{"error": "<message>"}`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::signup,
        crate::auth::handlers::logout,

        crate::api::attendance::dashboard,
        crate::api::attendance::submit,
    ),
    components(
        schemas(
            AuthForm,
            SessionResponse,
            DashboardView,
            SubmitAttendanceReq,
            SubmitAttendanceResponse,
            AttendanceRecord,
            Status,
            Slot
        )
    ),
    tags(
        (name = "Auth", description = "Session APIs"),
        (name = "Attendance", description = "Attendance check-in APIs"),
    )
)]
pub struct ApiDoc;
