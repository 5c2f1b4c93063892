use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, Status};
use crate::model::slot::Slot;

/// Login/signup form. `name` is only sent on signup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthForm {
    #[serde(default)]
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@company.com", format = "email")]
    pub email: String,
    #[schema(example = "E1")]
    pub employee_id: String,
    #[schema(example = "secret")]
    pub password: String,
}

impl AuthForm {
    pub fn missing_field(&self, signup: bool) -> Option<&'static str> {
        if signup && self.name.trim().is_empty() {
            return Some("name");
        }
        if self.employee_id.trim().is_empty() {
            return Some("employeeId");
        }
        if self.email.trim().is_empty() {
            return Some("email");
        }
        if self.password.is_empty() {
            return Some("password");
        }
        None
    }
}

/// Identity returned by the remote `/login` and `/signup` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub employee_id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "message": "Logged in!",
    "employeeId": "E1",
    "name": "Ada Lovelace"
}))]
pub struct SessionResponse {
    pub message: String,
    pub employee_id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttendanceReq {
    /// Employee ID typed into the confirmation box
    #[schema(example = "e1")]
    pub employee_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "status": "present",
    "slot": "morning",
    "message": "Attendance marked: Present",
    "record": {"status": "present", "time": "9:10:00 AM", "date": "10/16/2026", "day": "Friday"}
}))]
pub struct SubmitAttendanceResponse {
    pub status: Status,
    pub slot: Slot,
    pub message: String,
    pub record: AttendanceRecord,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    #[schema(example = "E1")]
    pub employee_id: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "9:10:00 AM")]
    pub current_time: String,
    #[schema(example = "10/16/2026")]
    pub date: String,
    #[schema(example = "Friday")]
    pub day: String,
    pub current_slot: Option<Slot>,
    pub has_submitted: bool,
    /// True only inside a window whose slot is not yet resolved
    pub can_submit: bool,
    /// Shown under the disabled submit control
    pub warning: Option<String>,
    pub records: Vec<AttendanceRecord>,
    /// Auto-absent notices since the last view
    pub notices: Vec<String>,
}
