use actix_web::{HttpResponse, web};

use crate::auth::session::SessionUser;
use crate::dashboard::{Dashboard, submission_message};
use crate::error::AppError;
use crate::models::{DashboardView, SubmitAttendanceReq, SubmitAttendanceResponse};

/// Dashboard endpoint
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Current time, slot state and status entries", body = DashboardView),
        (status = 401, description = "Not logged in", body = Object, example = json!({
            "error": "Not logged in"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn dashboard(
    user: SessionUser,
    dashboard: web::Data<Dashboard>,
) -> Result<HttpResponse, AppError> {
    let view = dashboard.view(&user.0).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Submit attendance for the current slot
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = SubmitAttendanceReq,
    responses(
        (status = 200, description = "Slot resolved as present or absent", body = SubmitAttendanceResponse),
        (status = 400, description = "Outside both attendance windows", body = Object, example = json!({
            "error": "Attendance can only be marked between 9:00–9:50 AM or 5:00–5:45 PM."
        })),
        (status = 401, description = "Not logged in"),
        (status = 409, description = "Slot already resolved today", body = Object, example = json!({
            "error": "You have already submitted attendance for the morning slot."
        })),
        (status = 502, description = "Attendance API did not accept the record", body = Object, example = json!({
            "error": "Error submitting attendance."
        }))
    ),
    tag = "Attendance"
)]
pub async fn submit(
    user: SessionUser,
    body: web::Json<SubmitAttendanceReq>,
    dashboard: web::Data<Dashboard>,
) -> Result<HttpResponse, AppError> {
    let resolution = dashboard.submit(&user.0, &body.employee_id).await?;
    let status = resolution.record.status;

    Ok(HttpResponse::Ok().json(SubmitAttendanceResponse {
        status,
        slot: resolution.slot,
        message: submission_message(status).to_string(),
        record: resolution.record,
    }))
}
