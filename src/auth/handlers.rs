use actix_web::{HttpResponse, web};
use tracing::{info, instrument};

use crate::dashboard::{AuthMode, Dashboard};
use crate::error::AppError;
use crate::models::{AuthForm, SessionResponse};

async fn authenticate(
    mode: AuthMode,
    form: web::Json<AuthForm>,
    dashboard: web::Data<Dashboard>,
) -> Result<HttpResponse, AppError> {
    if let Some(field) = form.missing_field(mode == AuthMode::Signup) {
        info!(field, "Validation failed: missing field");
        return Err(AppError::Validation(format!("{field} is required")));
    }

    let session = dashboard.authenticate(mode, &form).await?;

    let message = match mode {
        AuthMode::Login => "Logged in!",
        AuthMode::Signup => "Signed up!",
    };

    Ok(HttpResponse::Ok().json(SessionResponse {
        message: message.to_string(),
        employee_id: session.employee_id,
        name: session.name,
    }))
}

/// Log in through the remote attendance API
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = AuthForm,
    responses(
        (status = 200, description = "Logged in", body = SessionResponse),
        (status = 400, description = "Missing field or rejected by the attendance API", body = Object, example = json!({
            "error": "Invalid credentials"
        })),
        (status = 429, description = "Too many requests"),
        (status = 502, description = "Attendance API unreachable", body = Object, example = json!({
            "error": "Something went wrong"
        }))
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(form, dashboard), fields(employee_id = %form.employee_id))]
pub async fn login(
    form: web::Json<AuthForm>,
    dashboard: web::Data<Dashboard>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");
    authenticate(AuthMode::Login, form, dashboard).await
}

/// Create an account through the remote attendance API
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = AuthForm,
    responses(
        (status = 200, description = "Signed up", body = SessionResponse),
        (status = 400, description = "Missing field or rejected by the attendance API", body = Object, example = json!({
            "error": "Employee already exists"
        })),
        (status = 429, description = "Too many requests"),
        (status = 502, description = "Attendance API unreachable")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_signup", skip(form, dashboard), fields(employee_id = %form.employee_id))]
pub async fn signup(
    form: web::Json<AuthForm>,
    dashboard: web::Data<Dashboard>,
) -> Result<HttpResponse, AppError> {
    info!("Signup request received");
    authenticate(AuthMode::Signup, form, dashboard).await
}

/// End the current session (idempotent)
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "Auth"
)]
pub async fn logout(dashboard: web::Data<Dashboard>) -> HttpResponse {
    dashboard.logout().await;
    HttpResponse::NoContent().finish()
}
