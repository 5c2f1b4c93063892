use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::model::slot::Slot;
use crate::remote::RemoteError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Message returned by the remote API, shown verbatim
    #[error("{0}")]
    Remote(String),

    #[error("Something went wrong")]
    Unavailable(#[source] RemoteError),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Attendance can only be marked between {0}.")]
    OutsideWindow(String),

    #[error("You have already submitted attendance for the {0} slot.")]
    AlreadySubmitted(Slot),

    #[error("Error submitting attendance.")]
    Delivery(#[source] RemoteError),

    #[error("Internal Server Error")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Validation(String),
}

impl AppError {
    /// Login/signup failures keep the remote message when there is one.
    pub fn from_auth(err: RemoteError) -> Self {
        match err {
            RemoteError::Rejected(message) => AppError::Remote(message),
            other => AppError::Unavailable(other),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Remote(_) | AppError::OutsideWindow(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotLoggedIn => StatusCode::UNAUTHORIZED,
            AppError::AlreadySubmitted(_) => StatusCode::CONFLICT,
            AppError::Unavailable(_) | AppError::Delivery(_) => StatusCode::BAD_GATEWAY,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string()
        }))
    }
}
