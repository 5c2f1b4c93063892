use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures::future::LocalBoxFuture;

use crate::dashboard::Dashboard;
use crate::error::AppError;
use crate::model::session::Session;

/// The signed-in employee; rejects the request with 401 when nobody is.
pub struct SessionUser(pub Session);

impl FromRequest for SessionUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let dashboard = req.app_data::<Data<Dashboard>>().cloned();

        Box::pin(async move {
            let dashboard = dashboard
                .ok_or_else(|| actix_web::error::ErrorInternalServerError("Dashboard missing"))?;

            match dashboard.session().await {
                Some(session) => Ok(SessionUser(session)),
                None => Err(AppError::NotLoggedIn.into()),
            }
        })
    }
}
