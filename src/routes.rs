use crate::{api::attendance, auth::handlers, config::Config};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::{Result, anyhow};
use std::sync::Arc;

type Limiter = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-route rate limits for the auth endpoints.
#[derive(Clone)]
pub struct Limiters {
    login: Arc<Limiter>,
    signup: Arc<Limiter>,
}

impl Limiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            login: Arc::new(build_limiter(config.rate_login_per_min)?),
            signup: Arc::new(build_limiter(config.rate_signup_per_min)?),
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    if requests_per_min == 0 {
        return Err(anyhow!("rate limit must be at least 1 per minute"));
    }
    GovernorConfigBuilder::default()
        .per_millisecond((60_000 / requests_per_min as u64).max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} per minute"))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &Limiters) {
    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&*limiters.login))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/signup")
                    .wrap(Governor::new(&*limiters.signup))
                    .route(web::post().to(handlers::signup)),
            )
            .service(web::resource("/logout").route(web::post().to(handlers::logout))),
    );

    // Session routes, guarded by the SessionUser extractor
    cfg.service(
        web::scope(&config.api_prefix)
            .service(web::resource("/dashboard").route(web::get().to(attendance::dashboard)))
            .service(web::resource("/attendance").route(web::post().to(attendance::submit))),
    );
}
