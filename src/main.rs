use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use tokio_util::sync::CancellationToken;

mod api;
mod attendance;
mod auth;
mod config;
mod dashboard;
mod docs;
mod error;
mod model;
mod models;
mod remote;
mod routes;
mod store;

use attendance::{AttendanceEvaluator, AutoAbsentScheduler, Clock, SystemClock};
use config::Config;
use dashboard::Dashboard;
use remote::{AttendanceApi, HttpAttendanceApi};
use routes::Limiters;
use store::{FileFlagStore, FlagStore, MemoryFlagStore};

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance kiosk is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "attendance.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Attendance kiosk starting...");

    for slot in config.absent_triggers.premature(&config.windows) {
        warn!(
            %slot,
            trigger = %config.absent_triggers.at(slot),
            "Auto-absent trigger falls inside the submission window; check configuration"
        );
    }

    let store: Arc<dyn FlagStore> = match &config.flag_store_path {
        Some(path) => Arc::new(
            FileFlagStore::open(path)
                .await
                .with_context(|| format!("opening flag store {}", path.display()))?,
        ),
        None => Arc::new(MemoryFlagStore::new(config.flag_retention())),
    };

    let api: Arc<dyn AttendanceApi> = Arc::new(
        HttpAttendanceApi::new(&config.api_base_url, config.api_timeout)
            .context("building attendance API client")?,
    );
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let evaluator = AttendanceEvaluator::new(
        config.windows.clone(),
        config.absent_triggers.clone(),
        store.clone(),
        api.clone(),
    );
    let dashboard = Arc::new(Dashboard::new(evaluator, api, clock.clone()));

    // Auto-absent backstop and daily flag purge
    let shutdown = CancellationToken::new();
    let scheduler = AutoAbsentScheduler::new(
        dashboard.clone(),
        store,
        clock,
        config.tick_interval,
        config.flag_retention_days,
    );
    let ticker = actix_web::rt::spawn(scheduler.run(shutdown.clone()));

    let limiters = Limiters::from_config(&config)?;
    let server_addr = config.server_addr.clone();
    let dashboard_data = Data::from(dashboard);

    info!(addr = %server_addr, api = %config.api_base_url, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(dashboard_data.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config, &limiters))
    })
    .bind(server_addr)?
    .run()
    .await?;

    shutdown.cancel();
    if let Err(e) = ticker.await {
        warn!(error = %e, "Scheduler task ended abnormally");
    }

    info!("Attendance kiosk stopped");
    Ok(())
}
