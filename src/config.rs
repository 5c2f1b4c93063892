use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use dotenvy::dotenv;

use crate::model::slot::{AbsentTriggers, SlotWindow, SlotWindows, parse_clock};

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub api_base_url: String,
    pub api_timeout: Duration,
    pub api_prefix: String,

    // Attendance rules
    pub windows: SlotWindows,
    pub absent_triggers: AbsentTriggers,
    pub tick_interval: Duration,

    // Flag store
    pub flag_store_path: Option<PathBuf>,
    pub flag_retention_days: u64,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_signup_per_min: u32,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let morning: SlotWindow = parse(&var("MORNING_WINDOW", "09:00-09:51"), "MORNING_WINDOW")?;
        let evening: SlotWindow = parse(&var("EVENING_WINDOW", "17:00-17:46"), "EVENING_WINDOW")?;
        let windows = SlotWindows::new(morning, evening).map_err(|e| anyhow!(e))?;

        let tick_secs: u64 = parse(&var("TICK_INTERVAL_SECS", "1"), "TICK_INTERVAL_SECS")?;
        if tick_secs == 0 {
            bail!("TICK_INTERVAL_SECS must be at least 1");
        }

        let absent_triggers = AbsentTriggers {
            morning: parse_clock(&var("MORNING_ABSENT_AT", "09:51"))
                .map_err(|e| anyhow!(e))
                .context("MORNING_ABSENT_AT")?,
            evening: parse_clock(&var("EVENING_ABSENT_AT", "17:46"))
                .map_err(|e| anyhow!(e))
                .context("EVENING_ABSENT_AT")?,
            // every trigger minute must see at least one tick
            grace: chrono::Duration::seconds(tick_secs.max(60) as i64),
        };

        let flag_retention_days: u64 = parse(&var("FLAG_RETENTION_DAYS", "7"), "FLAG_RETENTION_DAYS")?;
        if flag_retention_days == 0 {
            bail!("FLAG_RETENTION_DAYS must be at least 1");
        }

        let rate_login_per_min: u32 = parse(&var("RATE_LOGIN_PER_MIN", "60"), "RATE_LOGIN_PER_MIN")?;
        let rate_signup_per_min: u32 = parse(&var("RATE_SIGNUP_PER_MIN", "30"), "RATE_SIGNUP_PER_MIN")?;
        if rate_login_per_min == 0 || rate_signup_per_min == 0 {
            bail!("RATE_LOGIN_PER_MIN and RATE_SIGNUP_PER_MIN must be at least 1");
        }

        Ok(Self {
            server_addr: var("SERVER_ADDR", "127.0.0.1:8080"),
            api_base_url: var("API_BASE_URL", "http://localhost:5000"),
            api_timeout: Duration::from_secs(parse(&var("API_TIMEOUT_SECS", "10"), "API_TIMEOUT_SECS")?),
            api_prefix: var("API_PREFIX", "/api"),

            windows,
            absent_triggers,
            tick_interval: Duration::from_secs(tick_secs),

            flag_store_path: get("FLAG_STORE_PATH").filter(|p| !p.trim().is_empty()).map(PathBuf::from),
            flag_retention_days,

            rate_login_per_min,
            rate_signup_per_min,

            log_dir: var("LOG_DIR", "logs"),
            log_level: parse(&var("LOG_LEVEL", "debug"), "LOG_LEVEL")?,
        })
    }

    pub fn flag_retention(&self) -> Duration {
        Duration::from_secs(self.flag_retention_days * 24 * 60 * 60)
    }
}

fn parse<T>(value: &str, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| anyhow!("{key}: invalid value {value:?}: {e}"))
}
