use std::env;
use std::str::FromStr;

use chrono_tz::Tz;
use dotenvy::dotenv;
use strum_macros::{Display, EnumString};
use thiserror::Error;
use tracing::Level;

use crate::engine::groups::{DEFAULT_SESSION_GROUPS, SessionGroups};
use crate::engine::window::{DEFAULT_WINDOWS, WindowSchedule};
use crate::engine::EngineSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing the environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for the environment variable {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Which attendance surface this deployment exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceMode {
    /// Check-ins gated by daily time windows
    Window,
    /// One mark per session group per day
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    Mysql,
    Memory,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub api_prefix: String,
    pub mode: AttendanceMode,

    // Attendance rules
    pub timezone: Tz,
    pub windows: WindowSchedule,
    pub session_groups: SessionGroups,

    pub static_dir: String,
    pub log_dir: String,
    pub log_level: Level,

    // Rate limiting
    pub rate_checkin_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_query_per_min: u32,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var_or(name, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name, e.to_string()))
}

fn parse_rate(name: &'static str, default: &str) -> Result<u32, ConfigError> {
    match parse_var::<u32>(name, default)? {
        0 => Err(ConfigError::InvalidValue(name, "must be at least 1".into())),
        rate => Ok(rate),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let store_backend: StoreBackend = parse_var("STORE_BACKEND", "mysql")?;
        let database_url = env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty());
        if store_backend == StoreBackend::Mysql && database_url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL"));
        }

        let windows = WindowSchedule::parse(&var_or("ATTENDANCE_WINDOWS", DEFAULT_WINDOWS))
            .map_err(|e| ConfigError::InvalidValue("ATTENDANCE_WINDOWS", e.to_string()))?;
        let session_groups = SessionGroups::parse(&var_or("SESSION_GROUPS", DEFAULT_SESSION_GROUPS))
            .map_err(|e| ConfigError::InvalidValue("SESSION_GROUPS", e.to_string()))?;

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "0.0.0.0:3000"),
            store_backend,
            database_url,
            api_prefix: var_or("API_PREFIX", "/api"),
            mode: parse_var("ATTENDANCE_MODE", "window")?,

            timezone: parse_var("TIMEZONE", "Africa/Lagos")?,
            windows,
            session_groups,

            static_dir: var_or("STATIC_DIR", "frontend/dist"),
            log_dir: var_or("LOG_DIR", "logs"),
            log_level: parse_var("LOG_LEVEL", "info")?,

            rate_checkin_per_min: parse_rate("RATE_CHECKIN_PER_MIN", "60")?,
            rate_register_per_min: parse_rate("RATE_REGISTER_PER_MIN", "30")?,
            rate_query_per_min: parse_rate("RATE_QUERY_PER_MIN", "1000")?,
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            timezone: self.timezone,
            windows: self.windows.clone(),
            groups: self.session_groups.clone(),
        }
    }
}
