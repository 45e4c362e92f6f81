use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::AppError;

pub const DEFAULT_STORAGE_KEY: &str = "myworkshop_todos_v1";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 64 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub storage_key: String,
    pub require_future_due_dates: bool,
    /// Largest attachment kept; bigger files are dropped from the form.
    pub max_upload_bytes: usize,
    /// Hard cap on a whole request body.
    pub max_request_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://todo-workshop.db".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            require_future_due_dates: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment, falling back to
    /// the defaults for anything unset.
    pub fn new_from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        let storage_key = env::var("TODO_STORAGE_KEY").unwrap_or(defaults.storage_key);
        if storage_key.trim().is_empty() {
            return Err(AppError::Config("TODO_STORAGE_KEY must not be empty".to_string()));
        }

        Ok(Self {
            database_url,
            bind_addr: parse_var("BIND_ADDR", defaults.bind_addr)?,
            storage_key,
            require_future_due_dates: parse_flag(
                "REQUIRE_FUTURE_DUE_DATES",
                defaults.require_future_due_dates,
            )?,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            max_request_bytes: parse_var("MAX_REQUEST_BYTES", defaults.max_request_bytes)?,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

fn parse_flag(name: &str, default: bool) -> Result<bool, AppError> {
    match env::var(name) {
        Ok(raw) => parse_bool(&raw)
            .ok_or_else(|| AppError::Config(format!("{} must be a boolean, got: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
