use std::env;

use crate::error::AppError;

pub const DEFAULT_BASELINE_ETA_MINUTES: f64 = 30.0;
pub const DEFAULT_TRAVEL_MINUTES_PER_KM: f64 = 2.0;
pub const DEFAULT_RESULT_LIMIT: usize = 5;

/// Tunables for the ranking and validation path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatorSettings {
    pub baseline_eta_minutes: f64,
    pub travel_minutes_per_km: f64,
    pub default_limit: usize,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            baseline_eta_minutes: DEFAULT_BASELINE_ETA_MINUTES,
            travel_minutes_per_km: DEFAULT_TRAVEL_MINUTES_PER_KM,
            default_limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_json: bool,
    pub locator: LocatorSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let locator = LocatorSettings {
            baseline_eta_minutes: parse_or_default(
                "DEFAULT_BASELINE_ETA_MINUTES",
                DEFAULT_BASELINE_ETA_MINUTES,
            )?,
            travel_minutes_per_km: parse_or_default(
                "TRAVEL_MINUTES_PER_KM",
                DEFAULT_TRAVEL_MINUTES_PER_KM,
            )?,
            default_limit: parse_or_default("DEFAULT_RESULT_LIMIT", DEFAULT_RESULT_LIMIT)?,
        };

        if locator.default_limit == 0 {
            return Err(AppError::Internal(
                "invalid DEFAULT_RESULT_LIMIT: must be > 0".to_string(),
            ));
        }

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")),
            locator,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
