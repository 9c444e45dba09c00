// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.

use chrono::{FixedOffset, Local, Offset, Utc};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the BeachCheck REST API (no trailing slash needed)
    pub api_base_url: String,
    /// JSON file backing persisted client state
    pub storage_path: PathBuf,
    /// Radius for the nearby-beach feed
    pub search_radius_km: f64,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Offset used for calendar days and reservation hours
    pub local_offset: FixedOffset,
    /// Allow favorites without an account (kept on this device only)
    pub guest_favorites: bool,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            storage_path: PathBuf::from("beachcheck_storage.json"),
            search_radius_km: 50.0,
            request_timeout: Duration::from_secs(15),
            local_offset: kst(),
            guest_favorites: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let local_offset = match env::var("LOCAL_UTC_OFFSET") {
            Ok(raw) => parse_offset(&raw)?,
            Err(_) => Local::now().offset().fix(),
        };

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            storage_path: env::var("STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("beachcheck_storage.json")),
            search_radius_km: env::var("SEARCH_RADIUS_KM")
                .ok()
                .map(|v| {
                    v.parse()
                        .map_err(|_| ConfigError::Invalid("SEARCH_RADIUS_KM", v))
                })
                .transpose()?
                .unwrap_or(50.0),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()
                    .unwrap_or(15),
            ),
            local_offset,
            guest_favorites: env::var("GUEST_FAVORITES")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
        })
    }
}

/// Korea Standard Time (UTC+9), the app's home time zone.
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| Utc.fix())
}

/// Parse an offset like `+09:00`, `-0330` or `Z`.
fn parse_offset(raw: &str) -> Result<FixedOffset, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }

    let invalid = || ConfigError::Invalid("LOCAL_UTC_OFFSET", raw.to_string());
    let (sign, rest) = match trimmed.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("API_BASE_URL", "https://api.beachcheck.test/");
        env::set_var("SEARCH_RADIUS_KM", "25");
        env::set_var("LOCAL_UTC_OFFSET", "+09:00");
        env::set_var("GUEST_FAVORITES", "false");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.api_base_url, "https://api.beachcheck.test");
        assert_eq!(config.search_radius_km, 25.0);
        assert_eq!(config.local_offset, kst());
        assert!(!config.guest_favorites);
        assert_eq!(config.request_timeout, Duration::from_secs(15));

        env::remove_var("API_BASE_URL");
        env::remove_var("SEARCH_RADIUS_KM");
        env::remove_var("LOCAL_UTC_OFFSET");
        env::remove_var("GUEST_FAVORITES");
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("+09:00").unwrap().local_minus_utc(), 9 * 3600);
        assert_eq!(parse_offset("-0330").unwrap().local_minus_utc(), -(3 * 3600 + 1800));
        assert_eq!(parse_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_offset("nine").is_err());
        assert!(parse_offset("+9").is_err());
    }
}
