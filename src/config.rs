//! Application configuration parsed from environment variables.
//!
//! `main` loads `.env` (if present) through `dotenvy` before calling
//! [`AppConfig::from_env`]. Numeric knobs fall back to their defaults when
//! absent or unparseable; values with a closed domain (region code, tick
//! interval) are validated and rejected with a [`ConfigError`].

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TMDB_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_GEO_PRIMARY_URL: &str = "https://ipapi.co/json/";
pub const DEFAULT_GEO_SECONDARY_URL: &str = "https://ipwho.is/";
pub const DEFAULT_REGION: &str = "US";
pub const DEFAULT_THEME_TICK_SECS: u64 = 60;
pub const DEFAULT_SUGGEST_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_STORE_PATH: &str = "data/cinescope.json";
pub const DEFAULT_HTTP_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        "E_CONFIG_INVALID"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmdbConfig {
    /// `None` disables every catalog call (each fails with `MissingApiKey`).
    pub api_key: Option<String>,
    pub base_url: String,
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoConfig {
    pub primary_url: String,
    pub primary_api_key: Option<String>,
    pub secondary_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub tmdb: TmdbConfig,
    pub geo: GeoConfig,
    pub default_region: String,
    pub theme_tick_secs: u64,
    pub suggest_debounce_ms: u64,
    pub store_path: PathBuf,
    pub timeouts: HttpTimeouts,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `TMDB_API_KEY`: catalog calls fail without it
    /// - `TMDB_BASE_URL`, `TMDB_CACHE_TTL_SECS`
    /// - `GEO_PRIMARY_URL`, `GEO_PRIMARY_API_KEY`, `GEO_SECONDARY_URL`
    /// - `DEFAULT_REGION`: 2-letter code, default `US`
    /// - `THEME_TICK_SECS`: auto theme recompute interval, default 60
    /// - `SUGGEST_DEBOUNCE_MS`: default 300
    /// - `STORE_PATH`: key-value store file, default `data/cinescope.json`
    /// - `HTTP_REQUEST_TIMEOUT_SECS`, `HTTP_CONNECT_TIMEOUT_SECS`
    ///
    /// # Errors
    ///
    /// Returns an error if `DEFAULT_REGION` is not a 2-letter code or
    /// `THEME_TICK_SECS` is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_or = |key: &str, default: u64| -> u64 {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = lookup("PORT")
            .and_then(|v| v.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let tmdb = TmdbConfig {
            api_key: non_empty("TMDB_API_KEY"),
            base_url: non_empty("TMDB_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            cache_ttl_secs: parse_or("TMDB_CACHE_TTL_SECS", DEFAULT_TMDB_CACHE_TTL_SECS),
        };

        let geo = GeoConfig {
            primary_url: non_empty("GEO_PRIMARY_URL").unwrap_or_else(|| DEFAULT_GEO_PRIMARY_URL.to_string()),
            primary_api_key: non_empty("GEO_PRIMARY_API_KEY"),
            secondary_url: non_empty("GEO_SECONDARY_URL").unwrap_or_else(|| DEFAULT_GEO_SECONDARY_URL.to_string()),
        };

        let default_region = parse_region(non_empty("DEFAULT_REGION").as_deref())?;

        let theme_tick_secs = parse_or("THEME_TICK_SECS", DEFAULT_THEME_TICK_SECS);
        if theme_tick_secs == 0 {
            return Err(ConfigError::Invalid { var: "THEME_TICK_SECS", reason: "must be greater than zero".into() });
        }

        let store_path = non_empty("STORE_PATH").map_or_else(|| PathBuf::from(DEFAULT_STORE_PATH), PathBuf::from);

        let timeouts = HttpTimeouts {
            request_secs: parse_or("HTTP_REQUEST_TIMEOUT_SECS", DEFAULT_HTTP_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_or("HTTP_CONNECT_TIMEOUT_SECS", DEFAULT_HTTP_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self {
            port,
            tmdb,
            geo,
            default_region,
            theme_tick_secs,
            suggest_debounce_ms: parse_or("SUGGEST_DEBOUNCE_MS", DEFAULT_SUGGEST_DEBOUNCE_MS),
            store_path,
            timeouts,
        })
    }
}

fn parse_region(raw: Option<&str>) -> Result<String, ConfigError> {
    let raw = raw.unwrap_or(DEFAULT_REGION).trim();
    crate::region::normalize_region_code(raw).ok_or_else(|| ConfigError::Invalid {
        var: "DEFAULT_REGION",
        reason: format!("expected a 2-letter country code, got '{raw}'"),
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
