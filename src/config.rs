//! Configuration from environment variables

use std::env;
use std::path::PathBuf;

pub const DEFAULT_CACHE_PATH: &str = "country_data_cache.json";
pub const DEFAULT_DATA_URL: &str = "https://restcountries.com/v2/all";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
/// One day, used when the data API sends no usable `max-age`
pub const DEFAULT_TTL_SECS: u64 = 86_400;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the cache document
    pub cache_path: PathBuf,

    /// Country data endpoint
    pub data_url: String,

    /// Local JSON file used instead of the endpoint when set
    pub sample_data_path: Option<PathBuf>,

    pub fetch_timeout_secs: u64,

    /// Freshness window when the response carries no `max-age`
    pub default_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            data_url: DEFAULT_DATA_URL.to_string(),
            sample_data_path: None,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            default_ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `COUNTRY_CACHE_PATH` (default: country_data_cache.json)
    /// - `COUNTRY_DATA_URL` (default: https://restcountries.com/v2/all)
    /// - `COUNTRY_SAMPLE_DATA` (optional)
    /// - `COUNTRY_FETCH_TIMEOUT_SECS` (default: 15)
    /// - `COUNTRY_DEFAULT_TTL_SECS` (default: 86400)
    pub fn from_env() -> Self {
        Self {
            cache_path: env::var("COUNTRY_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_PATH)),

            data_url: env::var("COUNTRY_DATA_URL")
                .unwrap_or_else(|_| DEFAULT_DATA_URL.to_string()),

            sample_data_path: env::var("COUNTRY_SAMPLE_DATA")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),

            fetch_timeout_secs: env::var("COUNTRY_FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),

            default_ttl_secs: env::var("COUNTRY_DEFAULT_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TTL_SECS),
        }
    }
}
