//! Country data sources
//!
//! The dataset is refreshed from the data API over HTTP, or from a local JSON
//! file for offline runs. Either way the caller receives the parsed records and
//! the number of seconds they stay fresh.
//!
//! ## Freshness
//!
//! The HTTP source honours `Cache-Control: max-age=N`. Without a usable
//! directive the configured default applies (one day unless overridden).

use crate::aggregation_core::Dataset;
use crate::config::AppConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use std::path::PathBuf;
use std::time::Duration;

/// Records plus their freshness window
#[derive(Debug, Clone)]
pub struct FetchedDataset {
    pub records: Dataset,
    pub ttl_secs: u64,
}

/// Source of the raw country dataset
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn fetch(&self) -> Result<FetchedDataset, FetchError>;

    /// Get source type for logging
    fn source_type(&self) -> &'static str;
}

/// Fetches the dataset with a plain GET.
pub struct HttpDatasetSource {
    client: reqwest::Client,
    url: String,
    default_ttl_secs: u64,
}

impl HttpDatasetSource {
    pub fn new(url: impl Into<String>, timeout: Duration, default_ttl_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
            default_ttl_secs,
        })
    }
}

#[async_trait]
impl DatasetSource for HttpDatasetSource {
    async fn fetch(&self) -> Result<FetchedDataset, FetchError> {
        log::info!("🌍 Fetching country data from {}", self.url);

        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            log::warn!("Country data API error: {}", response.status());
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let cache_control = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let ttl_secs = parse_max_age(cache_control.as_deref(), self.default_ttl_secs);

        let body = response.text().await?;
        let records: Dataset = serde_json::from_str(&body)?;

        log::debug!(
            "Fetched {} countries (Cache-Control: {:?}, ttl {}s)",
            records.len(),
            cache_control,
            ttl_secs
        );

        Ok(FetchedDataset { records, ttl_secs })
    }

    fn source_type(&self) -> &'static str {
        "HTTP"
    }
}

/// Reads the dataset from a local JSON array.
pub struct FileDatasetSource {
    path: PathBuf,
    ttl_secs: u64,
}

impl FileDatasetSource {
    pub fn new(path: impl Into<PathBuf>, ttl_secs: u64) -> Self {
        Self {
            path: path.into(),
            ttl_secs,
        }
    }
}

#[async_trait]
impl DatasetSource for FileDatasetSource {
    async fn fetch(&self) -> Result<FetchedDataset, FetchError> {
        log::info!("📂 Reading country data from {}", self.path.display());

        let json = tokio::fs::read_to_string(&self.path).await?;
        let records: Dataset = serde_json::from_str(&json)?;

        Ok(FetchedDataset {
            records,
            ttl_secs: self.ttl_secs,
        })
    }

    fn source_type(&self) -> &'static str {
        "file"
    }
}

/// Pick the source the configuration asks for: the sample file when set, HTTP otherwise
pub fn source_from_config(config: &AppConfig) -> Result<Box<dyn DatasetSource>, FetchError> {
    match &config.sample_data_path {
        Some(path) => Ok(Box::new(FileDatasetSource::new(path.clone(), config.default_ttl_secs))),
        None => Ok(Box::new(HttpDatasetSource::new(
            config.data_url.clone(),
            Duration::from_secs(config.fetch_timeout_secs),
            config.default_ttl_secs,
        )?)),
    }
}

/// Seconds from the last valid `max-age=N` directive, else `default_secs`
pub fn parse_max_age(cache_control: Option<&str>, default_secs: u64) -> u64 {
    cache_control
        .into_iter()
        .flat_map(|header| header.split(','))
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .filter_map(|value| value.trim().parse::<u64>().ok())
        .last()
        .unwrap_or(default_secs)
}
