//! Request processing: validate, refresh the dataset when stale, aggregate

use crate::aggregation_core::{AggregationOrchestrator, AggregationResult};
use crate::config::AppConfig;
use crate::datasource::DatasetSource;
use crate::error::ProcessError;
use crate::persistence::ResultCache;
use crate::validation::{validate_aggregation_request, AggregationRequest};

/// Answer one aggregation request against the cache at `config.cache_path`.
///
/// Invalid requests are rejected before the cache or the source are touched.
pub async fn process_aggregation_request(
    request: &AggregationRequest,
    config: &AppConfig,
    source: &dyn DatasetSource,
) -> Result<AggregationResult, ProcessError> {
    let query = validate_aggregation_request(request)?;

    let cache = ResultCache::load(&config.cache_path)?;
    let mut orchestrator = AggregationOrchestrator::new(cache);

    if orchestrator.needs_refresh() {
        log::info!(
            "🔄 Country data missing or expired, refreshing from {} source",
            source.source_type()
        );
        let fetched = source.fetch().await.map_err(|e| {
            log::warn!("Failed to refresh country data: {}", e);
            e
        })?;
        let count = fetched.records.len();
        orchestrator.refresh(fetched.records, fetched.ttl_secs)?;
        log::info!("✅ Cached {} countries for {}s", count, fetched.ttl_secs);
    } else if let Some(expiry) = orchestrator.cache().dataset_expiry() {
        log::debug!("Using cached country data (expires {})", expiry);
    }

    let signature = query.signature();
    let cache_hit = orchestrator.cache().contains(&signature);
    let result = orchestrator.run(&query)?;

    log::info!(
        "📊 {} → {} groups ({})",
        signature,
        result.len(),
        if cache_hit { "cached" } else { "computed" }
    );

    Ok(result.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation_core::GroupResult;
    use crate::datasource::FetchedDataset;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use chrono::{Local, TimeDelta};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::{tempdir, TempDir};

    struct StubSource {
        body: &'static str,
        ttl_secs: u64,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(body: &'static str, ttl_secs: u64) -> Self {
            Self {
                body,
                ttl_secs,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new("[]", 60)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DatasetSource for StubSource {
        async fn fetch(&self) -> Result<FetchedDataset, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::Status(500));
            }
            Ok(FetchedDataset {
                records: serde_json::from_str(self.body)?,
                ttl_secs: self.ttl_secs,
            })
        }

        fn source_type(&self) -> &'static str {
            "stub"
        }
    }

    fn test_config() -> (TempDir, AppConfig) {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            cache_path: dir.path().join("country_data_cache.json"),
            ..AppConfig::default()
        };
        (dir, config)
    }

    fn sum_area_by_region() -> AggregationRequest {
        AggregationRequest::new("sum", "area", "region")
    }

    #[tokio::test]
    async fn test_valid_request_on_empty_dataset() {
        let (_dir, config) = test_config();
        let source = StubSource::new("[]", 86_400);

        let result = process_aggregation_request(&sum_area_by_region(), &config, &source)
            .await
            .unwrap();

        assert!(result.is_empty());
        let cache = ResultCache::load(&config.cache_path).unwrap();
        assert_eq!(cache.get("sum:area:region"), Some(&AggregationResult::new()));
    }

    #[tokio::test]
    async fn test_ttl_from_source_sets_expiry() {
        let (_dir, config) = test_config();
        let source = StubSource::new(r#"[{"area":1,"region":"a"}]"#, 60);

        let before = Local::now().naive_local() - TimeDelta::seconds(1);
        process_aggregation_request(&sum_area_by_region(), &config, &source)
            .await
            .unwrap();
        let after = Local::now().naive_local();

        let expiry = ResultCache::load(&config.cache_path)
            .unwrap()
            .dataset_expiry()
            .unwrap();
        assert!(expiry >= before + TimeDelta::seconds(60));
        assert!(expiry <= after + TimeDelta::seconds(60));
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_fetch() {
        let (_dir, config) = test_config();
        let mut cache = ResultCache::new(&config.cache_path);
        cache
            .replace_dataset(serde_json::from_str(r#"[{"area":7,"region":"b"}]"#).unwrap(), 3600)
            .unwrap();
        let source = StubSource::new(r#"[{"area":1,"region":"a"}]"#, 60);

        let result = process_aggregation_request(&sum_area_by_region(), &config, &source)
            .await
            .unwrap();

        assert_eq!(source.calls(), 0);
        assert_eq!(result.get("b"), Some(&GroupResult::Scalar(7.0)));
    }

    #[tokio::test]
    async fn test_expired_cache_refetches_and_recomputes() {
        let (_dir, config) = test_config();
        let mut cache = ResultCache::new(&config.cache_path);
        cache
            .replace_dataset_at(
                serde_json::from_str(r#"[{"area":7,"region":"b"}]"#).unwrap(),
                60,
                Local::now().naive_local() - TimeDelta::hours(1),
            )
            .unwrap();
        let source = StubSource::new(r#"[{"area":1,"region":"a"}]"#, 60);

        let result = process_aggregation_request(&sum_area_by_region(), &config, &source)
            .await
            .unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(result.get("a"), Some(&GroupResult::Scalar(1.0)));
        assert!(result.get("b").is_none());
    }

    #[tokio::test]
    async fn test_bad_request_touches_nothing() {
        let (_dir, config) = test_config();
        let source = StubSource::new("[]", 60);

        let err = process_aggregation_request(
            &AggregationRequest::new("sum", "countries", "region"),
            &config,
            &source,
        )
        .await
        .unwrap_err();

        let errors: serde_json::Value = serde_json::from_str(&err.to_string()).unwrap();
        assert_eq!(errors, serde_json::json!({"field": ["unallowed value countries"]}));
        assert_eq!(source.calls(), 0);
        assert!(!config.cache_path.exists());
    }

    #[tokio::test]
    async fn test_fetch_failure_message() {
        let (_dir, config) = test_config();

        let err = process_aggregation_request(&sum_area_by_region(), &config, &StubSource::failing())
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessError::Fetch(FetchError::Status(500))));
        assert_eq!(
            err.to_string(),
            "Could not retrieve country data, please try again later."
        );
    }
}
