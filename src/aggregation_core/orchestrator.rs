//! Aggregation orchestrator: result cache lookup, then accumulate → reduce → store

use super::accumulator::accumulate;
use super::query::Query;
use super::record::Dataset;
use super::reducer::{reduce, AggregationResult};
use crate::error::{AggregationError, Result};
use crate::persistence::ResultCache;

pub struct AggregationOrchestrator {
    cache: ResultCache,
}

impl AggregationOrchestrator {
    pub fn new(cache: ResultCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn needs_refresh(&self) -> bool {
        self.cache.is_stale()
    }

    /// Replace the dataset; every cached result is dropped with it
    pub fn refresh(&mut self, dataset: Dataset, ttl_secs: u64) -> Result<()> {
        self.cache.replace_dataset(dataset, ttl_secs)
    }

    /// Answer `query`, from the cache when this exact query was answered before.
    ///
    /// Cached results are returned as stored, without recomputation.
    pub fn run(&mut self, query: &Query) -> Result<&AggregationResult> {
        let signature = query.signature();

        if !self.cache.contains(&signature) {
            let result = self.compute(query)?;
            return self.cache.put(signature, result);
        }

        Ok(&self.cache.results()[signature.as_str()])
    }

    fn compute(&self, query: &Query) -> Result<AggregationResult> {
        let dataset = self.cache.dataset().ok_or(AggregationError::MissingDataset)?;
        let groups = accumulate(dataset, query.field, query.by)?;
        reduce(&groups, query.aggregation)
    }
}
