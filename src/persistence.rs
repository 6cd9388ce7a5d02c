//! Result cache: the country dataset, its expiry and computed results in one JSON file
//!
//! Document layout:
//!
//! ```text
//! {
//!   "country_data": [ {...}, ... ] | null,
//!   "country_data_expiry": "YYYY-MM-DD HH:MM:SS",   (omitted when country_data is null)
//!   "aggregation_request_results": { "sum:area:region": {...}, ... }
//! }
//! ```
//!
//! Every mutation rewrites the whole document before returning.

use crate::aggregation_core::{AggregationResult, Dataset, Record};
use crate::error::{AggregationError, Result};
use chrono::{Local, NaiveDateTime, TimeDelta, Timelike};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Local time, second precision, no zone designator.
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub type ResultMap = IndexMap<String, AggregationResult>;

/// Dataset together with the moment it stops being fresh
#[derive(Debug, Clone, PartialEq)]
struct DatasetSnapshot {
    records: Dataset,
    expiry: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
struct CacheDocument {
    #[serde(default)]
    country_data: Option<Dataset>,
    #[serde(default, with = "expiry_format")]
    country_data_expiry: Option<NaiveDateTime>,
    #[serde(default)]
    aggregation_request_results: Option<ResultMap>,
}

#[derive(Debug, Serialize)]
struct CacheDocumentRef<'a> {
    country_data: Option<&'a Dataset>,
    #[serde(skip_serializing_if = "Option::is_none", with = "expiry_format")]
    country_data_expiry: Option<NaiveDateTime>,
    aggregation_request_results: &'a ResultMap,
}

mod expiry_format {
    use super::EXPIRY_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        expiry: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match expiry {
            Some(expiry) => serializer.collect_str(&expiry.format(EXPIRY_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| {
                NaiveDateTime::parse_from_str(&text, EXPIRY_FORMAT).map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}

/// Write-through cache backed by a single JSON document.
#[derive(Debug)]
pub struct ResultCache {
    path: PathBuf,
    snapshot: Option<DatasetSnapshot>,
    results: ResultMap,
}

impl ResultCache {
    /// Empty cache bound to `path`; nothing is read or written yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: None,
            results: ResultMap::new(),
        }
    }

    /// Read the cache document at `path`, or start empty when the file does not exist
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self::new(path));
        }

        let json = fs::read_to_string(&path).map_err(|e| {
            AggregationError::Persistence(format!("cannot read {}: {}", path.display(), e))
        })?;
        let document: CacheDocument = serde_json::from_str(&json)
            .map_err(|e| AggregationError::CacheCorruption(format!("{}: {}", path.display(), e)))?;

        let snapshot = match (document.country_data, document.country_data_expiry) {
            (Some(records), Some(expiry)) => Some(DatasetSnapshot { records, expiry }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(AggregationError::CacheCorruption(
                    "country_data present without country_data_expiry".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(AggregationError::CacheCorruption(
                    "country_data_expiry present without country_data".to_string(),
                ))
            }
        };

        Ok(Self {
            path,
            snapshot,
            results: document.aggregation_request_results.unwrap_or_default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dataset(&self) -> Option<&[Record]> {
        self.snapshot.as_ref().map(|s| s.records.as_slice())
    }

    pub fn dataset_expiry(&self) -> Option<NaiveDateTime> {
        self.snapshot.as_ref().map(|s| s.expiry)
    }

    pub fn results(&self) -> &ResultMap {
        &self.results
    }

    pub fn get(&self, signature: &str) -> Option<&AggregationResult> {
        self.results.get(signature)
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.results.contains_key(signature)
    }

    /// Store a computed result and persist; returns the stored value
    ///
    /// A failed write leaves the in-memory results as they were.
    pub fn put(&mut self, signature: String, result: AggregationResult) -> Result<&AggregationResult> {
        let (index, previous) = self.results.insert_full(signature, result);
        if let Err(e) = self.persist() {
            match previous {
                Some(previous) => self.results[index] = previous,
                None => {
                    self.results.pop();
                }
            }
            return Err(e);
        }
        Ok(&self.results[index])
    }

    /// Swap in a fresh dataset valid for `ttl_secs` and drop every cached result
    pub fn replace_dataset(&mut self, dataset: Dataset, ttl_secs: u64) -> Result<()> {
        self.replace_dataset_at(dataset, ttl_secs, Local::now().naive_local())
    }

    pub fn replace_dataset_at(
        &mut self,
        dataset: Dataset,
        ttl_secs: u64,
        now: NaiveDateTime,
    ) -> Result<()> {
        // Stored expiry only keeps whole seconds.
        let now = now.with_nanosecond(0).unwrap_or(now);
        let expiry = i64::try_from(ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(NaiveDateTime::MAX);

        let snapshot = DatasetSnapshot {
            records: dataset,
            expiry,
        };
        self.write_document(Some(&snapshot), &ResultMap::new())?;

        self.snapshot = Some(snapshot);
        self.results.clear();
        Ok(())
    }

    /// True when there is no dataset or it has expired
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Local::now().naive_local())
    }

    pub fn is_stale_at(&self, now: NaiveDateTime) -> bool {
        match &self.snapshot {
            Some(snapshot) => now >= snapshot.expiry,
            None => true,
        }
    }

    /// Rewrite the whole document
    pub fn persist(&self) -> Result<()> {
        self.write_document(self.snapshot.as_ref(), &self.results)
    }

    fn write_document(&self, snapshot: Option<&DatasetSnapshot>, results: &ResultMap) -> Result<()> {
        let document = CacheDocumentRef {
            country_data: snapshot.map(|s| &s.records),
            country_data_expiry: snapshot.map(|s| s.expiry),
            aggregation_request_results: results,
        };

        let json = serde_json::to_string(&document)
            .map_err(|e| AggregationError::Persistence(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| {
            AggregationError::Persistence(format!("cannot write {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }
}
