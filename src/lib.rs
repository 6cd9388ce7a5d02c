//! Grouped statistics over a cached country dataset.
//!
//! ```text
//! AggregationRequest → validation → Query
//!     ↓
//! ResultCache (country data + expiry + results, one JSON file)
//!     ↓ stale? DatasetSource::fetch → replace_dataset
//! AggregationOrchestrator::run → AggregationResult
//! ```

pub mod aggregation_core;
pub mod config;
pub mod datasource;
pub mod error;
pub mod persistence;
pub mod processor;
pub mod validation;

pub use aggregation_core::{
    AggregationOrchestrator, AggregationResult, AggregationType, Dataset, Field, GroupBy,
    GroupResult, Query, Record,
};
pub use config::AppConfig;
pub use datasource::{DatasetSource, FetchedDataset, FileDatasetSource, HttpDatasetSource};
pub use error::{AggregationError, FetchError, ProcessError};
pub use persistence::ResultCache;
pub use processor::process_aggregation_request;
pub use validation::{validate_aggregation_request, AggregationRequest, ValidationErrors};
