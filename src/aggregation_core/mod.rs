//! Aggregation Core - Grouped Statistics Engine
//!
//! Answers "AGGREGATION of FIELD grouped BY region/subregion" over the
//! cached country dataset.
//!
//! # Architecture
//!
//! ```text
//! Query (aggregation, field, by) → signature
//!     ↓
//! ResultCache hit? ──yes──→ stored result
//!     ↓ no
//! FieldStrategy (Default | CountPresence | FanOut)
//!     ↓
//! accumulate: group key → Series (value extractor per record)
//!     ↓
//! reduce: Series → GroupResult, rounded to 2 places
//!     ↓
//! ResultCache::put (write-through)
//! ```

pub mod accumulator;
pub mod orchestrator;
pub mod query;
pub mod record;
pub mod reducer;
pub mod strategy;

pub use accumulator::{accumulate, AccumulationResult, Series};
pub use orchestrator::AggregationOrchestrator;
pub use query::{AggregationType, Field, GroupBy, Query};
pub use record::{extract_component, extract_value, Dataset, FieldValue, Record, NULL_GROUP};
pub use reducer::{reduce, reduce_series, AggregationResult, GroupResult, ROUND_DECIMALS};
pub use strategy::FieldStrategy;
