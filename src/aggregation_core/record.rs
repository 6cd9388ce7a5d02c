//! Country records and per-record value extraction

use super::query::GroupBy;
use crate::error::{AggregationError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Group key used when a record has no usable grouping value.
pub const NULL_GROUP: &str = "null";

/// One country as delivered by the data API.
///
/// Kept as the raw JSON object so the cache document reproduces it exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

pub type Dataset = Vec<Record>;

/// Shape of a single field inside a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Missing, `null` or an empty string
    Absent,
    Scalar(&'a Value),
    List(&'a [Value]),
}

impl Record {
    /// Parse a record from a JSON object
    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn field(&self, name: &str) -> FieldValue<'_> {
        match self.0.get(name) {
            None | Some(Value::Null) => FieldValue::Absent,
            Some(Value::String(s)) if s.is_empty() => FieldValue::Absent,
            Some(Value::Array(items)) => FieldValue::List(items),
            Some(value) => FieldValue::Scalar(value),
        }
    }

    /// Normalized group key for this record.
    ///
    /// Anything but a non-empty string lands in [`NULL_GROUP`].
    pub fn group_key(&self, by: GroupBy) -> &str {
        match self.0.get(by.as_str()) {
            Some(Value::String(s)) if !s.is_empty() => s.as_str(),
            _ => NULL_GROUP,
        }
    }
}

/// Default contribution of `record` for `field`.
///
/// Lists count as their length, absent values as zero, scalars must be numeric.
pub fn extract_value(record: &Record, field: &str) -> Result<f64> {
    match record.field(field) {
        FieldValue::Absent => Ok(0.0),
        FieldValue::List(items) => Ok(items.len() as f64),
        FieldValue::Scalar(value) => numeric(field, value),
    }
}

/// Element `index` of a list-valued field, zero when absent or out of range.
pub fn extract_component(record: &Record, field: &str, index: usize) -> Result<f64> {
    match record.field(field) {
        FieldValue::Absent => Ok(0.0),
        FieldValue::List(items) => match items.get(index) {
            Some(Value::Null) | None => Ok(0.0),
            Some(value) => numeric(field, value),
        },
        FieldValue::Scalar(value) => Err(AggregationError::InvalidQuery(format!(
            "field '{}' expected a list, found {}",
            field, value
        ))),
    }
}

fn numeric(field: &str, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| {
        AggregationError::InvalidQuery(format!(
            "field '{}' holds non-numeric value {}",
            field, value
        ))
    })
}
