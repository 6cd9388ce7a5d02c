//! Aggregation reducer: collapses each group's series into rounded numbers

use super::accumulator::{AccumulationResult, Series};
use super::query::AggregationType;
use crate::error::{AggregationError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;

/// Decimal places kept in every reduced value.
pub const ROUND_DECIMALS: i32 = 2;

/// Reduced value of one group.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GroupResult {
    Scalar(f64),
    /// One value per fan-out component, in component order
    Components(Vec<f64>),
}

/// Group key → reduced value, in the accumulator's group order.
pub type AggregationResult = IndexMap<String, GroupResult>;

// Whole numbers are written as JSON integers, so a float result such as `180.0`
// is stored as `180`. Both forms read back as the same `f64`.
struct JsonNumber(f64);

impl Serialize for JsonNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let value = self.0;
        if value.fract() == 0.0 && value.abs() < 9.0e15 {
            serializer.serialize_i64(value as i64)
        } else {
            serializer.serialize_f64(value)
        }
    }
}

impl Serialize for GroupResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            GroupResult::Scalar(value) => JsonNumber(*value).serialize(serializer),
            GroupResult::Components(values) => {
                serializer.collect_seq(values.iter().map(|value| JsonNumber(*value)))
            }
        }
    }
}

/// Reduce every group with `aggregation`.
///
/// Fan-out series are reduced component by component.
pub fn reduce(groups: &AccumulationResult, aggregation: AggregationType) -> Result<AggregationResult> {
    let mut results = AggregationResult::with_capacity(groups.len());

    for (group, series) in groups {
        let result = match series {
            Series::Flat(values) => GroupResult::Scalar(reduce_series(values, aggregation, group)?),
            Series::FanOut(components) => GroupResult::Components(
                components
                    .iter()
                    .map(|component| reduce_series(component, aggregation, group))
                    .collect::<Result<Vec<f64>>>()?,
            ),
        };
        results.insert(group.clone(), result);
    }

    Ok(results)
}

/// Apply `aggregation` to one series and round the outcome.
///
/// Only `count` accepts an empty series.
pub fn reduce_series(values: &[f64], aggregation: AggregationType, group: &str) -> Result<f64> {
    if values.is_empty() && aggregation != AggregationType::Count {
        return Err(AggregationError::EmptySeries {
            group: group.to_string(),
            aggregation: aggregation.to_string(),
        });
    }

    let raw = match aggregation {
        AggregationType::Avg => values.iter().sum::<f64>() / values.len() as f64,
        AggregationType::Count => values.len() as f64,
        AggregationType::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregationType::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        AggregationType::Sum => values.iter().sum(),
    };

    Ok(round_to(raw, ROUND_DECIMALS))
}

/// Round to `decimals` places, ties to even, judged on the exact binary value.
///
/// `value * factor` can land on a `.5` that the exact product misses; the fused
/// residual tells which side of the tie the exact product sits on.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }

    let rounded = if (scaled - scaled.trunc()).abs() == 0.5 {
        match value.mul_add(factor, -scaled).partial_cmp(&0.0) {
            Some(Ordering::Greater) => scaled.ceil(),
            Some(Ordering::Less) => scaled.floor(),
            _ => scaled.round_ties_even(),
        }
    } else {
        scaled.round()
    };

    rounded / factor
}
