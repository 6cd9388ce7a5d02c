//! Request validation: allow-lists keyed on the aggregation type

use crate::aggregation_core::{AggregationType, Field, GroupBy, Query};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw request as typed by the user; every key may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationRequest {
    pub aggregation: Option<String>,
    pub field: Option<String>,
    pub by: Option<String>,
}

impl AggregationRequest {
    pub fn new(aggregation: &str, field: &str, by: &str) -> Self {
        Self {
            aggregation: Some(aggregation.to_string()),
            field: Some(field.to_string()),
            by: Some(by.to_string()),
        }
    }
}

/// Request key → messages, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, key: &str, message: impl Into<String>) {
        self.0.entry(key.to_string()).or_default().push(message.into());
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Fields each aggregation may be applied to
pub fn allowed_fields(aggregation: AggregationType) -> &'static [Field] {
    match aggregation {
        AggregationType::Avg => &[
            Field::Area,
            Field::Borders,
            Field::Currencies,
            Field::Gini,
            Field::Languages,
            Field::Latlng,
            Field::Population,
        ],
        AggregationType::Count => &[
            Field::Borders,
            Field::Countries,
            Field::Currencies,
            Field::Languages,
        ],
        AggregationType::Max | AggregationType::Sum => &[Field::Area, Field::Gini, Field::Population],
        AggregationType::Min => &[
            Field::Area,
            Field::Borders,
            Field::Currencies,
            Field::Gini,
            Field::Languages,
            Field::Population,
        ],
    }
}

/// Check `request` against the allow-lists and build the query it describes.
///
/// An invalid aggregation makes every field unallowed.
pub fn validate_aggregation_request(request: &AggregationRequest) -> Result<Query, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let aggregation = check(
        &mut errors,
        "aggregation",
        request.aggregation.as_deref(),
        AggregationType::from_str,
    );
    let allowed = aggregation.map(allowed_fields).unwrap_or(&[]);
    let field = check(&mut errors, "field", request.field.as_deref(), |name| {
        Field::from_str(name).filter(|field| allowed.contains(field))
    });
    let by = check(&mut errors, "by", request.by.as_deref(), GroupBy::from_str);

    match (aggregation, field, by) {
        (Some(aggregation), Some(field), Some(by)) => Ok(Query::new(aggregation, field, by)),
        _ => Err(errors),
    }
}

fn check<T>(
    errors: &mut ValidationErrors,
    key: &str,
    value: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let Some(value) = value else {
        errors.add(key, "required field");
        return None;
    };

    let parsed = parse(value);
    if parsed.is_none() {
        errors.add(key, format!("unallowed value {}", value));
    }
    parsed
}
