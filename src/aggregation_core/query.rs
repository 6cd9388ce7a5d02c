//! Query vocabulary: aggregation types, fields, grouping keys

use crate::error::{AggregationError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationType {
    Avg,
    Count,
    Max,
    Min,
    Sum,
}

impl AggregationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationType::Avg => "avg",
            AggregationType::Count => "count",
            AggregationType::Max => "max",
            AggregationType::Min => "min",
            AggregationType::Sum => "sum",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "avg" => Some(AggregationType::Avg),
            "count" => Some(AggregationType::Count),
            "max" => Some(AggregationType::Max),
            "min" => Some(AggregationType::Min),
            "sum" => Some(AggregationType::Sum),
            _ => None,
        }
    }

    pub fn all() -> [AggregationType; 5] {
        [
            AggregationType::Avg,
            AggregationType::Count,
            AggregationType::Max,
            AggregationType::Min,
            AggregationType::Sum,
        ]
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics a query can aggregate.
///
/// `Countries` is synthetic: it names no record key and counts records instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Area,
    Borders,
    Countries,
    Currencies,
    Gini,
    Languages,
    Latlng,
    Population,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Area => "area",
            Field::Borders => "borders",
            Field::Countries => "countries",
            Field::Currencies => "currencies",
            Field::Gini => "gini",
            Field::Languages => "languages",
            Field::Latlng => "latlng",
            Field::Population => "population",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "area" => Some(Field::Area),
            "borders" => Some(Field::Borders),
            "countries" => Some(Field::Countries),
            "currencies" => Some(Field::Currencies),
            "gini" => Some(Field::Gini),
            "languages" => Some(Field::Languages),
            "latlng" => Some(Field::Latlng),
            "population" => Some(Field::Population),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record key used to partition the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupBy {
    Region,
    Subregion,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Region => "region",
            GroupBy::Subregion => "subregion",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "region" => Some(GroupBy::Region),
            "subregion" => Some(GroupBy::Subregion),
            _ => None,
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Query {
    pub aggregation: AggregationType,
    pub field: Field,
    pub by: GroupBy,
}

impl Query {
    pub fn new(aggregation: AggregationType, field: Field, by: GroupBy) -> Self {
        Self {
            aggregation,
            field,
            by,
        }
    }

    /// Build a query from raw names, failing on anything outside the vocabulary
    pub fn parse(aggregation: &str, field: &str, by: &str) -> Result<Self> {
        let aggregation = AggregationType::from_str(aggregation).ok_or_else(|| {
            AggregationError::InvalidQuery(format!("unknown aggregation '{}'", aggregation))
        })?;
        let field = Field::from_str(field)
            .ok_or_else(|| AggregationError::InvalidQuery(format!("unknown field '{}'", field)))?;
        let by = GroupBy::from_str(by)
            .ok_or_else(|| AggregationError::InvalidQuery(format!("unknown grouping '{}'", by)))?;

        Ok(Self::new(aggregation, field, by))
    }

    /// Cache key `aggregation:field:by`.
    ///
    /// Every component comes from a fixed vocabulary without ':', so keys never collide.
    pub fn signature(&self) -> String {
        format!("{}:{}:{}", self.aggregation, self.field, self.by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_order() {
        let query = Query::new(AggregationType::Sum, Field::Area, GroupBy::Region);
        assert_eq!(query.signature(), "sum:area:region");

        let other = Query::new(AggregationType::Sum, Field::Area, GroupBy::Subregion);
        assert_ne!(query.signature(), other.signature());
    }

    #[test]
    fn test_parse_known_names() {
        let query = Query::parse("avg", "latlng", "subregion").unwrap();
        assert_eq!(query.aggregation, AggregationType::Avg);
        assert_eq!(query.field, Field::Latlng);
        assert_eq!(query.by, GroupBy::Subregion);
    }

    #[test]
    fn test_parse_unknown_names() {
        assert!(matches!(
            Query::parse("median", "area", "region"),
            Err(AggregationError::InvalidQuery(_))
        ));
        assert!(matches!(
            Query::parse("sum", "name", "region"),
            Err(AggregationError::InvalidQuery(_))
        ));
        assert!(matches!(
            Query::parse("sum", "area", "continent"),
            Err(AggregationError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_names_round_trip() {
        for aggregation in AggregationType::all() {
            assert_eq!(AggregationType::from_str(aggregation.as_str()), Some(aggregation));
        }
    }
}
