//! Grouping accumulator: partitions records and collects one series per group

use super::query::{Field, GroupBy};
use super::record::{extract_component, extract_value, Record};
use super::strategy::FieldStrategy;
use crate::error::Result;
use indexmap::IndexMap;

/// Values collected for one group, in record order.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Flat(Vec<f64>),
    /// One sub-series per component of a fan-out field
    FanOut(Vec<Vec<f64>>),
}

impl Series {
    pub fn new(strategy: FieldStrategy) -> Self {
        match strategy {
            FieldStrategy::FanOut { width } => Series::FanOut(vec![Vec::new(); width]),
            FieldStrategy::Default | FieldStrategy::CountPresence => Series::Flat(Vec::new()),
        }
    }

    /// Number of records that contributed to this series
    pub fn contributions(&self) -> usize {
        match self {
            Series::Flat(values) => values.len(),
            Series::FanOut(components) => components.first().map_or(0, Vec::len),
        }
    }

    fn push(&mut self, record: &Record, field: Field, strategy: FieldStrategy) -> Result<()> {
        match self {
            Series::FanOut(components) => {
                for (index, component) in components.iter_mut().enumerate() {
                    component.push(extract_component(record, field.as_str(), index)?);
                }
            }
            Series::Flat(values) => {
                let value = match strategy {
                    FieldStrategy::CountPresence => 1.0,
                    _ => extract_value(record, field.as_str())?,
                };
                values.push(value);
            }
        }
        Ok(())
    }
}

/// Group key → series, in first-appearance order of the keys.
pub type AccumulationResult = IndexMap<String, Series>;

/// Partition `dataset` by `by` and collect each record's contribution for `field`.
///
/// Every record lands in exactly one group.
pub fn accumulate(dataset: &[Record], field: Field, by: GroupBy) -> Result<AccumulationResult> {
    let strategy = FieldStrategy::for_field(field);
    let mut groups = AccumulationResult::new();

    for record in dataset {
        groups
            .entry(record.group_key(by).to_string())
            .or_insert_with(|| Series::new(strategy))
            .push(record, field, strategy)?;
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation_core::record::{Dataset, NULL_GROUP};

    fn create_test_dataset() -> Dataset {
        serde_json::from_str(
            r#"[
                {"area": 1, "borders": ["a", "b", "c"], "currencies": ["d", "e"], "gini": 11.11, "latlng": [10.1, 12.2], "region": "a", "subregion": "aa"},
                {"area": 2, "borders": ["d", "e"], "currencies": ["f"], "gini": 12.12, "latlng": [20.2, 22.3], "region": "a", "subregion": "aa"},
                {"area": 3, "borders": ["f"]},
                {"area": 4, "borders": ["x"], "currencies": ["x", "y"], "gini": 100.1, "latlng": [50.1, 62.2], "region": "b", "subregion": "ba"},
                {"area": 5, "borders": ["y", "z"], "currencies": ["z", "a"], "gini": 100.2, "latlng": [70.2, 82.3], "region": "b", "subregion": "bb"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_accumulate_scalars_with_nulls() {
        let groups = accumulate(&create_test_dataset(), Field::Area, GroupBy::Region).unwrap();

        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", NULL_GROUP, "b"]);
        assert_eq!(groups["a"], Series::Flat(vec![1.0, 2.0]));
        assert_eq!(groups[NULL_GROUP], Series::Flat(vec![3.0]));
        assert_eq!(groups["b"], Series::Flat(vec![4.0, 5.0]));
    }

    #[test]
    fn test_accumulate_list_lengths() {
        let groups = accumulate(&create_test_dataset(), Field::Borders, GroupBy::Subregion).unwrap();

        assert_eq!(groups["aa"], Series::Flat(vec![3.0, 2.0]));
        assert_eq!(groups[NULL_GROUP], Series::Flat(vec![1.0]));
        assert_eq!(groups["ba"], Series::Flat(vec![1.0]));
        assert_eq!(groups["bb"], Series::Flat(vec![2.0]));
    }

    #[test]
    fn test_accumulate_fan_out_pairs() {
        let groups = accumulate(&create_test_dataset(), Field::Latlng, GroupBy::Region).unwrap();

        assert_eq!(
            groups["a"],
            Series::FanOut(vec![vec![10.1, 20.2], vec![12.2, 22.3]])
        );
        assert_eq!(groups[NULL_GROUP], Series::FanOut(vec![vec![0.0], vec![0.0]]));
        assert_eq!(
            groups["b"],
            Series::FanOut(vec![vec![50.1, 70.2], vec![62.2, 82.3]])
        );
    }

    #[test]
    fn test_accumulate_count_presence() {
        let groups = accumulate(&create_test_dataset(), Field::Countries, GroupBy::Region).unwrap();

        assert_eq!(groups["a"], Series::Flat(vec![1.0, 1.0]));
        assert_eq!(groups[NULL_GROUP], Series::Flat(vec![1.0]));
    }

    #[test]
    fn test_every_record_contributes_once() {
        let dataset = create_test_dataset();

        for field in [Field::Area, Field::Gini, Field::Latlng, Field::Countries] {
            for by in [GroupBy::Region, GroupBy::Subregion] {
                let groups = accumulate(&dataset, field, by).unwrap();
                let total: usize = groups.values().map(Series::contributions).sum();
                assert_eq!(total, dataset.len(), "{} by {}", field, by);
            }
        }
    }

    #[test]
    fn test_accumulate_empty_dataset() {
        let groups = accumulate(&[], Field::Area, GroupBy::Region).unwrap();
        assert!(groups.is_empty());
    }
}
