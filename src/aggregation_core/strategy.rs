//! Per-field accumulation strategies

use super::query::Field;

/// Width of the `latlng` coordinate pair.
pub const LATLNG_WIDTH: usize = 2;

/// How a field is accumulated and reduced.
///
/// Looked up once per query; the accumulator and the reducer both switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStrategy {
    /// Extract one number per record and reduce the flat series
    Default,
    /// Ignore the value and contribute a constant 1 per record
    CountPresence,
    /// Split a fixed-size list into `width` parallel series, reduced independently
    FanOut { width: usize },
}

impl FieldStrategy {
    pub fn for_field(field: Field) -> Self {
        match field {
            Field::Countries => FieldStrategy::CountPresence,
            Field::Latlng => FieldStrategy::FanOut {
                width: LATLNG_WIDTH,
            },
            Field::Area
            | Field::Borders
            | Field::Currencies
            | Field::Gini
            | Field::Languages
            | Field::Population => FieldStrategy::Default,
        }
    }
}
