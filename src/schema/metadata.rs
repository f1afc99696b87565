//! Form metadata derived from the training sample

use super::{FeatureSchema, NumericKind, TARGET_COLUMN};
use crate::error::Result;
use crate::preprocessing::is_numeric_dtype;
use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::warn;

/// Default shown in a numeric form field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericDefault {
    pub median: f64,
    pub is_int: bool,
}

/// Dropdown candidates and numeric defaults for the input form
#[derive(Debug, Clone, Default, Serialize)]
pub struct UiMetadata {
    pub dropdowns: BTreeMap<String, Vec<String>>,
    pub numeric_defaults: BTreeMap<String, NumericDefault>,
}

impl UiMetadata {
    /// Derive metadata from the training sample. No sample means no metadata.
    pub fn from_sample(sample: Option<&DataFrame>, schema: &FeatureSchema) -> Self {
        let Some(sample) = sample else {
            return Self::default();
        };

        let mut dropdowns = BTreeMap::new();
        for column in sample.get_columns() {
            if column.name().as_str() == TARGET_COLUMN || is_numeric_dtype(column.dtype()) {
                continue;
            }
            let values = rank_by_frequency(column.as_materialized_series());
            dropdowns.insert(column.name().to_string(), values);
        }

        let mut numeric_defaults = BTreeMap::new();
        for name in schema.num_cols() {
            let Ok(column) = sample.column(name) else {
                continue;
            };
            match column_median(column) {
                Ok(Some(median)) => {
                    let is_int = schema.numeric_kind(name) == Some(NumericKind::Integer);
                    numeric_defaults.insert(name.clone(), NumericDefault { median, is_int });
                }
                Ok(None) => {}
                Err(e) => warn!(feature = %name, error = %e, "No numeric default for feature"),
            }
        }

        Self {
            dropdowns,
            numeric_defaults,
        }
    }

    /// Dropdown candidates for a feature, if it has any
    pub fn dropdown(&self, feature: &str) -> Option<&[String]> {
        self.dropdowns
            .get(feature)
            .filter(|values| !values.is_empty())
            .map(Vec::as_slice)
    }

    pub fn numeric_default(&self, feature: &str) -> Option<NumericDefault> {
        self.numeric_defaults.get(feature).copied()
    }
}

fn column_median(column: &Column) -> Result<Option<f64>> {
    let series = column
        .as_materialized_series()
        .strict_cast(&DataType::Float64)?;
    Ok(series.f64()?.median())
}

/// Distinct non-null values, most frequent first, ties in ascending string
/// order. Falls back to a plain lexicographic sort when the values cannot be
/// read as strings.
pub fn rank_by_frequency(series: &Series) -> Vec<String> {
    match frequency_order(series) {
        Ok(values) => values,
        Err(e) => {
            warn!(
                column = %series.name(),
                error = %e,
                "Frequency ranking failed, sorting values lexicographically"
            );
            lexicographic_order(series)
        }
    }
}

fn frequency_order(series: &Series) -> Result<Vec<String>> {
    let strings = series.cast(&DataType::String)?;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in strings.str()?.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    Ok(ranked.into_iter().map(|(v, _)| v.to_string()).collect())
}

fn lexicographic_order(series: &Series) -> Vec<String> {
    let distinct: BTreeSet<String> = (0..series.len())
        .filter_map(|i| series.get(i).ok())
        .filter(|value| !value.is_null())
        .map(|value| match value.get_str() {
            Some(s) => s.to_string(),
            None => value.to_string(),
        })
        .collect();
    distinct.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "Brand" => &[Some("HP"), Some("Dell"), Some("HP"), Some("Asus"), None, Some("Dell"), Some("Acer")],
            "RAM_GB" => &[8i64, 16, 8, 4, 32, 16, 8],
            "Screen_Size" => &[Some(14.0), Some(15.6), None, Some(13.3), Some(14.0), Some(15.6), Some(14.0)],
            "Price_INR" => &["a", "b", "c", "d", "e", "f", "g"]
        )
        .unwrap()
    }

    #[test]
    fn test_rank_by_frequency_breaks_ties_lexicographically() {
        let series = Series::new("Brand".into(), &["HP", "Dell", "HP", "Asus", "Dell", "Acer"]);
        assert_eq!(rank_by_frequency(&series), vec!["Dell", "HP", "Acer", "Asus"]);
    }

    #[test]
    fn test_lexicographic_fallback_skips_nulls() {
        let series = Series::new("c".into(), &[Some("b"), None, Some("a"), Some("b")]);
        assert_eq!(lexicographic_order(&series), vec!["a", "b"]);
    }

    #[test]
    fn test_rank_by_frequency_falls_back_for_list_values() {
        let short = Series::new("".into(), &[1i64]);
        let long = Series::new("".into(), &[1i64, 2]);
        let series = Series::new("ports".into(), &[long.clone(), short, long]);
        assert!(series.cast(&DataType::String).is_err());

        let ranked = rank_by_frequency(&series);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_dropdowns_skip_numeric_and_target() {
        let df = sample();
        let schema = FeatureSchema::infer(&df).unwrap().with_numeric_kinds_from(&df);
        let metadata = UiMetadata::from_sample(Some(&df), &schema);

        assert_eq!(metadata.dropdowns.len(), 1);
        assert_eq!(
            metadata.dropdown("Brand").unwrap(),
            &["Dell", "HP", "Acer", "Asus"].map(String::from)[..]
        );
        assert!(metadata.dropdown("Price_INR").is_none());
    }

    #[test]
    fn test_numeric_defaults() {
        let df = sample();
        let schema = FeatureSchema::infer(&df).unwrap().with_numeric_kinds_from(&df);
        let metadata = UiMetadata::from_sample(Some(&df), &schema);

        assert_eq!(
            metadata.numeric_default("RAM_GB"),
            Some(NumericDefault { median: 8.0, is_int: true })
        );
        // Nulls are skipped: median of [13.3, 14.0, 14.0, 14.0, 15.6, 15.6]
        assert_eq!(
            metadata.numeric_default("Screen_Size"),
            Some(NumericDefault { median: 14.0, is_int: false })
        );
    }

    #[test]
    fn test_absent_sample_gives_empty_metadata() {
        let schema = FeatureSchema::new(vec!["RAM_GB".into()], vec!["Brand".into()]).unwrap();
        let metadata = UiMetadata::from_sample(None, &schema);
        assert!(metadata.dropdowns.is_empty());
        assert!(metadata.numeric_defaults.is_empty());
    }
}
