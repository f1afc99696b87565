//! Typed single-record input

use crate::error::{PredictorError, Result};
use crate::schema::{FeatureSchema, NumericKind};
use polars::prelude::*;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// One coerced feature value
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FeatureValue {
    fn to_column(&self, name: &str) -> Column {
        match self {
            FeatureValue::Int(v) => Column::new(name.into(), &[*v]),
            FeatureValue::Float(v) => Column::new(name.into(), &[*v]),
            FeatureValue::Text(v) => Column::new(name.into(), &[v.as_str()]),
        }
    }
}

/// A complete input record in schema order. Serializes as a JSON object
/// keyed by feature name.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    values: Vec<(String, FeatureValue)>,
}

impl InputRecord {
    /// Coerce raw form fields into typed values. Every schema feature must be
    /// present; extra fields are ignored.
    pub fn coerce(schema: &FeatureSchema, raw: &HashMap<String, String>) -> Result<Self> {
        let values = schema
            .features()
            .map(|feature| {
                let text = raw
                    .get(feature)
                    .ok_or_else(|| PredictorError::MissingFeature(feature.to_string()))?;
                let value = match schema.numeric_kind(feature) {
                    Some(kind) => coerce_numeric(feature, text, kind)?,
                    None => FeatureValue::Text(text.clone()),
                };
                Ok((feature.to_string(), value))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { values })
    }

    pub fn get(&self, feature: &str) -> Option<&FeatureValue> {
        self.values
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// One-row frame with a column per feature
    pub fn to_frame(&self) -> Result<DataFrame> {
        let columns = self
            .values
            .iter()
            .map(|(name, value)| value.to_column(name))
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

impl Serialize for InputRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Parse as a float; integer features are truncated toward zero
fn coerce_numeric(feature: &str, text: &str, kind: NumericKind) -> Result<FeatureValue> {
    let coercion_error = || PredictorError::CoercionError {
        feature: feature.to_string(),
        value: text.to_string(),
    };

    let value: f64 = text.trim().parse().map_err(|_| coercion_error())?;
    if !value.is_finite() {
        return Err(coercion_error());
    }

    match kind {
        NumericKind::Float => Ok(FeatureValue::Float(value)),
        NumericKind::Integer => {
            let truncated = value.trunc();
            if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                return Err(coercion_error());
            }
            Ok(FeatureValue::Int(truncated as i64))
        }
    }
}
