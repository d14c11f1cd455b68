//! Typed cell values
//!
//! A table cell is quantitative (f64), categorical (label), or temporal
//! (UTC instant). Every value maps to exactly one [`ColumnType`], and the
//! table enforces at ingest that a tuple's elements match their columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of data a column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// Continuous or discrete numeric data
    Quantitative,
    /// Label data with a finite set of values
    Categorical,
    /// Instants in time
    Temporal,
}

impl ColumnType {
    /// Lowercase name for display
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Quantitative => "quantitative",
            ColumnType::Categorical => "categorical",
            ColumnType::Temporal => "temporal",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One cell of a tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    /// Numeric value
    Real(f64),
    /// Category label
    Category(String),
    /// UTC instant
    Instant(DateTime<Utc>),
}

impl DataValue {
    /// The column kind this value belongs to
    pub fn column_type(&self) -> ColumnType {
        match self {
            DataValue::Real(_) => ColumnType::Quantitative,
            DataValue::Category(_) => ColumnType::Categorical,
            DataValue::Instant(_) => ColumnType::Temporal,
        }
    }

    /// Numeric value, if quantitative
    pub fn as_real(&self) -> Option<f64> {
        match self {
            DataValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Category label, if categorical
    pub fn as_category(&self) -> Option<&str> {
        match self {
            DataValue::Category(label) => Some(label),
            _ => None,
        }
    }

    /// Instant, if temporal
    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            DataValue::Instant(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Real(v) => write!(f, "{v}"),
            DataValue::Category(label) => write!(f, "{label}"),
            DataValue::Instant(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        DataValue::Real(v)
    }
}

impl From<&str> for DataValue {
    fn from(label: &str) -> Self {
        DataValue::Category(label.to_string())
    }
}

impl From<DateTime<Utc>> for DataValue {
    fn from(t: DateTime<Utc>) -> Self {
        DataValue::Instant(t)
    }
}
