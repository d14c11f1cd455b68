//! Selection range predicates
//!
//! A range is one filter predicate on one column. Numeric intervals and
//! time windows are inclusive on both ends; category sets test label
//! membership. Invalid bounds are rejected at construction so a range that
//! exists is always evaluable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors from the selection model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    /// Interval bounds out of order
    #[error("invalid interval: min {min} is greater than max {max}")]
    InvalidInterval { min: f64, max: f64 },

    /// A category selection with no labels can never match
    #[error("category selection needs at least one label")]
    EmptyCategorySet,

    /// Time window bounds out of order
    #[error("invalid time window: start {start} is after end {end}")]
    InvalidTimeWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Removing a range that is not active on the column
    #[error("range is not active on the column")]
    RangeNotFound,

    /// Operating on a column with no active selection
    #[error("column has no active selection")]
    ColumnNotSelected,
}

/// One filter predicate on one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionRange {
    /// Numeric interval, inclusive on both ends
    Interval { min: f64, max: f64 },

    /// Category label membership
    Categories(BTreeSet<String>),

    /// Instant window `[start, end]`, inclusive on both ends
    TimeWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl SelectionRange {
    /// Create a numeric interval; rejects min > max
    pub fn interval(min: f64, max: f64) -> Result<Self, SelectionError> {
        if min > max {
            return Err(SelectionError::InvalidInterval { min, max });
        }
        Ok(Self::Interval { min, max })
    }

    /// Create a category set; rejects an empty label set
    pub fn categories<I, S>(labels: I) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
        if set.is_empty() {
            return Err(SelectionError::EmptyCategorySet);
        }
        Ok(Self::Categories(set))
    }

    /// Create an instant window; rejects start > end
    pub fn time_window(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, SelectionError> {
        if start > end {
            return Err(SelectionError::InvalidTimeWindow { start, end });
        }
        Ok(Self::TimeWindow { start, end })
    }

    /// Whether a numeric value falls in this range
    ///
    /// Always false for non-interval ranges and for NaN values.
    pub fn contains_real(&self, value: f64) -> bool {
        match self {
            Self::Interval { min, max } => value >= *min && value <= *max,
            _ => false,
        }
    }

    /// Whether a category label falls in this range
    pub fn contains_category(&self, label: &str) -> bool {
        match self {
            Self::Categories(labels) => labels.contains(label),
            _ => false,
        }
    }

    /// Whether an instant falls in this range
    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        match self {
            Self::TimeWindow { start, end } => instant >= *start && instant <= *end,
            _ => false,
        }
    }
}
