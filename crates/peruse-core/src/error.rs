//! Error types for peruse-core
//!
//! Every table mutation validates its arguments before touching any state,
//! so a returned error always means the table is exactly as it was before
//! the call. Ill-defined statistics (NaN values, absent summaries over an
//! empty subset) are valid data states, not errors, and never appear here.

use thiserror::Error;

use crate::value::ColumnType;
use peruse_selection::{ColumnId, SelectionError};
use peruse_stats::StatsError;

/// Errors from table mutations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// No column with this id exists in the table
    #[error("unknown column: {0}")]
    UnknownColumn(ColumnId),

    /// No column with this name exists in the table
    #[error("unknown column name: {0}")]
    UnknownColumnName(String),

    /// Column names must be unique across enabled and disabled columns
    #[error("column name already in use: {0}")]
    DuplicateName(String),

    /// The operation needs an enabled column
    #[error("column {0} is disabled")]
    ColumnNotEnabled(ColumnId),

    /// The operation needs a column of a different kind
    #[error("column {id} is {actual}, expected {expected}")]
    WrongColumnType {
        id: ColumnId,
        expected: ColumnType,
        actual: ColumnType,
    },

    /// Correlation thresholds live in [0, 1]
    #[error("threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),

    /// A tuple's element count does not match the column count
    #[error("tuple {index} has {actual} elements, expected {expected}")]
    ArityMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// A tuple element's kind does not match its column's kind
    #[error("tuple {index}, element {slot}: value is {actual}, column is {expected}")]
    ElementTypeMismatch {
        index: usize,
        slot: usize,
        expected: ColumnType,
        actual: ColumnType,
    },

    /// Invalid selection range arguments
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Invalid statistics configuration
    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;
