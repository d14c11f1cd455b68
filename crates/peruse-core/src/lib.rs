//! peruse-core - Core table engine for exploratory visualization
//!
//! This crate provides the columnar data table every peruse view reads
//! from and writes selections into:
//!
//! - **DataTable**: the root owner of tuples, columns, the active query,
//!   and the notification protocol
//! - **Column**: one attribute with its cached per-scope statistics
//! - **Tuple**: one row, with its query membership flag
//! - **TableEvent**: the observer protocol views subscribe to
//!
//! # Consistency model
//!
//! The table is single-threaded and synchronous: every mutation validates
//! first (a rejected call changes nothing), recomputes all affected
//! statistics before returning, and then notifies subscribers. Read
//! accessors therefore always see statistics consistent with the current
//! tuples, columns, and query. Renderers that need a stable view across a
//! worker-thread handoff clone the summaries they need while no mutation
//! is running; clones are plain values and never change underneath them.

pub mod column;
pub mod error;
pub mod events;
pub mod table;
pub mod tuple;
pub mod value;

pub use column::{
    CategorySummary, Column, ColumnId, ColumnSummary, NumericSummary, StatsScope, TemporalSummary,
};
pub use error::{TableError, TableResult};
pub use events::TableEvent;
pub use table::{DataTable, DEFAULT_BIN_COUNT};
pub use tuple::Tuple;
pub use value::{ColumnType, DataValue};

// Re-export the building blocks callers need to drive the table
pub use peruse_selection::{ColumnSelection, Query, SelectionError, SelectionRange};
pub use peruse_stats::{Histogram, StatsError, SummaryStats};
