//! Query state and evaluation
//!
//! A [`Query`] is the conjunction of per-column selections: a row is in the
//! query set when it satisfies every column that has at least one active
//! range, and a column is satisfied when any of its ranges matches (OR).
//! A query with no selections filters nothing - every row passes.
//!
//! Evaluation runs against a [`RowContext`], which exposes typed per-row
//! values without revealing how the owning table stores them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::range::{SelectionError, SelectionRange};

/// Stable column handle, valid across rename, disable, and reorder
pub type ColumnId = Uuid;

/// Row-wise typed value access for query evaluation
///
/// Implementors return `None` when the column does not exist, the row is
/// out of range, or the cell's type does not match the getter.
pub trait RowContext {
    /// Numeric value of a quantitative cell
    fn real_value(&self, column: ColumnId, row: usize) -> Option<f64>;

    /// Label of a categorical cell
    fn category_value(&self, column: ColumnId, row: usize) -> Option<&str>;

    /// Instant of a temporal cell
    fn instant_value(&self, column: ColumnId, row: usize) -> Option<DateTime<Utc>>;

    /// Number of rows
    fn row_count(&self) -> usize;
}

/// All ranges active on one column, combined with OR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSelection {
    /// The column this selection filters
    pub column: ColumnId,
    /// Active ranges; never empty while the selection exists
    pub ranges: Vec<SelectionRange>,
}

impl ColumnSelection {
    /// Create a selection with its first range
    pub fn new(column: ColumnId, range: SelectionRange) -> Self {
        Self {
            column,
            ranges: vec![range],
        }
    }

    /// Whether a row's value matches any of this column's ranges
    pub fn matches_row<C: RowContext>(&self, ctx: &C, row: usize) -> bool {
        self.ranges
            .iter()
            .any(|range| range_matches(range, ctx, self.column, row))
    }
}

/// Whether one range matches a row's value for `column`
fn range_matches<C: RowContext>(
    range: &SelectionRange,
    ctx: &C,
    column: ColumnId,
    row: usize,
) -> bool {
    match range {
        SelectionRange::Interval { .. } => ctx
            .real_value(column, row)
            .map(|v| range.contains_real(v))
            .unwrap_or(false),
        SelectionRange::Categories(_) => ctx
            .category_value(column, row)
            .map(|label| range.contains_category(label))
            .unwrap_or(false),
        SelectionRange::TimeWindow { .. } => ctx
            .instant_value(column, row)
            .map(|t| range.contains_instant(t))
            .unwrap_or(false),
    }
}

/// The active conjunction of column selections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    selections: Vec<ColumnSelection>,
}

impl Query {
    /// Create an empty (inactive) query
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff at least one column has an active selection
    pub fn has_selections(&self) -> bool {
        !self.selections.is_empty()
    }

    /// All column selections, in the order their columns were first selected
    pub fn selections(&self) -> &[ColumnSelection] {
        &self.selections
    }

    /// The selection active on one column, if any
    pub fn selection(&self, column: ColumnId) -> Option<&ColumnSelection> {
        self.selections.iter().find(|s| s.column == column)
    }

    /// Ids of all columns with an active selection
    pub fn selected_columns(&self) -> Vec<ColumnId> {
        self.selections.iter().map(|s| s.column).collect()
    }

    /// Add a range to a column, moving it Unselected -> Selected or
    /// appending a further OR-range
    pub fn add_range(&mut self, column: ColumnId, range: SelectionRange) {
        match self.selections.iter_mut().find(|s| s.column == column) {
            Some(selection) => selection.ranges.push(range),
            None => self.selections.push(ColumnSelection::new(column, range)),
        }
    }

    /// Remove one range from a column; the column reverts to Unselected
    /// when its last range is removed
    pub fn remove_range(
        &mut self,
        column: ColumnId,
        range: &SelectionRange,
    ) -> Result<(), SelectionError> {
        let pos = self
            .selections
            .iter()
            .position(|s| s.column == column)
            .ok_or(SelectionError::ColumnNotSelected)?;

        let selection = &mut self.selections[pos];
        let range_pos = selection
            .ranges
            .iter()
            .position(|r| r == range)
            .ok_or(SelectionError::RangeNotFound)?;

        selection.ranges.remove(range_pos);
        if selection.ranges.is_empty() {
            self.selections.remove(pos);
        }
        Ok(())
    }

    /// Drop every range on one column; returns whether any was present
    pub fn clear_column(&mut self, column: ColumnId) -> bool {
        let before = self.selections.len();
        self.selections.retain(|s| s.column != column);
        self.selections.len() != before
    }

    /// Reset every column to Unselected
    pub fn clear(&mut self) {
        self.selections.clear();
    }

    /// Whether one row satisfies the query
    ///
    /// AND across selected columns, OR across each column's ranges. With no
    /// selections every row passes.
    pub fn matches_row<C: RowContext>(&self, ctx: &C, row: usize) -> bool {
        self.selections.iter().all(|s| s.matches_row(ctx, row))
    }

    /// Evaluate the query into a per-row membership mask
    pub fn evaluate<C: RowContext>(&self, ctx: &C) -> Vec<bool> {
        (0..ctx.row_count())
            .map(|row| self.matches_row(ctx, row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct TestContext {
        x: Vec<f64>,
        color: Vec<&'static str>,
        when: Vec<DateTime<Utc>>,
        x_id: ColumnId,
        color_id: ColumnId,
        when_id: ColumnId,
    }

    impl TestContext {
        fn new() -> Self {
            let day = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
            Self {
                x: vec![1.0, 2.0, 3.0, 4.0],
                color: vec!["red", "blue", "red", "green"],
                when: vec![day(1), day(10), day(20), day(30)],
                x_id: Uuid::new_v4(),
                color_id: Uuid::new_v4(),
                when_id: Uuid::new_v4(),
            }
        }
    }

    impl RowContext for TestContext {
        fn real_value(&self, column: ColumnId, row: usize) -> Option<f64> {
            (column == self.x_id).then(|| self.x.get(row).copied()).flatten()
        }

        fn category_value(&self, column: ColumnId, row: usize) -> Option<&str> {
            (column == self.color_id)
                .then(|| self.color.get(row).copied())
                .flatten()
        }

        fn instant_value(&self, column: ColumnId, row: usize) -> Option<DateTime<Utc>> {
            (column == self.when_id)
                .then(|| self.when.get(row).copied())
                .flatten()
        }

        fn row_count(&self) -> usize {
            self.x.len()
        }
    }

    #[test]
    fn test_empty_query_passes_all_rows() {
        let ctx = TestContext::new();
        let query = Query::new();
        assert!(!query.has_selections());
        assert_eq!(query.evaluate(&ctx), vec![true; 4]);
    }

    #[test]
    fn test_single_interval() {
        let ctx = TestContext::new();
        let mut query = Query::new();
        query.add_range(ctx.x_id, SelectionRange::interval(2.0, 3.0).unwrap());

        assert!(query.has_selections());
        assert_eq!(query.evaluate(&ctx), vec![false, true, true, false]);
    }

    #[test]
    fn test_or_within_column() {
        let ctx = TestContext::new();
        let mut query = Query::new();
        query.add_range(ctx.x_id, SelectionRange::interval(1.0, 1.0).unwrap());
        query.add_range(ctx.x_id, SelectionRange::interval(4.0, 4.0).unwrap());

        assert_eq!(query.evaluate(&ctx), vec![true, false, false, true]);
    }

    #[test]
    fn test_and_across_columns() {
        let ctx = TestContext::new();
        let mut query = Query::new();
        query.add_range(ctx.x_id, SelectionRange::interval(1.0, 3.0).unwrap());
        query.add_range(ctx.color_id, SelectionRange::categories(["red"]).unwrap());

        // x in [1,3]: rows 0,1,2; color == red: rows 0,2
        assert_eq!(query.evaluate(&ctx), vec![true, false, true, false]);
    }

    #[test]
    fn test_time_window_boundaries() {
        let ctx = TestContext::new();
        let mut query = Query::new();
        let start = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        query.add_range(
            ctx.when_id,
            SelectionRange::time_window(start, end).unwrap(),
        );

        // both boundary instants are included
        assert_eq!(query.evaluate(&ctx), vec![false, true, true, false]);
    }

    #[test]
    fn test_remove_range_reverts_to_unselected() {
        let ctx = TestContext::new();
        let mut query = Query::new();
        let range = SelectionRange::interval(2.0, 3.0).unwrap();
        query.add_range(ctx.x_id, range.clone());

        query.remove_range(ctx.x_id, &range).unwrap();
        assert!(!query.has_selections());
        assert_eq!(query.evaluate(&ctx), vec![true; 4]);
    }

    #[test]
    fn test_remove_missing_range_is_an_error() {
        let ctx = TestContext::new();
        let mut query = Query::new();
        let active = SelectionRange::interval(2.0, 3.0).unwrap();
        let other = SelectionRange::interval(0.0, 1.0).unwrap();
        query.add_range(ctx.x_id, active.clone());

        assert_eq!(
            query.remove_range(ctx.x_id, &other).unwrap_err(),
            SelectionError::RangeNotFound
        );
        assert_eq!(
            query.remove_range(ctx.color_id, &active).unwrap_err(),
            SelectionError::ColumnNotSelected
        );
        // the failed removals changed nothing
        assert_eq!(query.selections().len(), 1);
    }

    #[test]
    fn test_clear() {
        let ctx = TestContext::new();
        let mut query = Query::new();
        query.add_range(ctx.x_id, SelectionRange::interval(2.0, 3.0).unwrap());
        query.add_range(ctx.color_id, SelectionRange::categories(["red"]).unwrap());

        query.clear();
        assert!(!query.has_selections());
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let ctx = TestContext::new();
        let mut query = Query::new();
        query.add_range(ctx.x_id, SelectionRange::interval(2.0, 4.0).unwrap());
        query.add_range(ctx.color_id, SelectionRange::categories(["red", "blue"]).unwrap());

        let first = query.evaluate(&ctx);
        let second = query.evaluate(&ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_value_fails_column() {
        let ctx = TestContext::new();
        let mut query = Query::new();
        // an interval on a categorical column can never match
        query.add_range(ctx.color_id, SelectionRange::interval(0.0, 10.0).unwrap());
        assert_eq!(query.evaluate(&ctx), vec![false; 4]);
    }
}
