//! The data table
//!
//! [`DataTable`] owns the tuple set, the columns with their cached
//! statistics, the active query, and the notification protocol. Every
//! mutating operation validates its arguments up front (a rejected call
//! changes nothing), performs its full recomputation synchronously before
//! returning, and then notifies subscribers - so read accessors always see
//! statistics consistent with the current tuples, columns, and query.
//!
//! Columns live in two orders. **Storage order** is the order columns were
//! supplied at load; tuple elements are indexed by it and it never changes,
//! so reordering the view can never remap rows. The canonical **view
//! order** is what observers display and what
//! [`DataTable::order_columns_by_correlation`] permutes.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::mpsc::Receiver;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::column::{
    Column, ColumnId, ColumnSummary, NumericSummary, CategorySummary, StatsScope, TemporalSummary,
};
use crate::error::{TableError, TableResult};
use crate::events::{EventBus, TableEvent};
use crate::tuple::Tuple;
use crate::value::ColumnType;
use peruse_selection::{Query, RowContext, SelectionRange};
use peruse_stats::{pearson, StatsError, SummaryStats};

/// Histogram bins used when none are configured
pub const DEFAULT_BIN_COUNT: usize = 20;

/// The columnar table every view reads from and writes selections into
#[derive(Debug)]
pub struct DataTable {
    /// Columns in storage order, aligned with tuple elements
    columns: Vec<Column>,
    /// Canonical view order over all column ids
    order: Vec<ColumnId>,
    tuples: Vec<Tuple>,
    query: Query,
    highlighted: Option<ColumnId>,
    time_column: Option<ColumnId>,
    bin_count: usize,
    bus: EventBus,
}

impl DataTable {
    /// Create an empty table with the default histogram bin count
    pub fn new() -> Self {
        Self::with_bin_count(DEFAULT_BIN_COUNT)
    }

    /// Create an empty table with a histogram bin count (minimum 1)
    pub fn with_bin_count(bin_count: usize) -> Self {
        Self {
            columns: Vec::new(),
            order: Vec::new(),
            tuples: Vec::new(),
            query: Query::new(),
            highlighted: None,
            time_column: None,
            bin_count: bin_count.max(1),
            bus: EventBus::default(),
        }
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Register an observer; it receives every subsequent event
    pub fn subscribe(&mut self) -> Receiver<TableEvent> {
        self.bus.subscribe()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Total number of columns, enabled and disabled
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of enabled columns
    pub fn enabled_column_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_enabled()).count()
    }

    /// Number of disabled columns
    pub fn disabled_column_count(&self) -> usize {
        self.columns.len() - self.enabled_column_count()
    }

    /// A column by id
    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id() == id)
    }

    /// A column by name
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// All column ids in canonical view order
    pub fn column_order(&self) -> &[ColumnId] {
        &self.order
    }

    /// Enabled column ids in canonical view order
    pub fn enabled_column_ids(&self) -> Vec<ColumnId> {
        self.order
            .iter()
            .copied()
            .filter(|&id| self.is_column_enabled(id))
            .collect()
    }

    /// The enabled column at a view position
    pub fn enabled_column_at(&self, position: usize) -> Option<&Column> {
        let id = self.enabled_column_ids().into_iter().nth(position)?;
        self.column(id)
    }

    /// A row by index
    pub fn tuple(&self, index: usize) -> Option<&Tuple> {
        self.tuples.get(index)
    }

    /// All rows
    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    /// Number of rows
    pub fn tuple_count(&self) -> usize {
        self.tuples.len()
    }

    /// Whether the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// The active query
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Number of rows whose query flag is set
    pub fn query_row_count(&self) -> usize {
        self.tuples.iter().filter(|t| t.query_flag()).count()
    }

    /// Number of rows whose query flag is clear
    pub fn non_query_row_count(&self) -> usize {
        self.tuples.len() - self.query_row_count()
    }

    /// A column's cached summary for one scope
    pub fn summary(&self, id: ColumnId, scope: StatsScope) -> Option<&ColumnSummary> {
        self.column(id).and_then(|c| c.summary(scope))
    }

    /// Pearson r between two columns over one scope
    ///
    /// NaN when either column is unknown, disabled, or not quantitative,
    /// or when the coefficient is undefined over the scope's subset.
    pub fn correlation(&self, a: ColumnId, b: ColumnId, scope: StatsScope) -> f64 {
        self.column(a)
            .and_then(|c| c.summary(scope))
            .and_then(ColumnSummary::numeric)
            .and_then(|num| num.correlations.get(&b).copied())
            .unwrap_or(f64::NAN)
    }

    /// The highlighted column, if any
    pub fn highlighted_column(&self) -> Option<ColumnId> {
        self.highlighted
    }

    /// The time column, if any
    pub fn time_column(&self) -> Option<ColumnId> {
        self.time_column
    }

    /// Histogram bins used for every summary
    pub fn histogram_bin_count(&self) -> usize {
        self.bin_count
    }

    // ------------------------------------------------------------------
    // Data loading
    // ------------------------------------------------------------------

    /// Replace the column and tuple sets wholesale
    ///
    /// Validates column name uniqueness and every tuple's arity and
    /// element types before touching any state. Clears the query and the
    /// highlighted/time designations, recomputes all statistics, and emits
    /// [`TableEvent::DataReset`].
    pub fn set_data(&mut self, columns: Vec<Column>, tuples: Vec<Tuple>) -> TableResult<()> {
        let mut names = HashSet::new();
        for column in &columns {
            if !names.insert(column.name().to_string()) {
                return Err(TableError::DuplicateName(column.name().to_string()));
            }
        }
        validate_tuples(&columns, &tuples, 0)?;

        info!(
            columns = columns.len(),
            tuples = tuples.len(),
            "loading data"
        );

        self.order = columns.iter().map(Column::id).collect();
        self.columns = columns;
        self.tuples = tuples;
        self.query.clear();
        self.highlighted = None;
        self.time_column = None;

        self.mark_all_dirty();
        self.apply_query();
        self.refresh_statistics();
        self.bus.emit(TableEvent::DataReset);
        Ok(())
    }

    /// Append rows
    ///
    /// New rows are evaluated against the active query and all statistics
    /// are recomputed. Returns the number of rows appended.
    pub fn add_tuples(&mut self, tuples: Vec<Tuple>) -> TableResult<usize> {
        validate_tuples(&self.columns, &tuples, self.tuples.len())?;
        let added = tuples.len();
        if added == 0 {
            return Ok(0);
        }

        self.tuples.extend(tuples);
        self.mark_all_dirty();
        self.apply_query();
        self.refresh_statistics();
        self.bus.emit(TableEvent::TuplesAdded(added));
        self.bus.emit(TableEvent::StatisticsChanged);
        Ok(added)
    }

    // ------------------------------------------------------------------
    // Column lifecycle
    // ------------------------------------------------------------------

    /// Return a column to the active view
    ///
    /// The column keeps its view position and its cached overall
    /// statistics; correlation maps for all enabled quantitative columns
    /// are rebuilt. A no-op for an already-enabled column.
    pub fn enable_column(&mut self, id: ColumnId) -> TableResult<()> {
        let slot = self.require_column(id)?;
        if self.columns[slot].is_enabled() {
            return Ok(());
        }

        self.columns[slot].set_enabled(true);
        self.refresh_statistics();
        self.bus.emit(TableEvent::ColumnEnabled(id));
        self.bus.emit(TableEvent::StatisticsChanged);
        Ok(())
    }

    /// Remove a column from the active view
    ///
    /// The column retains its data and cached statistics for re-enable.
    /// Any selection ranges on it are dropped (re-running the query), a
    /// highlighted or time designation on it is cleared, and correlation
    /// maps for the remaining enabled quantitative columns are rebuilt.
    /// A no-op for an already-disabled column.
    pub fn disable_column(&mut self, id: ColumnId) -> TableResult<()> {
        let slot = self.require_column(id)?;
        if !self.columns[slot].is_enabled() {
            return Ok(());
        }

        self.columns[slot].set_enabled(false);

        let highlight_cleared = self.highlighted == Some(id);
        if highlight_cleared {
            self.highlighted = None;
        }
        let time_cleared = self.time_column == Some(id);
        if time_cleared {
            self.time_column = None;
        }

        let selection_dropped = self.query.clear_column(id);
        if selection_dropped {
            self.mark_all_dirty();
            self.apply_query();
        }
        self.refresh_statistics();

        self.bus.emit(TableEvent::ColumnDisabled(id));
        if selection_dropped {
            self.bus.emit(TableEvent::SelectionRemoved { column: id });
        }
        if highlight_cleared {
            self.bus.emit(TableEvent::HighlightChanged(None));
        }
        if time_cleared {
            self.bus.emit(TableEvent::TimeColumnChanged(None));
        }
        self.bus.emit(TableEvent::StatisticsChanged);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Add a selection range to the active query
    ///
    /// The range's kind must match the column's kind. Recomputes query
    /// flags and query/non-query statistics for every column.
    pub fn add_selection_range(
        &mut self,
        column: ColumnId,
        range: SelectionRange,
    ) -> TableResult<()> {
        let slot = self.require_enabled(column)?;
        let expected = self.columns[slot].column_type();
        let actual = range_kind(&range);
        if expected != actual {
            return Err(TableError::WrongColumnType {
                id: column,
                expected,
                actual,
            });
        }

        self.query.add_range(column, range);
        self.mark_all_dirty();
        self.apply_query();
        self.refresh_statistics();
        self.bus.emit(TableEvent::SelectionAdded { column });
        self.bus.emit(TableEvent::StatisticsChanged);
        Ok(())
    }

    /// Remove one selection range from the active query
    ///
    /// The column reverts to unselected when its last range is removed.
    pub fn remove_selection_range(
        &mut self,
        column: ColumnId,
        range: &SelectionRange,
    ) -> TableResult<()> {
        self.require_column(column)?;
        self.query.remove_range(column, range)?;

        self.mark_all_dirty();
        self.apply_query();
        self.refresh_statistics();
        self.bus.emit(TableEvent::SelectionRemoved { column });
        self.bus.emit(TableEvent::StatisticsChanged);
        Ok(())
    }

    /// Reset every column to unselected
    pub fn clear_query(&mut self) {
        if !self.query.has_selections() {
            return;
        }
        self.query.clear();
        self.mark_all_dirty();
        self.apply_query();
        self.refresh_statistics();
        self.bus.emit(TableEvent::QueryCleared);
        self.bus.emit(TableEvent::StatisticsChanged);
    }

    /// Recompute every tuple's query flag and all query-dependent
    /// statistics
    ///
    /// Idempotent: on unchanged state this yields identical flags and
    /// statistics. Normally invoked internally after every query mutation;
    /// exposed so callers can force a recompute.
    pub fn recompute_query_flags(&mut self) {
        self.apply_query();
        self.mark_all_dirty();
        self.refresh_statistics();
        self.bus.emit(TableEvent::StatisticsChanged);
    }

    // ------------------------------------------------------------------
    // Tuple removal
    // ------------------------------------------------------------------

    /// Delete every row inside the query subset; returns the count removed
    ///
    /// The query is cleared (its ranges are no longer meaningful against
    /// the reduced row set) and all statistics are recomputed. An empty
    /// resulting table is valid; its summaries report no data.
    pub fn remove_selected_tuples(&mut self) -> usize {
        self.remove_tuples_where(true)
    }

    /// Delete every row outside the query subset; returns the count removed
    pub fn remove_unselected_tuples(&mut self) -> usize {
        self.remove_tuples_where(false)
    }

    fn remove_tuples_where(&mut self, flag: bool) -> usize {
        let before = self.tuples.len();
        self.tuples.retain(|t| t.query_flag() != flag);
        let removed = before - self.tuples.len();

        let had_query = self.query.has_selections();
        if removed == 0 && !had_query {
            return 0;
        }

        self.query.clear();
        self.mark_all_dirty();
        self.apply_query();
        self.refresh_statistics();

        self.bus.emit(TableEvent::TuplesRemoved(removed));
        if had_query {
            self.bus.emit(TableEvent::QueryCleared);
        }
        self.bus.emit(TableEvent::StatisticsChanged);
        removed
    }

    // ------------------------------------------------------------------
    // Derived algorithms
    // ------------------------------------------------------------------

    /// Reorder the enabled columns by descending |r| against a reference
    ///
    /// The reference column is pinned first. Correlations come from query
    /// statistics when `use_query` and a query is active, else from
    /// overall statistics. Columns with an undefined coefficient sort
    /// last; ties keep their prior relative order (stable sort), so
    /// re-invoking with identical inputs is a no-op. Disabled columns keep
    /// their relative order after the enabled ones. Only the view order
    /// changes; statistics are untouched.
    pub fn order_columns_by_correlation(
        &mut self,
        reference: ColumnId,
        use_query: bool,
    ) -> TableResult<()> {
        let slot = self.require_enabled(reference)?;
        self.require_quantitative(slot)?;

        let scope = self.correlation_scope(use_query);
        let correlations = self.columns[slot]
            .summary(scope)
            .and_then(ColumnSummary::numeric)
            .map(|num| num.correlations.clone())
            .unwrap_or_default();

        let mut enabled = self.enabled_column_ids();
        enabled.retain(|&id| id != reference);
        enabled.sort_by(|&a, &b| {
            compare_abs_correlation(correlations.get(&a), correlations.get(&b))
        });

        let mut order = Vec::with_capacity(self.order.len());
        order.push(reference);
        order.extend(enabled);
        order.extend(
            self.order
                .iter()
                .copied()
                .filter(|&id| !self.is_column_enabled(id)),
        );
        self.order = order;

        self.bus.emit(TableEvent::ColumnOrderChanged);
        Ok(())
    }

    /// Disable every enabled column too correlated with a reference
    ///
    /// Candidates are the enabled quantitative columns other than the
    /// reference and the time column. Each round recomputes correlations
    /// fresh, then disables the candidate with the largest |r| above
    /// `threshold`; it stops when no candidate exceeds the threshold.
    /// Returns the disabled column ids and emits one batch
    /// [`TableEvent::ColumnsDisabled`].
    pub fn run_multicollinearity_filter(
        &mut self,
        reference: ColumnId,
        use_query: bool,
        threshold: f64,
    ) -> TableResult<Vec<ColumnId>> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(TableError::InvalidThreshold(threshold));
        }
        let slot = self.require_enabled(reference)?;
        self.require_quantitative(slot)?;

        let mut disabled = Vec::new();
        let mut highlight_cleared = false;

        loop {
            let scope = self.correlation_scope(use_query);
            let candidate = self.columns[slot]
                .summary(scope)
                .and_then(ColumnSummary::numeric)
                .and_then(|num| {
                    num.correlations
                        .iter()
                        .filter(|(&id, _)| id != reference && Some(id) != self.time_column)
                        .filter(|(_, r)| r.abs() > threshold)
                        .max_by(|a, b| {
                            a.1.abs()
                                .partial_cmp(&b.1.abs())
                                .unwrap_or(Ordering::Equal)
                        })
                        .map(|(&id, _)| id)
                });

            let Some(id) = candidate else { break };
            let Some(victim) = self.columns.iter().position(|c| c.id() == id) else {
                break;
            };

            self.columns[victim].set_enabled(false);
            if self.highlighted == Some(id) {
                self.highlighted = None;
                highlight_cleared = true;
            }
            if self.query.clear_column(id) {
                self.mark_all_dirty();
                self.apply_query();
            }
            // fresh correlations before the next candidate is judged
            self.refresh_statistics();
            disabled.push(id);
        }

        if !disabled.is_empty() {
            if highlight_cleared {
                self.bus.emit(TableEvent::HighlightChanged(None));
            }
            self.bus.emit(TableEvent::ColumnsDisabled(disabled.clone()));
            self.bus.emit(TableEvent::StatisticsChanged);
        }
        Ok(disabled)
    }

    // ------------------------------------------------------------------
    // State setters
    // ------------------------------------------------------------------

    /// Highlight an enabled column
    pub fn set_highlighted_column(&mut self, id: ColumnId) -> TableResult<()> {
        self.require_enabled(id)?;
        if self.highlighted == Some(id) {
            return Ok(());
        }
        self.highlighted = Some(id);
        self.bus.emit(TableEvent::HighlightChanged(Some(id)));
        Ok(())
    }

    /// Clear the highlighted column
    pub fn clear_highlighted_column(&mut self) {
        if self.highlighted.take().is_some() {
            self.bus.emit(TableEvent::HighlightChanged(None));
        }
    }

    /// Designate an enabled temporal column as the time column
    ///
    /// At most one column holds the designation; setting it moves it.
    pub fn set_time_column(&mut self, id: ColumnId) -> TableResult<()> {
        let slot = self.require_enabled(id)?;
        let actual = self.columns[slot].column_type();
        if actual != ColumnType::Temporal {
            return Err(TableError::WrongColumnType {
                id,
                expected: ColumnType::Temporal,
                actual,
            });
        }
        if self.time_column == Some(id) {
            return Ok(());
        }
        self.time_column = Some(id);
        self.bus.emit(TableEvent::TimeColumnChanged(Some(id)));
        Ok(())
    }

    /// Clear the time column designation
    pub fn clear_time_column(&mut self) {
        if self.time_column.take().is_some() {
            self.bus.emit(TableEvent::TimeColumnChanged(None));
        }
    }

    /// Rename a column; names stay unique across enabled and disabled
    /// columns, and existing [`ColumnId`] references stay valid
    pub fn set_column_name(&mut self, id: ColumnId, name: impl Into<String>) -> TableResult<()> {
        let name = name.into();
        let slot = self.require_column(id)?;
        if self.columns[slot].name() == name {
            return Ok(());
        }
        if self.columns.iter().any(|c| c.id() != id && c.name() == name) {
            return Err(TableError::DuplicateName(name));
        }
        self.columns[slot].set_name(name.clone());
        self.bus.emit(TableEvent::ColumnRenamed { id, name });
        Ok(())
    }

    /// Treat a quantitative column's values as discrete
    pub fn make_column_discrete(&mut self, id: ColumnId) -> TableResult<()> {
        self.set_discrete(id, true)
    }

    /// Treat a quantitative column's values as continuous
    pub fn make_column_continuous(&mut self, id: ColumnId) -> TableResult<()> {
        self.set_discrete(id, false)
    }

    fn set_discrete(&mut self, id: ColumnId, discrete: bool) -> TableResult<()> {
        let slot = self.require_column(id)?;
        self.require_quantitative(slot)?;
        if self.columns[slot].is_discrete() == discrete {
            return Ok(());
        }
        self.columns[slot].set_discrete(discrete);
        self.bus
            .emit(TableEvent::ColumnDiscreteChanged { id, discrete });
        Ok(())
    }

    /// Change the histogram bin count and recompute every histogram
    pub fn set_histogram_bin_count(&mut self, bin_count: usize) -> TableResult<()> {
        if bin_count == 0 {
            return Err(StatsError::InvalidBinCount(0).into());
        }
        if bin_count == self.bin_count {
            return Ok(());
        }
        self.bin_count = bin_count;
        self.mark_all_dirty();
        self.refresh_statistics();
        self.bus.emit(TableEvent::StatisticsChanged);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn require_column(&self, id: ColumnId) -> TableResult<usize> {
        self.columns
            .iter()
            .position(|c| c.id() == id)
            .ok_or(TableError::UnknownColumn(id))
    }

    fn require_enabled(&self, id: ColumnId) -> TableResult<usize> {
        let slot = self.require_column(id)?;
        if !self.columns[slot].is_enabled() {
            return Err(TableError::ColumnNotEnabled(id));
        }
        Ok(slot)
    }

    fn require_quantitative(&self, slot: usize) -> TableResult<()> {
        let column = &self.columns[slot];
        if column.column_type() != ColumnType::Quantitative {
            return Err(TableError::WrongColumnType {
                id: column.id(),
                expected: ColumnType::Quantitative,
                actual: column.column_type(),
            });
        }
        Ok(())
    }

    fn is_column_enabled(&self, id: ColumnId) -> bool {
        self.columns.iter().any(|c| c.id() == id && c.is_enabled())
    }

    fn correlation_scope(&self, use_query: bool) -> StatsScope {
        if use_query && self.query.has_selections() {
            StatsScope::Query
        } else {
            StatsScope::Overall
        }
    }

    fn mark_all_dirty(&mut self) {
        for column in &mut self.columns {
            column.mark_dirty();
        }
    }

    /// Evaluate the query and store every tuple's flag
    fn apply_query(&mut self) {
        let mask = self.query.evaluate(&*self);
        for (tuple, flag) in self.tuples.iter_mut().zip(mask) {
            tuple.set_query_flag(flag);
        }
    }

    /// Rows belonging to one scope, in ascending index order
    fn scope_rows(&self, scope: StatsScope) -> Vec<usize> {
        match scope {
            StatsScope::Overall => (0..self.tuples.len()).collect(),
            StatsScope::Query => self
                .tuples
                .iter()
                .enumerate()
                .filter(|(_, t)| t.query_flag())
                .map(|(i, _)| i)
                .collect(),
            StatsScope::NonQuery => self
                .tuples
                .iter()
                .enumerate()
                .filter(|(_, t)| !t.query_flag())
                .map(|(i, _)| i)
                .collect(),
        }
    }

    /// Recompute summaries for dirty columns and correlation maps for all
    /// enabled quantitative columns, then mark everything clean
    fn refresh_statistics(&mut self) {
        let has_query = self.query.has_selections();
        let all_rows = self.scope_rows(StatsScope::Overall);
        let query_rows = if has_query {
            self.scope_rows(StatsScope::Query)
        } else {
            Vec::new()
        };
        let non_query_rows = if has_query {
            self.scope_rows(StatsScope::NonQuery)
        } else {
            Vec::new()
        };

        debug!(
            rows = self.tuples.len(),
            columns = self.columns.len(),
            dirty = self.columns.iter().filter(|c| c.is_dirty()).count(),
            query_active = has_query,
            "recomputing statistics"
        );

        for slot in 0..self.columns.len() {
            if !self.columns[slot].is_dirty() {
                continue;
            }
            let overall = self.summarize_column(slot, &all_rows);
            let query = if has_query {
                self.summarize_column(slot, &query_rows)
            } else {
                None
            };
            let non_query = if has_query {
                self.summarize_column(slot, &non_query_rows)
            } else {
                None
            };
            let column = &mut self.columns[slot];
            column.set_summaries(overall, query, non_query);
            column.mark_clean();
        }

        self.fill_correlations(StatsScope::Overall, &all_rows);
        if has_query {
            self.fill_correlations(StatsScope::Query, &query_rows);
            self.fill_correlations(StatsScope::NonQuery, &non_query_rows);
        }

        // disabled columns are excluded from the correlation space
        for column in self.columns.iter_mut().filter(|c| !c.is_enabled()) {
            column.clear_correlations();
        }
    }

    /// Summarize one column over a row subset; `None` when the subset has
    /// no values for it
    fn summarize_column(&self, slot: usize, rows: &[usize]) -> Option<ColumnSummary> {
        match self.columns[slot].column_type() {
            ColumnType::Quantitative => {
                let values: Vec<f64> = rows
                    .iter()
                    .filter_map(|&row| self.tuples[row].elements()[slot].as_real())
                    .collect();
                SummaryStats::from_values(&values, self.bin_count)
                    .ok()
                    .map(|stats| {
                        ColumnSummary::Quantitative(NumericSummary {
                            stats,
                            correlations: BTreeMap::new(),
                        })
                    })
            }
            ColumnType::Categorical => {
                let mut label_counts: BTreeMap<String, usize> = BTreeMap::new();
                let mut count = 0usize;
                for &row in rows {
                    if let Some(label) = self.tuples[row].elements()[slot].as_category() {
                        *label_counts.entry(label.to_string()).or_insert(0) += 1;
                        count += 1;
                    }
                }
                (count > 0).then(|| {
                    ColumnSummary::Categorical(CategorySummary {
                        count,
                        label_counts,
                    })
                })
            }
            ColumnType::Temporal => {
                let instants: Vec<DateTime<Utc>> = rows
                    .iter()
                    .filter_map(|&row| self.tuples[row].elements()[slot].as_instant())
                    .collect();
                match (instants.iter().min(), instants.iter().max()) {
                    (Some(&start), Some(&end)) => Some(ColumnSummary::Temporal(TemporalSummary {
                        count: instants.len(),
                        start,
                        end,
                    })),
                    _ => None,
                }
            }
        }
    }

    /// Rebuild the pairwise correlation maps of every enabled quantitative
    /// column over one scope's rows
    fn fill_correlations(&mut self, scope: StatsScope, rows: &[usize]) {
        let series: Vec<(usize, ColumnId, Vec<f64>)> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_enabled() && c.column_type() == ColumnType::Quantitative)
            .map(|(slot, c)| {
                let values = rows
                    .iter()
                    .map(|&row| {
                        self.tuples[row].elements()[slot]
                            .as_real()
                            .unwrap_or(f64::NAN)
                    })
                    .collect();
                (slot, c.id(), values)
            })
            .collect();

        let mut maps: Vec<BTreeMap<ColumnId, f64>> = vec![BTreeMap::new(); series.len()];
        for i in 0..series.len() {
            for j in (i + 1)..series.len() {
                // computed once per pair, so symmetry is exact
                let r = pearson(&series[i].2, &series[j].2);
                maps[i].insert(series[j].1, r);
                maps[j].insert(series[i].1, r);
            }
        }

        for ((slot, _, _), map) in series.iter().zip(maps) {
            self.columns[*slot].set_correlations(scope, map);
        }
    }
}

impl Default for DataTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RowContext for DataTable {
    fn real_value(&self, column: ColumnId, row: usize) -> Option<f64> {
        let slot = self.columns.iter().position(|c| c.id() == column)?;
        self.tuples.get(row)?.element(slot)?.as_real()
    }

    fn category_value(&self, column: ColumnId, row: usize) -> Option<&str> {
        let slot = self.columns.iter().position(|c| c.id() == column)?;
        self.tuples.get(row)?.element(slot)?.as_category()
    }

    fn instant_value(&self, column: ColumnId, row: usize) -> Option<DateTime<Utc>> {
        let slot = self.columns.iter().position(|c| c.id() == column)?;
        self.tuples.get(row)?.element(slot)?.as_instant()
    }

    fn row_count(&self) -> usize {
        self.tuples.len()
    }
}

/// The column kind a range filters
fn range_kind(range: &SelectionRange) -> ColumnType {
    match range {
        SelectionRange::Interval { .. } => ColumnType::Quantitative,
        SelectionRange::Categories(_) => ColumnType::Categorical,
        SelectionRange::TimeWindow { .. } => ColumnType::Temporal,
    }
}

/// Descending |r|; undefined coefficients order last
fn compare_abs_correlation(a: Option<&f64>, b: Option<&f64>) -> Ordering {
    let key = |r: Option<&f64>| r.map(|v| v.abs()).filter(|v| !v.is_nan());
    match (key(a), key(b)) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Check every tuple's arity and element kinds against the columns
fn validate_tuples(columns: &[Column], tuples: &[Tuple], base_index: usize) -> TableResult<()> {
    for (offset, tuple) in tuples.iter().enumerate() {
        if tuple.len() != columns.len() {
            return Err(TableError::ArityMismatch {
                index: base_index + offset,
                expected: columns.len(),
                actual: tuple.len(),
            });
        }
        for (slot, (value, column)) in tuple.elements().iter().zip(columns).enumerate() {
            if value.column_type() != column.column_type() {
                return Err(TableError::ElementTypeMismatch {
                    index: base_index + offset,
                    slot,
                    expected: column.column_type(),
                    actual: value.column_type(),
                });
            }
        }
    }
    Ok(())
}
