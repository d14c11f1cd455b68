//! Columns and their statistics cache
//!
//! A column's identity is a stable [`ColumnId`] handle, valid across
//! rename, disable, and reorder. Each column caches one summary per scope
//! (overall / query / non-query); quantitative summaries also carry the
//! column's correlation coefficients against every other enabled
//! quantitative column, keyed by `ColumnId` rather than by position so
//! that reordering can never invalidate them.
//!
//! Cache freshness follows an explicit Clean/Dirty discipline: mutations
//! mark columns dirty, and the table recomputes and re-cleans them before
//! the mutating call returns, so read accessors never observe stale
//! statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::value::ColumnType;
use peruse_stats::SummaryStats;

pub use peruse_selection::ColumnId;

/// Which row subset a statistic describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsScope {
    /// Every row in the table
    Overall,
    /// Rows inside the active query
    Query,
    /// Rows outside the active query
    NonQuery,
}

/// Summary of a quantitative column over one scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericSummary {
    /// Descriptive statistics and histogram
    pub stats: SummaryStats,
    /// Pearson r against every other enabled quantitative column
    pub correlations: BTreeMap<ColumnId, f64>,
}

/// Summary of a categorical column over one scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Number of values summarized
    pub count: usize,
    /// Occurrences per label
    pub label_counts: BTreeMap<String, usize>,
}

impl CategorySummary {
    /// The label with the most occurrences (ties resolve to the
    /// lexicographically first label)
    pub fn most_frequent(&self) -> Option<(&str, usize)> {
        self.label_counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(label, &count)| (label.as_str(), count))
    }
}

/// Summary of a temporal column over one scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalSummary {
    /// Number of values summarized
    pub count: usize,
    /// Earliest instant
    pub start: DateTime<Utc>,
    /// Latest instant
    pub end: DateTime<Utc>,
}

/// Per-scope summary of a column, typed by the column's kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ColumnSummary {
    Quantitative(NumericSummary),
    Categorical(CategorySummary),
    Temporal(TemporalSummary),
}

impl ColumnSummary {
    /// Number of values summarized
    pub fn count(&self) -> usize {
        match self {
            ColumnSummary::Quantitative(s) => s.stats.count,
            ColumnSummary::Categorical(s) => s.count,
            ColumnSummary::Temporal(s) => s.count,
        }
    }

    /// The numeric summary, if this is a quantitative column
    pub fn numeric(&self) -> Option<&NumericSummary> {
        match self {
            ColumnSummary::Quantitative(s) => Some(s),
            _ => None,
        }
    }

    /// The category summary, if this is a categorical column
    pub fn categorical(&self) -> Option<&CategorySummary> {
        match self {
            ColumnSummary::Categorical(s) => Some(s),
            _ => None,
        }
    }

    /// The temporal summary, if this is a temporal column
    pub fn temporal(&self) -> Option<&TemporalSummary> {
        match self {
            ColumnSummary::Temporal(s) => Some(s),
            _ => None,
        }
    }
}

/// Cache freshness of a column's statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum CacheState {
    Clean,
    Dirty,
}

/// One dataset attribute with its cached statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    id: ColumnId,
    name: String,
    column_type: ColumnType,
    enabled: bool,
    discrete: bool,
    overall: Option<ColumnSummary>,
    query: Option<ColumnSummary>,
    non_query: Option<ColumnSummary>,
    cache: CacheState,
}

impl Column {
    /// Create an enabled column with no statistics yet
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            column_type,
            enabled: true,
            discrete: false,
            overall: None,
            query: None,
            non_query: None,
            cache: CacheState::Dirty,
        }
    }

    /// Mark a quantitative column as discrete at construction
    pub fn with_discrete(mut self) -> Self {
        self.discrete = true;
        self
    }

    /// Stable handle for this column
    pub fn id(&self) -> ColumnId {
        self.id
    }

    /// Current name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind of data this column holds
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Whether the column participates in the active view
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a quantitative column is treated as discrete
    pub fn is_discrete(&self) -> bool {
        self.discrete
    }

    /// The cached summary for one scope
    ///
    /// `None` means the scope has no data: the table is empty, or no query
    /// is active (for the query and non-query scopes), or the scope's
    /// subset contains no values for this column.
    pub fn summary(&self, scope: StatsScope) -> Option<&ColumnSummary> {
        match scope {
            StatsScope::Overall => self.overall.as_ref(),
            StatsScope::Query => self.query.as_ref(),
            StatsScope::NonQuery => self.non_query.as_ref(),
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_discrete(&mut self, discrete: bool) {
        self.discrete = discrete;
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.cache == CacheState::Dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.cache = CacheState::Dirty;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.cache = CacheState::Clean;
    }

    pub(crate) fn set_summaries(
        &mut self,
        overall: Option<ColumnSummary>,
        query: Option<ColumnSummary>,
        non_query: Option<ColumnSummary>,
    ) {
        self.overall = overall;
        self.query = query;
        self.non_query = non_query;
    }

    pub(crate) fn set_correlations(&mut self, scope: StatsScope, map: BTreeMap<ColumnId, f64>) {
        let summary = match scope {
            StatsScope::Overall => self.overall.as_mut(),
            StatsScope::Query => self.query.as_mut(),
            StatsScope::NonQuery => self.non_query.as_mut(),
        };
        if let Some(ColumnSummary::Quantitative(num)) = summary {
            num.correlations = map;
        }
    }

    pub(crate) fn clear_correlations(&mut self) {
        for summary in [
            self.overall.as_mut(),
            self.query.as_mut(),
            self.non_query.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            if let ColumnSummary::Quantitative(num) = summary {
                num.correlations.clear();
            }
        }
    }
}
