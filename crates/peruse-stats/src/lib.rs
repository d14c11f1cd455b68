//! peruse-stats - Statistical primitives for tabular exploration
//!
//! This crate provides the computations the peruse table engine caches per
//! column and per row subset:
//!
//! - **SummaryStats**: moments and order statistics for one value subset
//! - **Histogram**: equal-width binning over a subset's own range
//! - **pearson**: pairwise Pearson correlation
//!
//! # Design Philosophy
//!
//! Every computation here is a pure function of its inputs. An empty subset
//! is a typed error ([`StatsError::EmptySubset`]), while an ill-defined
//! statistic over present data (zero variance, too few samples) is NaN, so
//! callers can always tell "no data" from "data with no defined value".

pub mod correlation;
pub mod histogram;
pub mod summary;

pub use correlation::*;
pub use histogram::*;
pub use summary::*;
