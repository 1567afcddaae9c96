//! Interval overlap joins for linear-referenced tables.
//!
//! Both input tables carry a numeric interval (`[from, to)`) along a shared linear measure, for
//! example a distance along a road. Rows are partitioned by a set of group-by columns, and for
//! every target row the overlapping data rows of the same group are collapsed to one value per
//! configured [`Action`]:
//! - [`AggregationKind::KeepLongest`]: the value with the longest overlap
//! - [`AggregationKind::Average`]: the plain mean of the overlapping values
//! - [`AggregationKind::LengthWeightedAverage`]: the mean weighted by overlap length
//! - [`AggregationKind::LengthWeightedPercentile`]: a weighted quantile, see
//!   [`aggregate::length_weighted_percentile`]
//!
//! The entry point is [`merge_by_overlapping_intervals`]; [`merge_with_config`] accepts a
//! deserialized [`MergeConfig`] instead.

#![forbid(unsafe_code)]

pub mod aggregate;
mod action;
mod config;
mod error;
mod group;
mod merge;
mod table;
mod value;

pub use crate::action::{Action, Aggregation, AggregationKind};
pub use crate::config::{IntervalColumns, MergeConfig};
pub use crate::error::{MergeError, MergeResult};
pub use crate::group::{GroupIndex, TargetGroups};
pub use crate::merge::{merge_by_overlapping_intervals, merge_with_config};
pub use crate::table::Table;
pub use crate::value::Value;
