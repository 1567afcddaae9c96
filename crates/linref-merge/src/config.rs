//! Serialization-friendly merge configuration.
//!
//! A merge can be described as JSON:
//!
//! ```json
//! {
//!   "group_by": ["road", "carriageway"],
//!   "interval_columns": { "from": "slk_from", "to": "slk_to" },
//!   "actions": [
//!     { "column": "surface", "aggregation": "keep_longest" },
//!     { "column": "aadt", "aggregation": "length_weighted_average", "rename": "traffic" },
//!     { "column": "roughness", "aggregation": { "length_weighted_percentile": 0.75 } }
//!   ]
//! }
//! ```
//!
//! `interval_columns` may be omitted and defaults to `interval_from` / `interval_to`. Percentiles
//! are validated while deserializing.

use crate::action::{Action, Aggregation};
use crate::error::{MergeError, MergeResult};
use serde::Deserialize;

pub const DEFAULT_FROM_COLUMN: &str = "interval_from";
pub const DEFAULT_TO_COLUMN: &str = "interval_to";

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum AggregationConfig {
    KeepLongest,
    Average,
    LengthWeightedAverage,
    LengthWeightedPercentile(f64),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ActionConfig {
    pub(crate) column: String,
    pub(crate) aggregation: Aggregation,
    #[serde(default)]
    pub(crate) rename: Option<String>,
}

/// Names of the columns holding the start and end of each row's interval.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntervalColumns {
    pub from: String,
    pub to: String,
}

impl IntervalColumns {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Default for IntervalColumns {
    fn default() -> Self {
        Self::new(DEFAULT_FROM_COLUMN, DEFAULT_TO_COLUMN)
    }
}

/// Everything [`crate::merge_with_config`] needs besides the two tables.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    pub group_by: Vec<String>,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub interval_columns: IntervalColumns,
}

impl MergeConfig {
    pub fn new(group_by: Vec<impl Into<String>>, actions: Vec<Action>) -> Self {
        Self {
            group_by: group_by.into_iter().map(Into::into).collect(),
            actions,
            interval_columns: IntervalColumns::default(),
        }
    }

    pub fn with_interval_columns(mut self, interval_columns: IntervalColumns) -> Self {
        self.interval_columns = interval_columns;
        self
    }

    pub fn from_json(json: &str) -> MergeResult<Self> {
        serde_json::from_str(json).map_err(|err| MergeError::Config(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::AggregationKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_config() {
        let config = MergeConfig::from_json(
            r#"{
                "group_by": ["road", "cway"],
                "interval_columns": { "from": "slk_from", "to": "slk_to" },
                "actions": [
                    { "column": "surface", "aggregation": "keep_longest" },
                    { "column": "aadt", "aggregation": "length_weighted_average", "rename": "traffic" },
                    { "column": "iri", "aggregation": { "length_weighted_percentile": 0.75 } }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.group_by, vec!["road", "cway"]);
        assert_eq!(config.interval_columns, IntervalColumns::new("slk_from", "slk_to"));
        assert_eq!(
            config.actions,
            vec![
                Action::new("surface", Aggregation::keep_longest()),
                Action::renamed("aadt", Aggregation::length_weighted_average(), "traffic"),
                Action::new("iri", Aggregation::length_weighted_percentile(0.75).unwrap()),
            ]
        );
        assert_eq!(
            config.actions[2].aggregation().kind(),
            AggregationKind::LengthWeightedPercentile
        );
    }

    #[test]
    fn interval_columns_default_when_omitted() {
        let config = MergeConfig::from_json(
            r#"{ "group_by": ["road"], "actions": [{ "column": "x", "aggregation": "average" }] }"#,
        )
        .unwrap();
        assert_eq!(config.interval_columns, IntervalColumns::default());
        assert_eq!(config.interval_columns.from, "interval_from");
        assert_eq!(config.interval_columns.to, "interval_to");
    }

    #[test]
    fn out_of_range_percentile_fails_to_parse() {
        let err = MergeConfig::from_json(
            r#"{
                "group_by": ["road"],
                "actions": [{ "column": "x", "aggregation": { "length_weighted_percentile": 90 } }]
            }"#,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, MergeError::Config(_)));
        assert!(message.contains("divide by 100"), "{message}");
    }

    #[test]
    fn unknown_aggregation_fails_to_parse() {
        let err = MergeConfig::from_json(
            r#"{ "group_by": ["road"], "actions": [{ "column": "x", "aggregation": "median" }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::Config(_)));
    }
}
