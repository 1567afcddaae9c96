use crate::config::{ActionConfig, AggregationConfig};
use crate::error::{MergeError, MergeResult};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AggregationKind {
    KeepLongest,
    Average,
    LengthWeightedAverage,
    LengthWeightedPercentile,
}

/// How the overlapping values of one column are collapsed to a single value.
///
/// Use the constructors; a percentile aggregation is validated when it is built, so every
/// `Aggregation` that exists carries a percentile in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "AggregationConfig")]
pub struct Aggregation {
    kind: AggregationKind,
    percentile: Option<f64>,
}

impl Aggregation {
    pub fn keep_longest() -> Self {
        Self {
            kind: AggregationKind::KeepLongest,
            percentile: None,
        }
    }

    pub fn average() -> Self {
        Self {
            kind: AggregationKind::Average,
            percentile: None,
        }
    }

    pub fn length_weighted_average() -> Self {
        Self {
            kind: AggregationKind::LengthWeightedAverage,
            percentile: None,
        }
    }

    pub fn length_weighted_percentile(percentile: f64) -> MergeResult<Self> {
        if !(0.0..=1.0).contains(&percentile) {
            let hint = if percentile > 1.0 {
                " Did you need to divide by 100?"
            } else {
                ""
            };
            return Err(MergeError::InvalidConfiguration(format!(
                "Percentile out of range. Must be between 0.0 and 1.0. Got {percentile}.{hint}"
            )));
        }
        Ok(Self {
            kind: AggregationKind::LengthWeightedPercentile,
            percentile: Some(percentile),
        })
    }

    pub fn kind(&self) -> AggregationKind {
        self.kind
    }

    /// The requested quantile; `Some` exactly when the kind is `LengthWeightedPercentile`.
    pub fn percentile(&self) -> Option<f64> {
        self.percentile
    }
}

impl TryFrom<AggregationConfig> for Aggregation {
    type Error = MergeError;

    fn try_from(config: AggregationConfig) -> MergeResult<Self> {
        Ok(match config {
            AggregationConfig::KeepLongest => Self::keep_longest(),
            AggregationConfig::Average => Self::average(),
            AggregationConfig::LengthWeightedAverage => Self::length_weighted_average(),
            AggregationConfig::LengthWeightedPercentile(p) => Self::length_weighted_percentile(p)?,
        })
    }
}

/// One output column of a merge: read `column` from the data table, aggregate it, and write the
/// result to `output_name` on the target table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "ActionConfig")]
pub struct Action {
    column: String,
    aggregation: Aggregation,
    output_name: String,
}

impl Action {
    pub fn new(column: impl Into<String>, aggregation: Aggregation) -> Self {
        let column = column.into();
        Self {
            output_name: column.clone(),
            column,
            aggregation,
        }
    }

    pub fn renamed(
        column: impl Into<String>,
        aggregation: Aggregation,
        rename: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            aggregation,
            output_name: rename.into(),
        }
    }

    pub fn with_rename(mut self, rename: impl Into<String>) -> Self {
        self.output_name = rename.into();
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }
}

impl From<ActionConfig> for Action {
    fn from(config: ActionConfig) -> Self {
        match config.rename {
            Some(rename) => Self::renamed(config.column, config.aggregation, rename),
            None => Self::new(config.column, config.aggregation),
        }
    }
}
