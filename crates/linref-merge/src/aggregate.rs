//! Overlap-weighted aggregation strategies.
//!
//! Each strategy reduces the values of one column over the data rows overlapping a target row.
//! The weights passed in are overlap lengths and are expected to be positive; the merge drops
//! blank values and non-positive overlaps before calling into this module.

use crate::action::{Aggregation, AggregationKind};
use crate::error::{MergeError, MergeResult};
use crate::value::Value;

/// The value whose overlap is the longest. Ties go to the first of the tied maxima in input order.
pub fn keep_longest<'a>(candidates: &[(&'a Value, f64)]) -> Option<&'a Value> {
    let mut best: Option<(&'a Value, f64)> = None;
    for &(value, overlap) in candidates {
        match best {
            Some((_, longest)) if overlap <= longest => {}
            _ => best = Some((value, overlap)),
        }
    }
    best.map(|(value, _)| value)
}

pub fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `Σ(value × weight) / Σ(weight)`.
pub fn length_weighted_average(values: &[f64], weights: &[f64]) -> Option<f64> {
    debug_assert_eq!(values.len(), weights.len());
    let total: f64 = weights.iter().sum();
    if values.is_empty() || total <= 0.0 {
        return None;
    }
    let weighted: f64 = values.iter().zip(weights).map(|(v, w)| v * w).sum();
    Some(weighted / total)
}

/// Weighted percentile by linear interpolation over a cumulative weight curve.
///
/// The values are sorted ascending (carrying their weights). Point `i` of the curve sits at the
/// running sum of `(w[i-1] + w[i]) / 2`, starting from 0 at the smallest value, and the curve is
/// normalized so the largest value sits at exactly 1. `percentile` is then looked up on that curve
/// and the value interpolated linearly between the two neighbouring points. `0` and `1` return the
/// smallest and largest value respectively; a single value is returned as is.
pub fn length_weighted_percentile(values: &[f64], weights: &[f64], percentile: f64) -> Option<f64> {
    debug_assert_eq!(values.len(), weights.len());
    let mut points: Vec<(f64, f64)> = values.iter().copied().zip(weights.iter().copied()).collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (&(first, _), &(last, _)) = (points.first()?, points.last()?);
    if points.len() == 1 {
        return Some(first);
    }

    let mut cumulative = Vec::with_capacity(points.len());
    cumulative.push(0.0);
    for pair in points.windows(2) {
        let previous = cumulative[cumulative.len() - 1];
        cumulative.push(previous + (pair[0].1 + pair[1].1) / 2.0);
    }
    let total = cumulative[cumulative.len() - 1];
    if !(total > 0.0) {
        return None;
    }
    for x in cumulative.iter_mut() {
        *x /= total;
    }
    let end = cumulative.len() - 1;
    cumulative[end] = 1.0;

    if percentile <= 0.0 {
        return Some(first);
    }
    if percentile >= 1.0 {
        return Some(last);
    }

    // `cumulative[0] == 0 <= percentile < 1 == cumulative[end]`, so `hi` is in `1..=end`.
    let hi = cumulative.partition_point(|&x| x <= percentile);
    let lo = hi - 1;
    let span = cumulative[hi] - cumulative[lo];
    let (lo_value, hi_value) = (points[lo].0, points[hi].0);
    if span <= 0.0 {
        return Some(hi_value);
    }
    let t = (percentile - cumulative[lo]) / span;
    Some(lo_value + t * (hi_value - lo_value))
}

/// Reduce one column's candidates for a single target row.
///
/// `candidates` pairs each overlapping data row's value with its overlap length. Blank values and
/// non-positive overlaps are dropped first; if nothing remains the result is [`Value::Blank`].
pub(crate) fn aggregate_column(
    aggregation: Aggregation,
    column: &str,
    candidates: &[(&Value, f64)],
) -> MergeResult<Value> {
    let kept: Vec<(&Value, f64)> = candidates
        .iter()
        .copied()
        .filter(|(value, overlap)| !value.is_blank() && *overlap > 0.0)
        .collect();
    if kept.is_empty() {
        return Ok(Value::Blank);
    }

    let result = match aggregation.kind() {
        AggregationKind::KeepLongest => {
            return Ok(keep_longest(&kept).cloned().unwrap_or_default());
        }
        AggregationKind::Average => {
            let (values, _) = numeric_candidates(column, &kept)?;
            average(&values)
        }
        AggregationKind::LengthWeightedAverage => {
            let (values, weights) = numeric_candidates(column, &kept)?;
            length_weighted_average(&values, &weights)
        }
        AggregationKind::LengthWeightedPercentile => {
            let (values, weights) = numeric_candidates(column, &kept)?;
            let percentile = aggregation.percentile().unwrap_or(0.5);
            length_weighted_percentile(&values, &weights, percentile)
        }
    };
    Ok(result.map(Value::from).unwrap_or_default())
}

fn numeric_candidates(column: &str, kept: &[(&Value, f64)]) -> MergeResult<(Vec<f64>, Vec<f64>)> {
    let mut values = Vec::with_capacity(kept.len());
    let mut weights = Vec::with_capacity(kept.len());
    for &(value, overlap) in kept {
        let number = value.as_number().ok_or_else(|| MergeError::NonNumericValue {
            column: column.to_string(),
            value: value.clone(),
        })?;
        values.push(number);
        weights.push(overlap);
    }
    Ok((values, weights))
}
