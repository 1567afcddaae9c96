//! The interval overlap join.
//!
//! For each target group the matching data rows are looked up once; each target row in the group
//! then filters those rows down to the ones whose interval overlaps its own, measures the overlap
//! lengths, and reduces every configured column with [`crate::aggregate`]. Results are attached to
//! a copy of the target table by row position, so target rows without any overlap keep blank
//! output columns.

use crate::action::Action;
use crate::aggregate::aggregate_column;
use crate::config::{IntervalColumns, MergeConfig};
use crate::error::{MergeError, MergeResult};
use crate::group::{GroupIndex, TargetGroups};
use crate::table::Table;
use crate::value::Value;
use std::collections::HashSet;

/// A data row overlapping the current target row.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    row: usize,
    overlap: f64,
}

/// Join `data` onto `target` by overlapping intervals within matching groups.
///
/// The returned table has the rows and columns of `target`, unchanged and in the same order,
/// followed by one column per action named by [`Action::output_name`]. An output cell is blank
/// when no data row of the same group overlaps the target row, or when every overlapping value of
/// that column is blank.
///
/// Intervals are half-open: rows that only touch at a boundary do not overlap.
pub fn merge_by_overlapping_intervals<S: AsRef<str>>(
    target: &Table,
    data: &Table,
    group_by: &[S],
    actions: &[Action],
    interval_columns: &IntervalColumns,
) -> MergeResult<Table> {
    let group_by: Vec<String> = group_by.iter().map(|c| c.as_ref().to_string()).collect();

    let target_groups = TargetGroups::partition(target, &group_by)?;
    validate_output_names(target, actions)?;

    let target_bounds = interval_bounds(target, interval_columns)?;
    let data_bounds = interval_bounds(data, interval_columns)?;
    let source_idxs = actions
        .iter()
        .map(|action| data.require_column(action.column()))
        .collect::<MergeResult<Vec<_>>>()?;
    let index = GroupIndex::build(data, &group_by)?;

    log::debug!(
        "merging {} target rows in {} groups against {} data groups ({} actions)",
        target.row_count(),
        target_groups.len(),
        index.group_count(),
        actions.len()
    );

    let mut results: Vec<Option<Vec<Value>>> = vec![None; target.row_count()];
    let mut candidates = Vec::new();
    for (key, target_rows) in target_groups.iter() {
        let data_rows = index.lookup(key)?;
        if data_rows.is_empty() {
            log::debug!(
                "no data rows for group {key:?}; {} target rows left blank",
                target_rows.len()
            );
            continue;
        }

        for &target_row in target_rows {
            let (t_from, t_to) = target_bounds[target_row];
            candidates.clear();
            candidates.extend(data_rows.iter().filter_map(|&row| {
                let (d_from, d_to) = data_bounds[row];
                (d_from < t_to && d_to > t_from).then(|| Candidate {
                    row,
                    overlap: d_to.min(t_to) - d_from.max(t_from),
                })
            }));
            log::trace!(
                "target row {target_row}: {} of {} data rows overlap",
                candidates.len(),
                data_rows.len()
            );
            if candidates.is_empty() {
                continue;
            }

            results[target_row] = Some(aggregate_row(data, actions, &source_idxs, &candidates)?);
        }
    }

    left_join_results(target, actions, results)
}

/// [`merge_by_overlapping_intervals`] driven by a [`MergeConfig`].
pub fn merge_with_config(target: &Table, data: &Table, config: &MergeConfig) -> MergeResult<Table> {
    merge_by_overlapping_intervals(
        target,
        data,
        config.group_by.as_slice(),
        &config.actions,
        &config.interval_columns,
    )
}

fn aggregate_row(
    data: &Table,
    actions: &[Action],
    source_idxs: &[usize],
    candidates: &[Candidate],
) -> MergeResult<Vec<Value>> {
    let mut row = Vec::with_capacity(actions.len());
    let mut column_candidates = Vec::with_capacity(candidates.len());
    for (action, &idx) in actions.iter().zip(source_idxs) {
        column_candidates.clear();
        column_candidates.extend(
            candidates
                .iter()
                .map(|c| (data.cell(c.row, idx), c.overlap)),
        );
        row.push(aggregate_column(
            action.aggregation(),
            action.column(),
            &column_candidates,
        )?);
    }
    Ok(row)
}

/// Attach per-row results to a copy of `target`. Rows without a result get blank outputs.
fn left_join_results(
    target: &Table,
    actions: &[Action],
    results: Vec<Option<Vec<Value>>>,
) -> MergeResult<Table> {
    let matched = results.iter().filter(|r| r.is_some()).count();
    log::debug!(
        "{matched} of {} target rows received aggregated values",
        target.row_count()
    );

    let mut columns: Vec<Vec<Value>> = actions
        .iter()
        .map(|_| Vec::with_capacity(results.len()))
        .collect();
    for result in results {
        match result {
            Some(values) => {
                for (column, value) in columns.iter_mut().zip(values) {
                    column.push(value);
                }
            }
            None => {
                for column in columns.iter_mut() {
                    column.push(Value::Blank);
                }
            }
        }
    }

    let mut output = target.clone();
    for (action, values) in actions.iter().zip(columns) {
        output.add_column(action.output_name(), values)?;
    }
    Ok(output)
}

fn validate_output_names(target: &Table, actions: &[Action]) -> MergeResult<()> {
    let mut seen = HashSet::new();
    for action in actions {
        let name = action.output_name();
        if target.has_column(name) || !seen.insert(name) {
            return Err(MergeError::DuplicateColumn {
                table: target.name().to_string(),
                column: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Read every row's `(from, to)` bounds. Blank bounds become NaN, which never overlaps anything.
fn interval_bounds(table: &Table, columns: &IntervalColumns) -> MergeResult<Vec<(f64, f64)>> {
    let from_idx = table.require_column(&columns.from)?;
    let to_idx = table.require_column(&columns.to)?;

    let bound = |row: usize, idx: usize, column: &str| -> MergeResult<f64> {
        match table.cell(row, idx) {
            Value::Blank => Ok(f64::NAN),
            Value::Number(n) => Ok(n.0),
            other => Err(MergeError::NonNumericInterval {
                table: table.name().to_string(),
                column: column.to_string(),
                row,
                value: other.clone(),
            }),
        }
    };

    (0..table.row_count())
        .map(|row| {
            Ok((
                bound(row, from_idx, &columns.from)?,
                bound(row, to_idx, &columns.to)?,
            ))
        })
        .collect()
}
