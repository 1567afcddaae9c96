//! Partitioning of the target and data tables by their group-by columns.
//!
//! Overlap tests only ever compare rows that share the same group key, so the data table is
//! indexed once by key ([`GroupIndex`]) and the target table is walked group by group
//! ([`TargetGroups`]). A blank key component never matches anything, mirroring SQL `NULL`
//! semantics: data rows with a blank key are left out of the index and target rows with a blank key
//! find no candidates.

use crate::error::{MergeError, MergeResult};
use crate::table::Table;
use crate::value::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Data rows indexed by group key.
#[derive(Clone, Debug)]
pub struct GroupIndex {
    key_columns: Vec<String>,
    groups: HashMap<Vec<Value>, Vec<usize>>,
    // Distinct non-blank value types seen in each key column, for lookup diagnostics.
    key_types: Vec<BTreeSet<&'static str>>,
}

impl GroupIndex {
    /// Index every row of `data` by its `group_by` values.
    ///
    /// Rows within a group are kept in their original table order, which is the order candidates
    /// are visited in (and so decides ties for [`crate::AggregationKind::KeepLongest`]).
    pub fn build(data: &Table, group_by: &[String]) -> MergeResult<Self> {
        let key_idxs = group_by
            .iter()
            .map(|column| data.require_column(column))
            .collect::<MergeResult<Vec<_>>>()?;

        let mut groups: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
        let mut key_types = vec![BTreeSet::new(); key_idxs.len()];
        let mut skipped = 0usize;
        for row in 0..data.row_count() {
            let key: Vec<Value> = key_idxs
                .iter()
                .map(|&idx| data.cell(row, idx).clone())
                .collect();
            if key.iter().any(Value::is_blank) {
                skipped += 1;
                continue;
            }
            for (types, value) in key_types.iter_mut().zip(&key) {
                types.insert(value.type_name());
            }
            groups.entry(key).or_default().push(row);
        }

        log::debug!(
            "indexed {} rows of {} into {} groups ({} rows with blank keys skipped)",
            data.row_count() - skipped,
            data.name(),
            groups.len(),
            skipped
        );

        Ok(Self {
            key_columns: group_by.to_vec(),
            groups,
            key_types,
        })
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Data rows sharing `key`, in original row order.
    ///
    /// A key with no data rows yields an empty slice. A key whose value types cannot occur in the
    /// data table (for example a number looked up against a text column) is reported as
    /// [`MergeError::GroupingTypeError`] instead, since every lookup from that table would miss.
    pub fn lookup(&self, key: &[Value]) -> MergeResult<&[usize]> {
        if key.iter().any(Value::is_blank) {
            return Ok(&[]);
        }
        if let Some(rows) = self.groups.get(key) {
            return Ok(rows);
        }

        for ((column, types), value) in self.key_columns.iter().zip(&self.key_types).zip(key) {
            if types.is_empty() || types.contains(value.type_name()) {
                continue;
            }
            log::error!(
                "could not look up group {key:?} in the data table grouped by {:?}",
                self.key_columns
            );
            for (name, seen) in self.key_columns.iter().zip(&self.key_types) {
                log::error!("  data column {name}: value types {seen:?}");
            }
            log::error!(
                "  target key value types: {:?}",
                key.iter().map(Value::type_name).collect::<Vec<_>>()
            );
            return Err(MergeError::GroupingTypeError {
                key: key.to_vec(),
                column: column.clone(),
                target_type: value.type_name().to_string(),
                data_types: types.iter().map(|t| t.to_string()).collect(),
            });
        }

        Ok(&[])
    }
}

/// The target table split into groups, each listing its row positions.
#[derive(Clone, Debug)]
pub struct TargetGroups {
    groups: Vec<(Vec<Value>, Vec<usize>)>,
}

impl TargetGroups {
    /// Partition `target` by `group_by`.
    ///
    /// Groups are ordered by key and every target row lands in exactly one group.
    pub fn partition(target: &Table, group_by: &[String]) -> MergeResult<Self> {
        if group_by.is_empty() {
            return Err(MergeError::InvalidConfiguration(
                "group_by must name at least one column".to_string(),
            ));
        }

        let matched: Vec<String> = group_by
            .iter()
            .filter(|column| target.has_column(column))
            .cloned()
            .collect();
        if matched.is_empty() {
            return Err(MergeError::KeyMismatch {
                requested: group_by.to_vec(),
            });
        }
        if matched.len() != group_by.len() {
            return Err(MergeError::PartialKeyMismatch {
                requested: group_by.to_vec(),
                matched,
            });
        }

        let key_idxs = group_by
            .iter()
            .map(|column| target.require_column(column))
            .collect::<MergeResult<Vec<_>>>()?;

        let mut groups: BTreeMap<Vec<Value>, Vec<usize>> = BTreeMap::new();
        for row in 0..target.row_count() {
            let key = key_idxs
                .iter()
                .map(|&idx| target.cell(row, idx).clone())
                .collect();
            groups.entry(key).or_default().push(row);
        }

        Ok(Self {
            groups: groups.into_iter().collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[Value], &[usize])> {
        self.groups
            .iter()
            .map(|(key, rows)| (key.as_slice(), rows.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    fn data() -> Table {
        Table::from_rows(
            "data",
            vec!["road", "cway", "v"],
            vec![
                vec![Value::from("H001"), Value::from("L"), Value::from(1.0)],
                vec![Value::from("H001"), Value::from("R"), Value::from(2.0)],
                vec![Value::from("H001"), Value::from("L"), Value::from(3.0)],
                vec![Value::Blank, Value::from("L"), Value::from(4.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn index_keeps_original_row_order_within_groups() {
        let index = GroupIndex::build(&data(), &keys(&["road", "cway"])).unwrap();
        assert_eq!(index.group_count(), 2);
        assert_eq!(
            index.lookup(&[Value::from("H001"), Value::from("L")]).unwrap(),
            &[0, 2]
        );
        assert_eq!(
            index.lookup(&[Value::from("H001"), Value::from("R")]).unwrap(),
            &[1]
        );
    }

    #[test]
    fn missing_and_blank_keys_have_no_rows() {
        let index = GroupIndex::build(&data(), &keys(&["road", "cway"])).unwrap();
        assert!(index
            .lookup(&[Value::from("H002"), Value::from("L")])
            .unwrap()
            .is_empty());
        assert!(index
            .lookup(&[Value::Blank, Value::from("L")])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn heterogeneous_key_types_are_an_error() {
        let index = GroupIndex::build(&data(), &keys(&["road"])).unwrap();
        let err = index.lookup(&[Value::from(1.0)]).unwrap_err();
        match err {
            MergeError::GroupingTypeError {
                column,
                target_type,
                data_types,
                ..
            } => {
                assert_eq!(column, "road");
                assert_eq!(target_type, "number");
                assert_eq!(data_types, vec!["text"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn index_requires_key_columns_in_data() {
        let err = GroupIndex::build(&data(), &keys(&["road", "region"])).unwrap_err();
        assert!(matches!(
            err,
            MergeError::UnknownColumn { ref table, ref column } if table == "data" && column == "region"
        ));
    }

    #[test]
    fn partition_covers_every_target_row_once() {
        let groups = TargetGroups::partition(&data(), &keys(&["cway"])).unwrap();
        let collected: Vec<(Vec<Value>, Vec<usize>)> = groups
            .iter()
            .map(|(key, rows)| (key.to_vec(), rows.to_vec()))
            .collect();
        assert_eq!(
            collected,
            vec![
                (vec![Value::from("L")], vec![0, 2, 3]),
                (vec![Value::from("R")], vec![1]),
            ]
        );
    }

    #[test]
    fn partition_reports_key_mismatches() {
        let err = TargetGroups::partition(&data(), &keys(&["region", "lane"])).unwrap_err();
        assert!(matches!(err, MergeError::KeyMismatch { .. }));
        assert!(err.to_string().contains("did not match any columns"));

        let err = TargetGroups::partition(&data(), &keys(&["road", "lane"])).unwrap_err();
        let message = err.to_string();
        match err {
            MergeError::PartialKeyMismatch { matched, .. } => assert_eq!(matched, vec!["road"]),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(message.contains("Only matched columns [\"road\"]"), "{message}");
    }
}
