use crate::error::{MergeError, MergeResult};
use crate::value::Value;
use std::collections::HashMap;

/// A row-oriented table with named columns.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<impl Into<String>>) -> Self {
        let name = name.into();
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let column_index = columns
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.clone(), idx))
            .collect();

        Self {
            name,
            columns,
            column_index,
            rows: Vec::new(),
        }
    }

    /// Build a table from a column list and a set of rows, checking each row against the schema.
    pub fn from_rows(
        name: impl Into<String>,
        columns: Vec<impl Into<String>>,
        rows: impl IntoIterator<Item = Vec<Value>>,
    ) -> MergeResult<Self> {
        let mut table = Self::new(name, columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index.contains_key(column)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> MergeResult<()> {
        if row.len() != self.columns.len() {
            return Err(MergeError::SchemaMismatch {
                table: self.name.clone(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }

        self.rows.push(row);
        Ok(())
    }

    pub fn column_idx(&self, column: &str) -> Option<usize> {
        self.column_index.get(column).copied()
    }

    /// Like [`Table::column_idx`], but reports a missing column as an error.
    pub(crate) fn require_column(&self, column: &str) -> MergeResult<usize> {
        self.column_idx(column)
            .ok_or_else(|| MergeError::UnknownColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_idx(column)?;
        self.rows.get(row)?.get(idx)
    }

    pub fn value_by_idx(&self, row: usize, idx: usize) -> Option<&Value> {
        self.rows.get(row)?.get(idx)
    }

    /// Direct cell access for positions already validated against the schema.
    pub(crate) fn cell(&self, row: usize, idx: usize) -> &Value {
        &self.rows[row][idx]
    }

    pub fn row(&self, row: usize) -> Option<&[Value]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> MergeResult<()> {
        let name = name.into();
        if self.column_index.contains_key(&name) {
            return Err(MergeError::DuplicateColumn {
                table: self.name.clone(),
                column: name,
            });
        }
        if values.len() != self.rows.len() {
            return Err(MergeError::ColumnLengthMismatch {
                table: self.name.clone(),
                column: name,
                expected: self.rows.len(),
                actual: values.len(),
            });
        }

        let idx = self.columns.len();
        self.columns.push(name.clone());
        self.column_index.insert(name, idx);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Collect every value of one column in row order.
    pub fn column_values(&self, column: &str) -> Option<Vec<Value>> {
        let idx = self.column_idx(column)?;
        Some(self.rows.iter().map(|row| row[idx].clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_row_checks_schema_length() {
        let mut table = Table::new("roads", vec!["road", "interval_from"]);
        table.push_row(vec![Value::from("H001"), Value::from(0.0)]).unwrap();

        let err = table.push_row(vec![Value::from("H001")]).unwrap_err();
        assert!(matches!(
            err,
            MergeError::SchemaMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn add_column_rejects_duplicates_and_bad_lengths() {
        let mut table =
            Table::from_rows("t", vec!["a"], vec![vec![Value::from(1.0)], vec![Value::Blank]])
                .unwrap();

        assert!(matches!(
            table.add_column("a", vec![Value::Blank, Value::Blank]),
            Err(MergeError::DuplicateColumn { .. })
        ));
        assert!(matches!(
            table.add_column("b", vec![Value::Blank]),
            Err(MergeError::ColumnLengthMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));

        table
            .add_column("b", vec![Value::from("x"), Value::from("y")])
            .unwrap();
        assert_eq!(table.columns(), ["a", "b"]);
        assert_eq!(table.value(1, "b"), Some(&Value::from("y")));
        assert_eq!(table.value(1, "a"), Some(&Value::Blank));
    }
}
