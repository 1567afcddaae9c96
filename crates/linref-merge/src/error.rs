use crate::value::Value;

pub type MergeResult<T> = Result<T, MergeError>;

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Parameter group_by={requested:?} did not match any columns in the target table")]
    KeyMismatch { requested: Vec<String> },

    #[error(
        "Parameter group_by={requested:?} did not match all columns in the target table. Only matched columns {matched:?}"
    )]
    PartialKeyMismatch {
        requested: Vec<String>,
        matched: Vec<String>,
    },

    #[error(
        "could not look up group {key:?}: {column} is {target_type} in the target table but the data table holds {data_types:?}"
    )]
    GroupingTypeError {
        key: Vec<Value>,
        column: String,
        target_type: String,
        data_types: Vec<String>,
    },

    #[error("unknown column {table}[{column}]")]
    UnknownColumn { table: String, column: String },

    #[error("duplicate column {table}[{column}]")]
    DuplicateColumn { table: String, column: String },

    #[error("schema mismatch for {table}: expected {expected} values, got {actual}")]
    SchemaMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("column length mismatch for {table}[{column}]: expected {expected} values, got {actual}")]
    ColumnLengthMismatch {
        table: String,
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("non-numeric interval bound in {table}[{column}] at row {row}: {value}")]
    NonNumericInterval {
        table: String,
        column: String,
        row: usize,
        value: Value,
    },

    #[error("cannot aggregate non-numeric value {value} from column {column}")]
    NonNumericValue { column: String, value: Value },

    #[error("config error: {0}")]
    Config(String),
}
