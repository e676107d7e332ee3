//! Store-specific error types.

use hz_core::HzError;
use thiserror::Error;

/// Errors raised while reading from the relational store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Table not found: {table}")]
    MissingTable { table: String },

    #[error("Column '{column}' not found in table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("Invalid identifier: {name:?}")]
    InvalidIdentifier { name: String },

    #[error("Row arity mismatch in '{table}': expected {expected}, got {actual}")]
    Arity {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported column type in '{table}.{column}'")]
    UnsupportedType { table: String, column: String },

    #[error("Invalid UTF-8 text in '{table}.{column}'")]
    InvalidText { table: String, column: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for HzError {
    fn from(err: StoreError) -> Self {
        HzError::Store {
            what: err.to_string(),
        }
    }
}
