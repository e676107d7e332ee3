//! hz-store: read-only access to the relational input store.
//!
//! Provides:
//! - the `RelationalStore` contract (table existence + projected, filtered selects)
//! - typed predicates bound as parameters, never spliced into SQL
//! - a SQLite adapter over a single read-only connection
//! - an in-memory adapter for fixtures and tests

pub mod error;
pub mod memory;
pub mod predicate;
pub mod sqlite;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use predicate::Predicate;
pub use sqlite::SqliteStore;

use hz_core::Row;

/// Read-only tabular data source.
///
/// `select` returns rows whose arity matches `columns`, in the store's natural
/// row order.
pub trait RelationalStore {
    fn table_exists(&self, table: &str) -> StoreResult<bool>;

    /// Column names of an existing table, in declaration order.
    fn table_columns(&self, table: &str) -> StoreResult<Vec<String>>;

    fn select(
        &self,
        table: &str,
        columns: &[&str],
        predicate: Option<&Predicate>,
    ) -> StoreResult<Vec<Row>>;
}

impl<S: RelationalStore + ?Sized> RelationalStore for &S {
    fn table_exists(&self, table: &str) -> StoreResult<bool> {
        (**self).table_exists(table)
    }

    fn table_columns(&self, table: &str) -> StoreResult<Vec<String>> {
        (**self).table_columns(table)
    }

    fn select(
        &self,
        table: &str,
        columns: &[&str],
        predicate: Option<&Predicate>,
    ) -> StoreResult<Vec<Row>> {
        (**self).select(table, columns, predicate)
    }
}

/// Check that a table or column name is a plain SQL identifier.
pub fn validate_identifier(name: &str) -> StoreResult<()> {
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}
