//! In-memory store for fixtures and tests.

use std::collections::BTreeMap;

use hz_core::{Row, Value};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::predicate::Predicate;
use crate::{RelationalStore, validate_identifier};

#[derive(Debug, Clone, Default)]
struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    fn column_index(&self, table: &str, column: &str) -> StoreResult<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| StoreError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })
    }
}

/// Declared tables held in memory, queried with the same contract as SQLite.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a table with its columns. Re-declaring keeps existing rows only
    /// if the column list is unchanged.
    pub fn declare(&mut self, table: &str, columns: &[&str]) -> StoreResult<()> {
        validate_identifier(table)?;
        for column in columns {
            validate_identifier(column)?;
        }
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let entry = self.tables.entry(table.to_string()).or_default();
        if entry.columns != columns {
            entry.columns = columns;
            entry.rows.clear();
        }
        Ok(())
    }

    /// Append a row; its arity must match the declared columns.
    pub fn insert(&mut self, table: &str, row: Row) -> StoreResult<()> {
        let t = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::MissingTable {
                table: table.to_string(),
            })?;
        if row.len() != t.columns.len() {
            return Err(StoreError::Arity {
                table: table.to_string(),
                expected: t.columns.len(),
                actual: row.len(),
            });
        }
        t.rows.push(row);
        Ok(())
    }

    /// Builder-style variant of [`MemoryStore::insert`] for many rows.
    pub fn insert_all(
        &mut self,
        table: &str,
        rows: impl IntoIterator<Item = Row>,
    ) -> StoreResult<()> {
        for row in rows {
            self.insert(table, row)?;
        }
        Ok(())
    }
}

impl RelationalStore for MemoryStore {
    fn table_exists(&self, table: &str) -> StoreResult<bool> {
        Ok(self.tables.contains_key(table))
    }

    fn table_columns(&self, table: &str) -> StoreResult<Vec<String>> {
        self.tables
            .get(table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| StoreError::MissingTable {
                table: table.to_string(),
            })
    }

    fn select(
        &self,
        table: &str,
        columns: &[&str],
        predicate: Option<&Predicate>,
    ) -> StoreResult<Vec<Row>> {
        let t = self
            .tables
            .get(table)
            .ok_or_else(|| StoreError::MissingTable {
                table: table.to_string(),
            })?;

        let projection = columns
            .iter()
            .map(|c| t.column_index(table, c))
            .collect::<StoreResult<Vec<_>>>()?;

        if let Some(p) = predicate {
            for column in p.columns() {
                t.column_index(table, column)?;
            }
        }

        let rows: Vec<Row> = t
            .rows
            .iter()
            .filter(|row| {
                predicate.is_none_or(|p| {
                    p.matches(&|c: &str| {
                        t.columns.iter().position(|name| name == c).map(|i| &row[i])
                    })
                })
            })
            .map(|row| projection.iter().map(|&i| row[i].clone()).collect())
            .collect();

        debug!(table, rows = rows.len(), "memory select");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn periods_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.declare("time_periods", &["t_periods", "flag"]).unwrap();
        store
            .insert_all(
                "time_periods",
                [
                    vec![Value::Integer(2010), Value::text("e")],
                    vec![Value::Integer(2020), Value::text("f")],
                    vec![Value::Integer(2030), Value::text("f")],
                ],
            )
            .unwrap();
        store
    }

    #[test]
    fn select_projects_columns_in_order() {
        let store = periods_store();
        let rows = store.select("time_periods", &["flag", "t_periods"], None).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec![Value::text("e"), Value::Integer(2010)]);
    }

    #[test]
    fn select_applies_predicate() {
        let store = periods_store();
        let p = Predicate::eq("flag", "f");
        let rows = store.select("time_periods", &["t_periods"], Some(&p)).unwrap();
        assert_eq!(rows, vec![vec![Value::Integer(2020)], vec![Value::Integer(2030)]]);
    }

    #[test]
    fn missing_table_and_column() {
        let store = periods_store();
        assert!(!store.table_exists("RampUp").unwrap());
        assert_eq!(store.table_columns("time_periods").unwrap(), vec!["t_periods", "flag"]);
        assert!(matches!(
            store.select("RampUp", &["tech"], None),
            Err(StoreError::MissingTable { .. })
        ));
        assert!(matches!(
            store.select("time_periods", &["nope"], None),
            Err(StoreError::UnknownColumn { .. })
        ));
        let p = Predicate::eq("nope", 1);
        assert!(store.select("time_periods", &["flag"], Some(&p)).is_err());
    }

    #[test]
    fn insert_checks_arity() {
        let mut store = periods_store();
        let err = store.insert("time_periods", vec![Value::Integer(1)]).unwrap_err();
        assert!(matches!(err, StoreError::Arity { expected: 2, actual: 1, .. }));
    }
}
