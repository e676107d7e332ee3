//! SQLite adapter over one read-only connection.

use std::path::Path;

use hz_core::{Row, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, OpenFlags, params, params_from_iter};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::predicate::Predicate;
use crate::{RelationalStore, validate_identifier};

/// Relational store backed by a SQLite database file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database read-only. This subsystem never writes.
    pub fn open_read_only(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!(path = %path.as_ref().display(), "opened store read-only");
        Ok(Self { conn })
    }

    /// Wrap an already-open connection (e.g. an in-memory database).
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn build_query(
        table: &str,
        columns: &[&str],
        predicate: Option<&Predicate>,
    ) -> StoreResult<(String, Vec<SqlValue>)> {
        validate_identifier(table)?;
        for column in columns {
            validate_identifier(column)?;
        }

        let projection = columns
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {} FROM \"{}\"", projection, table);
        let mut binds = Vec::new();

        if let Some(p) = predicate {
            sql.push_str(" WHERE ");
            render_predicate(p, &mut sql, &mut binds)?;
        }
        Ok((sql, binds))
    }
}

fn render_predicate(
    predicate: &Predicate,
    sql: &mut String,
    binds: &mut Vec<SqlValue>,
) -> StoreResult<()> {
    match predicate {
        Predicate::Eq(c, v) => push_comparison(sql, binds, c, "=", v)?,
        Predicate::Lt(c, v) => push_comparison(sql, binds, c, "<", v)?,
        Predicate::Le(c, v) => push_comparison(sql, binds, c, "<=", v)?,
        Predicate::Gt(c, v) => push_comparison(sql, binds, c, ">", v)?,
        Predicate::Ge(c, v) => push_comparison(sql, binds, c, ">=", v)?,
        Predicate::StartsWith(c, prefix) => {
            // substr keeps the match case-sensitive, unlike LIKE
            validate_identifier(c)?;
            sql.push_str(&format!("substr(\"{}\", 1, ?) = ?", c));
            binds.push(SqlValue::Integer(prefix.chars().count() as i64));
            binds.push(SqlValue::Text(prefix.clone()));
        }
        Predicate::And(parts) => {
            if parts.is_empty() {
                sql.push_str("1");
            }
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    sql.push_str(" AND ");
                }
                sql.push('(');
                render_predicate(part, sql, binds)?;
                sql.push(')');
            }
        }
    }
    Ok(())
}

fn push_comparison(
    sql: &mut String,
    binds: &mut Vec<SqlValue>,
    column: &str,
    op: &str,
    value: &Value,
) -> StoreResult<()> {
    validate_identifier(column)?;
    sql.push_str(&format!("\"{}\" {} ?", column, op));
    binds.push(to_sql_value(value));
    Ok(())
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(r) => SqlValue::Real(r.0),
        Value::Text(s) => SqlValue::Text(s.clone()),
    }
}

fn from_sql_ref(value: ValueRef<'_>, table: &str, column: &str) -> StoreResult<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(i) => Ok(Value::Integer(i)),
        ValueRef::Real(r) => Ok(Value::real(r)),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Ok(Value::Text(text.to_string())),
            Err(_) => Err(StoreError::InvalidText {
                table: table.to_string(),
                column: column.to_string(),
            }),
        },
        ValueRef::Blob(_) => Err(StoreError::UnsupportedType {
            table: table.to_string(),
            column: column.to_string(),
        }),
    }
}

impl RelationalStore for SqliteStore {
    fn table_exists(&self, table: &str) -> StoreResult<bool> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        Ok(stmt.exists(params![table])?)
    }

    fn table_columns(&self, table: &str) -> StoreResult<Vec<String>> {
        validate_identifier(table)?;
        if !self.table_exists(table)? {
            return Err(StoreError::MissingTable {
                table: table.to_string(),
            });
        }
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT name FROM pragma_table_info('{}')", table))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn select(
        &self,
        table: &str,
        columns: &[&str],
        predicate: Option<&Predicate>,
    ) -> StoreResult<Vec<Row>> {
        if !self.table_exists(table)? {
            return Err(StoreError::MissingTable {
                table: table.to_string(),
            });
        }

        let (sql, binds) = Self::build_query(table, columns, predicate)?;
        let mut stmt = self.conn.prepare(&sql)?;
        let mut cursor = stmt.query(params_from_iter(binds))?;

        let mut rows = Vec::new();
        while let Some(record) = cursor.next()? {
            let mut row = Vec::with_capacity(columns.len());
            for (i, column) in columns.iter().enumerate() {
                row.push(from_sql_ref(record.get_ref(i)?, table, column)?);
            }
            rows.push(row);
        }

        debug!(table, rows = rows.len(), "sqlite select");
        Ok(rows)
    }
}
