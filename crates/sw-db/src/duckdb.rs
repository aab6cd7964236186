//! DuckDB backend

use crate::connection::{Connection, Queryable, Transaction, Value};
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::sql_database::SqlDatabase;
use crate::version_store::StoreOptions;
use duckdb::{params_from_iter, Error as DuckDbError};
use std::path::Path;

/// DuckDB database with a version table
pub type DuckDbDatabase = SqlDatabase<DuckDbConnection>;

/// DuckDB connection
pub struct DuckDbConnection {
    conn: duckdb::Connection,
}

impl DuckDbConnection {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn = duckdb::Connection::open_in_memory()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = duckdb::Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", path.display(), e)))?;
        Ok(Self { conn })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    pub fn inner(&self) -> &duckdb::Connection {
        &self.conn
    }
}

impl SqlDatabase<DuckDbConnection> {
    pub fn open(path: &str, options: StoreOptions) -> DbResult<Self> {
        Self::new(DuckDbConnection::new(path)?, options)
    }

    pub fn in_memory(options: StoreOptions) -> DbResult<Self> {
        Self::new(DuckDbConnection::in_memory()?, options)
    }
}

/// Reading an integer column as `String` is a type error, so try text first
/// and fall back to integers. NULL reads as `None` under either type.
fn column_value(row: &duckdb::Row<'_>) -> Value {
    if let Ok(Some(s)) = row.get::<_, Option<String>>(0) {
        return Value::Text(s);
    }
    if let Ok(Some(n)) = row.get::<_, Option<i64>>(0) {
        return Value::Integer(n);
    }
    Value::Null
}

fn query_value(conn: &duckdb::Connection, sql: &str, params: &[&str]) -> DbResult<Option<Value>> {
    match conn.query_row(sql, params_from_iter(params.iter()), |row| Ok(column_value(row))) {
        Ok(value) => Ok(Some(value)),
        Err(DuckDbError::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DbError::ExecutionError(format!("{}: {}", e, sql))),
    }
}

impl Queryable for DuckDbConnection {
    fn query_value(&mut self, sql: &str, params: &[&str]) -> DbResult<Option<Value>> {
        query_value(&self.conn, sql, params)
    }
}

impl Connection for DuckDbConnection {
    fn dialect(&self) -> Dialect {
        Dialect::DuckDb
    }

    fn begin(&mut self) -> DbResult<Box<dyn Transaction + '_>> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| DbError::ExecutionError(format!("BEGIN: {e}")))?;
        Ok(Box::new(DuckDbTransaction { tx }))
    }
}

/// Rolls back on drop unless committed
struct DuckDbTransaction<'a> {
    tx: duckdb::Transaction<'a>,
}

impl Queryable for DuckDbTransaction<'_> {
    fn query_value(&mut self, sql: &str, params: &[&str]) -> DbResult<Option<Value>> {
        query_value(&self.tx, sql, params)
    }
}

impl Transaction for DuckDbTransaction<'_> {
    fn execute(&mut self, sql: &str, params: &[&str]) -> DbResult<()> {
        self.tx
            .execute(sql, params_from_iter(params.iter()))
            .map(|_| ())
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    fn execute_batch(&mut self, sql: &str) -> DbResult<()> {
        self.tx
            .execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn commit(self: Box<Self>) -> DbResult<()> {
        let DuckDbTransaction { tx } = *self;
        tx.commit()
            .map_err(|e| DbError::ExecutionError(format!("COMMIT: {e}")))
    }

    fn rollback(self: Box<Self>) -> DbResult<()> {
        let DuckDbTransaction { tx } = *self;
        tx.rollback()
            .map_err(|e| DbError::ExecutionError(format!("ROLLBACK: {e}")))
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
