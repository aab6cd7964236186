//! SQLite backend

use crate::connection::{Connection, Queryable, Transaction, Value};
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::sql_database::SqlDatabase;
use crate::version_store::StoreOptions;
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Error as SqliteError};
use std::path::Path;

/// SQLite database with a version table
pub type SqliteDatabase = SqlDatabase<SqliteConnection>;

/// SQLite connection
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    pub fn in_memory() -> DbResult<Self> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Open (creating if missing) a database file
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = rusqlite::Connection::open(path)
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

    pub fn inner(&self) -> &rusqlite::Connection {
        &self.conn
    }
}

impl SqlDatabase<SqliteConnection> {
    pub fn open(path: &str, options: StoreOptions) -> DbResult<Self> {
        Self::new(SqliteConnection::new(path)?, options)
    }

    pub fn in_memory(options: StoreOptions) -> DbResult<Self> {
        Self::new(SqliteConnection::in_memory()?, options)
    }
}

fn query_value(
    conn: &rusqlite::Connection,
    sql: &str,
    params: &[&str],
) -> DbResult<Option<Value>> {
    let result = conn.query_row(sql, params_from_iter(params.iter()), |row| {
        Ok(match row.get_ref(0)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::Integer(n),
            ValueRef::Real(f) => Value::Text(f.to_string()),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Value::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        })
    });
    match result {
        Ok(value) => Ok(Some(value)),
        Err(SqliteError::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DbError::ExecutionError(format!("{}: {}", e, sql))),
    }
}

impl Queryable for SqliteConnection {
    fn query_value(&mut self, sql: &str, params: &[&str]) -> DbResult<Option<Value>> {
        query_value(&self.conn, sql, params)
    }
}

impl Connection for SqliteConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn begin(&mut self) -> DbResult<Box<dyn Transaction + '_>> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| DbError::ExecutionError(format!("BEGIN: {e}")))?;
        Ok(Box::new(SqliteTransaction { tx }))
    }
}

/// Rolls back on drop unless committed
struct SqliteTransaction<'a> {
    tx: rusqlite::Transaction<'a>,
}

impl Queryable for SqliteTransaction<'_> {
    fn query_value(&mut self, sql: &str, params: &[&str]) -> DbResult<Option<Value>> {
        query_value(&self.tx, sql, params)
    }
}

impl Transaction for SqliteTransaction<'_> {
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
        let SqliteTransaction { tx } = *self;
        tx.commit()
            .map_err(|e| DbError::ExecutionError(format!("COMMIT: {e}")))
    }

    fn rollback(self: Box<Self>) -> DbResult<()> {
        let SqliteTransaction { tx } = *self;
        tx.rollback()
            .map_err(|e| DbError::ExecutionError(format!("ROLLBACK: {e}")))
    }
}

#[cfg(test)]
#[path = "sqlite_test.rs"]
mod tests;
