//! PostgreSQL backend (feature `postgres`)
//!
//! sqlx is async; each call is driven to completion on a private
//! current-thread runtime so the backend stays blocking like the others.

use crate::connection::{Connection, Queryable, Transaction, Value};
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::sql_database::SqlDatabase;
use crate::version_store::StoreOptions;
use sqlx::postgres::PgRow;
use sqlx::{Connection as _, PgConnection, Postgres, Row};
use tokio::runtime::{Builder, Runtime};

/// PostgreSQL database with a version table
pub type PostgresDatabase = SqlDatabase<PostgresConnection>;

/// PostgreSQL connection
pub struct PostgresConnection {
    runtime: Runtime,
    conn: PgConnection,
}

impl PostgresConnection {
    /// Connect with a `postgres://` URL
    pub fn connect(url: &str) -> DbResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DbError::ConnectionError(format!("failed to start runtime: {e}")))?;
        let conn = runtime
            .block_on(PgConnection::connect(url))
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { runtime, conn })
    }
}

impl SqlDatabase<PostgresConnection> {
    pub fn connect(url: &str, options: StoreOptions) -> DbResult<Self> {
        Self::new(PostgresConnection::connect(url)?, options)
    }
}

fn column_value(row: &PgRow) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(0) {
        return v.map_or(Value::Null, Value::Integer);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(0) {
        return v.map_or(Value::Null, |n| Value::Integer(n.into()));
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(0) {
        return v.map_or(Value::Null, Value::Text);
    }
    Value::Null
}

async fn fetch_value(
    conn: &mut PgConnection,
    sql: &str,
    params: &[&str],
) -> Result<Option<Value>, sqlx::Error> {
    let mut query = sqlx::query::<Postgres>(sql);
    for param in params {
        query = query.bind(*param);
    }
    let row = query.fetch_optional(conn).await?;
    Ok(row.as_ref().map(column_value))
}

async fn execute(conn: &mut PgConnection, sql: &str, params: &[&str]) -> Result<(), sqlx::Error> {
    let mut query = sqlx::query::<Postgres>(sql);
    for param in params {
        query = query.bind(*param);
    }
    query.execute(conn).await.map(|_| ())
}

fn execution_error(sql: &str) -> impl Fn(sqlx::Error) -> DbError + '_ {
    move |e| DbError::ExecutionError(format!("{}: {}", e, sql))
}

impl Queryable for PostgresConnection {
    fn query_value(&mut self, sql: &str, params: &[&str]) -> DbResult<Option<Value>> {
        self.runtime
            .block_on(fetch_value(&mut self.conn, sql, params))
            .map_err(execution_error(sql))
    }
}

impl Connection for PostgresConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn begin(&mut self) -> DbResult<Box<dyn Transaction + '_>> {
        let Self { runtime, conn } = self;
        let tx = runtime
            .block_on(conn.begin())
            .map_err(|e| DbError::ExecutionError(format!("BEGIN: {e}")))?;
        Ok(Box::new(PostgresTransaction { runtime, tx }))
    }
}

/// sqlx rolls back on drop unless committed
struct PostgresTransaction<'a> {
    runtime: &'a Runtime,
    tx: sqlx::Transaction<'a, Postgres>,
}

impl Queryable for PostgresTransaction<'_> {
    fn query_value(&mut self, sql: &str, params: &[&str]) -> DbResult<Option<Value>> {
        self.runtime
            .block_on(fetch_value(&mut self.tx, sql, params))
            .map_err(execution_error(sql))
    }
}

impl Transaction for PostgresTransaction<'_> {
    fn execute(&mut self, sql: &str, params: &[&str]) -> DbResult<()> {
        self.runtime
            .block_on(execute(&mut self.tx, sql, params))
            .map_err(execution_error(sql))
    }

    fn execute_batch(&mut self, sql: &str) -> DbResult<()> {
        self.runtime
            .block_on(sqlx::raw_sql(sql).execute(&mut *self.tx))
            .map(|_| ())
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn commit(self: Box<Self>) -> DbResult<()> {
        let PostgresTransaction { runtime, tx } = *self;
        runtime
            .block_on(tx.commit())
            .map_err(|e| DbError::ExecutionError(format!("COMMIT: {e}")))
    }

    fn rollback(self: Box<Self>) -> DbResult<()> {
        let PostgresTransaction { runtime, tx } = *self;
        runtime
            .block_on(tx.rollback())
            .map_err(|e| DbError::ExecutionError(format!("ROLLBACK: {e}")))
    }
}
