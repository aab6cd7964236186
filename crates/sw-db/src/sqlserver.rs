//! Microsoft SQL Server backend (feature `sqlserver`)
//!
//! Connection strings use the JDBC form accepted by tiberius, with either
//! scheme: `sqlserver://host:1433;database=app;user=sa;password=...`.

use crate::connection::{Connection, Queryable, Transaction, Value};
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::sql_database::SqlDatabase;
use crate::version_store::StoreOptions;
use tiberius::{Client, Config, Row, ToSql};
use tokio::net::TcpStream;
use tokio::runtime::{Builder, Runtime};
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// SQL Server database with a version table
pub type SqlServerDatabase = SqlDatabase<SqlServerConnection>;

/// SQL Server connection
pub struct SqlServerConnection {
    runtime: Runtime,
    client: Client<Compat<TcpStream>>,
}

/// Parse a `sqlserver://` or `mssql://` connection string.
pub fn parse_config(url: &str) -> DbResult<Config> {
    let rest = url
        .strip_prefix("sqlserver://")
        .or_else(|| url.strip_prefix("mssql://"))
        .ok_or_else(|| {
            DbError::InvalidConfig(format!("expected a sqlserver:// connection string, got '{url}'"))
        })?;
    Config::from_jdbc_string(&format!("jdbc:sqlserver://{rest}"))
        .map_err(|e| DbError::InvalidConfig(e.to_string()))
}

impl SqlServerConnection {
    pub fn connect(url: &str) -> DbResult<Self> {
        let config = parse_config(url)?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DbError::ConnectionError(format!("failed to start runtime: {e}")))?;

        let client = runtime.block_on(async {
            let tcp = TcpStream::connect(config.get_addr())
                .await
                .map_err(|e| DbError::ConnectionError(e.to_string()))?;
            tcp.set_nodelay(true)
                .map_err(|e| DbError::ConnectionError(e.to_string()))?;
            Client::connect(config, tcp.compat_write())
                .await
                .map_err(|e| DbError::ConnectionError(e.to_string()))
        })?;

        Ok(Self { runtime, client })
    }

    fn fetch_value(&mut self, sql: &str, params: &[&str]) -> DbResult<Option<Value>> {
        let Self { runtime, client } = self;
        let params: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        runtime
            .block_on(async {
                let stream = client.query(sql, &params).await?;
                stream.into_row().await
            })
            .map(|row| row.as_ref().map(column_value))
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    fn execute(&mut self, sql: &str, params: &[&str]) -> DbResult<()> {
        let Self { runtime, client } = self;
        let params: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        runtime
            .block_on(client.execute(sql, &params))
            .map(|_| ())
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    /// Run a multi-statement batch, draining every result set so errors in
    /// later statements surface.
    fn batch(&mut self, sql: &str) -> DbResult<()> {
        let Self { runtime, client } = self;
        runtime
            .block_on(async {
                let stream = client.simple_query(sql).await?;
                stream.into_results().await
            })
            .map(|_| ())
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }
}

impl SqlDatabase<SqlServerConnection> {
    pub fn connect(url: &str, options: StoreOptions) -> DbResult<Self> {
        Self::new(SqlServerConnection::connect(url)?, options)
    }
}

fn column_value(row: &Row) -> Value {
    if let Ok(v) = row.try_get::<i64, _>(0) {
        return v.map_or(Value::Null, Value::Integer);
    }
    if let Ok(v) = row.try_get::<i32, _>(0) {
        return v.map_or(Value::Null, |n| Value::Integer(n.into()));
    }
    if let Ok(v) = row.try_get::<&str, _>(0) {
        return v.map_or(Value::Null, |s| Value::Text(s.to_string()));
    }
    Value::Null
}

impl Queryable for SqlServerConnection {
    fn query_value(&mut self, sql: &str, params: &[&str]) -> DbResult<Option<Value>> {
        self.fetch_value(sql, params)
    }
}

impl Connection for SqlServerConnection {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    fn begin(&mut self) -> DbResult<Box<dyn Transaction + '_>> {
        self.batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::ExecutionError(format!("BEGIN: {e}")))?;
        Ok(Box::new(SqlServerTransaction {
            conn: self,
            open: true,
        }))
    }
}

/// Explicit T-SQL transaction; rolled back on drop unless finished
struct SqlServerTransaction<'a> {
    conn: &'a mut SqlServerConnection,
    open: bool,
}

impl SqlServerTransaction<'_> {
    fn finish(&mut self, statement: &str) -> DbResult<()> {
        self.conn.batch(statement)?;
        self.open = false;
        Ok(())
    }
}

impl Drop for SqlServerTransaction<'_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.conn.batch("IF @@TRANCOUNT > 0 ROLLBACK TRANSACTION") {
                log::warn!("Failed to roll back abandoned transaction: {e}");
            }
        }
    }
}

impl Queryable for SqlServerTransaction<'_> {
    fn query_value(&mut self, sql: &str, params: &[&str]) -> DbResult<Option<Value>> {
        self.conn.fetch_value(sql, params)
    }
}

impl Transaction for SqlServerTransaction<'_> {
    fn execute(&mut self, sql: &str, params: &[&str]) -> DbResult<()> {
        self.conn.execute(sql, params)
    }

    fn execute_batch(&mut self, sql: &str) -> DbResult<()> {
        self.conn.batch(sql)
    }

    fn commit(mut self: Box<Self>) -> DbResult<()> {
        self.finish("COMMIT TRANSACTION")
    }

    fn rollback(mut self: Box<Self>) -> DbResult<()> {
        self.finish("IF @@TRANCOUNT > 0 ROLLBACK TRANSACTION")
    }
}

#[cfg(test)]
#[path = "sqlserver_test.rs"]
mod tests;
