//! Open a [`Database`] from a parsed URL

use crate::duckdb::DuckDbDatabase;
use crate::error::{DbError, DbResult};
use crate::sqlite::SqliteDatabase;
use crate::traits::Database;
use crate::version_store::StoreOptions;
use sw_core::{DatabaseTarget, DbType};

/// Connect to `target` and attach a version store laid out per `options`.
///
/// PostgreSQL and SQL Server are behind the `postgres` and `sqlserver`
/// cargo features; without them this returns [`DbError::NotImplemented`].
pub fn connect(target: &DatabaseTarget, options: StoreOptions) -> DbResult<Box<dyn Database>> {
    log::debug!("Opening {} database", target.db_type);
    match target.db_type {
        DbType::Sqlite => Ok(Box::new(SqliteDatabase::open(&target.dsn, options)?)),
        DbType::DuckDb => Ok(Box::new(DuckDbDatabase::open(&target.dsn, options)?)),
        DbType::Postgres => connect_postgres(&target.dsn, options),
        DbType::SqlServer => connect_sqlserver(&target.dsn, options),
    }
}

#[cfg(feature = "postgres")]
fn connect_postgres(dsn: &str, options: StoreOptions) -> DbResult<Box<dyn Database>> {
    Ok(Box::new(crate::postgres::PostgresDatabase::connect(
        dsn, options,
    )?))
}

#[cfg(not(feature = "postgres"))]
fn connect_postgres(_dsn: &str, _options: StoreOptions) -> DbResult<Box<dyn Database>> {
    Err(not_compiled(DbType::Postgres, "postgres"))
}

#[cfg(feature = "sqlserver")]
fn connect_sqlserver(dsn: &str, options: StoreOptions) -> DbResult<Box<dyn Database>> {
    Ok(Box::new(crate::sqlserver::SqlServerDatabase::connect(
        dsn, options,
    )?))
}

#[cfg(not(feature = "sqlserver"))]
fn connect_sqlserver(_dsn: &str, _options: StoreOptions) -> DbResult<Box<dyn Database>> {
    Err(not_compiled(DbType::SqlServer, "sqlserver"))
}

#[cfg(any(not(feature = "postgres"), not(feature = "sqlserver")))]
fn not_compiled(db_type: DbType, feature: &str) -> DbError {
    DbError::NotImplemented {
        backend: db_type.to_string(),
        feature: format!("backend not compiled in (enable the `{feature}` feature)"),
    }
}

#[cfg(test)]
#[path = "factory_test.rs"]
mod tests;
