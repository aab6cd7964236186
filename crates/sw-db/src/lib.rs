//! sw-db - Database layer for Stepwise
//!
//! This crate provides the `Database` trait, the version table bookkeeping
//! shared by every SQL backend, and backends for SQLite and DuckDB
//! (PostgreSQL and SQL Server behind cargo features).

pub mod connection;
pub mod dialect;
pub mod duckdb;
pub mod error;
pub mod factory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sql_database;
pub mod sqlite;
#[cfg(feature = "sqlserver")]
pub mod sqlserver;
pub mod traits;
pub mod version_store;

pub use connection::{Connection, Queryable, Transaction, Value};
pub use dialect::Dialect;
pub use duckdb::{DuckDbConnection, DuckDbDatabase};
pub use error::{DbError, DbResult};
pub use factory::connect;
#[cfg(feature = "postgres")]
pub use postgres::{PostgresConnection, PostgresDatabase};
pub use sql_database::SqlDatabase;
pub use sqlite::{SqliteConnection, SqliteDatabase};
#[cfg(feature = "sqlserver")]
pub use sqlserver::{SqlServerConnection, SqlServerDatabase};
pub use traits::Database;
pub use version_store::{StoreOptions, VersionStore, DEFAULT_TABLE};
