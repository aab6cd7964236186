//! sw-core - Core library for Stepwise
//!
//! This crate provides the shared version type, configuration parsing, and
//! the `Source` contract with its file-based and in-memory implementations.

pub mod config;
pub mod error;
pub mod source;

pub use config::{Config, DatabaseConfig, DatabaseTarget, DbType, SourceConfig};
pub use error::{CoreError, CoreResult};
pub use source::{FileSource, Script, Source, StaticSource};

/// Number of migrations applied so far. Zero means none; the first migration
/// produces version 1.
pub type Version = i64;
