//! sw-migrate - Migration orchestrator for Stepwise
//!
//! [`Migrator`] drives a [`Source`](sw_core::Source) against a
//! [`Database`](sw_db::Database): it reads the current version, then applies
//! each next script in its own transaction until the source is exhausted or a
//! migration fails.

pub mod error;
pub mod migrator;

pub use error::{MigrateError, MigrateResult};
pub use migrator::{AppliedMigration, MigrationReport, Migrator, PendingMigration};
