//! The migration loop

use crate::error::{MigrateError, MigrateResult};
use std::time::{Duration, Instant};
use sw_core::{Source, Version};
use sw_db::Database;

/// One migration applied during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: Version,
    pub name: String,
    pub duration: Duration,
}

/// A migration the source offers beyond the current version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMigration {
    pub version: Version,
    pub name: String,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Version read before the first migration
    pub starting_version: Version,
    /// Version after the last applied migration
    pub final_version: Version,
    /// Applied migrations, in order
    pub applied: Vec<AppliedMigration>,
}

impl MigrationReport {
    /// True when the database was already up to date.
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Applies scripts from a [`Source`] to a [`Database`] in version order.
///
/// Each migration commits on its own, so a failure leaves every earlier
/// migration in place and a later run resumes after the last committed
/// version.
pub struct Migrator<S, D> {
    source: S,
    database: D,
}

impl<S: Source, D: Database> Migrator<S, D> {
    pub fn new(source: S, database: D) -> Self {
        Self { source, database }
    }

    /// Apply every pending migration.
    ///
    /// Stops at the first failure. The source running out of scripts is the
    /// normal way to finish, including when nothing was pending.
    pub fn run(&mut self) -> MigrateResult<MigrationReport> {
        let starting_version = self.current_version()?;
        log::debug!(
            "Starting migration run on {} at version {}",
            self.database.db_type(),
            starting_version
        );

        let mut report = MigrationReport {
            starting_version,
            final_version: starting_version,
            applied: Vec::new(),
        };

        let mut current = starting_version;
        while let Some(next) = self.source.next(current).map_err(MigrateError::Source)? {
            let applied = self.apply(next)?;
            log::info!(
                "Applied {} (version {}) in {:.2?}",
                applied.name,
                applied.version,
                applied.duration
            );
            report.applied.push(applied);
            report.final_version = next;
            current = next;
        }

        log::debug!(
            "No migrations remain after version {} ({} applied)",
            current,
            report.applied.len()
        );
        Ok(report)
    }

    fn apply(&mut self, version: Version) -> MigrateResult<AppliedMigration> {
        let mut script = self
            .source
            .read(version)
            .map_err(|source| MigrateError::Read { version, source })?;
        let name = script.name.clone();

        log::debug!("Applying {} as version {}", name, version);
        let started = Instant::now();
        self.database
            .run(&mut script, version)
            .map_err(|source| MigrateError::Apply {
                name: name.clone(),
                version,
                source,
            })?;

        Ok(AppliedMigration {
            version,
            name,
            duration: started.elapsed(),
        })
    }

    /// Migrations that [`run`](Self::run) would apply, without applying them.
    pub fn pending(&mut self) -> MigrateResult<Vec<PendingMigration>> {
        let mut current = self.current_version()?;
        let mut pending = Vec::new();
        while let Some(next) = self.source.next(current).map_err(MigrateError::Source)? {
            let name = self
                .source
                .name(next)
                .map_err(|source| MigrateError::Read {
                    version: next,
                    source,
                })?;
            pending.push(PendingMigration {
                version: next,
                name,
            });
            current = next;
        }
        Ok(pending)
    }

    /// Highest version recorded in the database
    pub fn current_version(&mut self) -> MigrateResult<Version> {
        self.database.version().map_err(MigrateError::Version)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    pub fn database_mut(&mut self) -> &mut D {
        &mut self.database
    }

    pub fn into_parts(self) -> (S, D) {
        (self.source, self.database)
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
