//! Database trait definition

use crate::error::DbResult;
use std::io::Read;
use sw_core::Version;

/// A migration target: reports the applied version and applies one script at
/// a time.
pub trait Database {
    /// Highest recorded version, or 0 when the version table is missing or
    /// empty. Does not modify the database.
    fn version(&mut self) -> DbResult<Version>;

    /// Apply `script` and record `version`, atomically.
    ///
    /// On the first migration (`version == 1`) the schema and version table
    /// are created if missing. Any failure rolls the whole transaction back.
    fn run(&mut self, script: &mut dyn Read, version: Version) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

impl<D: Database + ?Sized> Database for Box<D> {
    fn version(&mut self) -> DbResult<Version> {
        (**self).version()
    }

    fn run(&mut self, script: &mut dyn Read, version: Version) -> DbResult<()> {
        (**self).run(script, version)
    }

    fn db_type(&self) -> &'static str {
        (**self).db_type()
    }
}

impl<D: Database + ?Sized> Database for &mut D {
    fn version(&mut self) -> DbResult<Version> {
        (**self).version()
    }

    fn run(&mut self, script: &mut dyn Read, version: Version) -> DbResult<()> {
        (**self).run(script, version)
    }

    fn db_type(&self) -> &'static str {
        (**self).db_type()
    }
}
