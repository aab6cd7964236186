//! Generic [`Database`] over any [`Connection`]

use crate::connection::Connection;
use crate::error::DbResult;
use crate::traits::Database;
use crate::version_store::{StoreOptions, VersionStore};
use std::io::Read;
use sw_core::Version;

/// A connection paired with the version store that tracks it.
///
/// The version table layout is fixed at construction; the effective schema
/// is resolved on first use and reused afterwards.
pub struct SqlDatabase<C> {
    conn: C,
    store: VersionStore,
}

impl<C: Connection> SqlDatabase<C> {
    pub fn new(conn: C, options: StoreOptions) -> DbResult<Self> {
        let store = VersionStore::new(conn.dialect(), options)?;
        Ok(Self { conn, store })
    }

    /// Underlying connection, for inspection outside the migration flow
    pub fn connection(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    pub fn into_inner(self) -> C {
        self.conn
    }
}

impl<C: Connection> Database for SqlDatabase<C> {
    fn version(&mut self) -> DbResult<Version> {
        self.store.read_version(&mut self.conn)
    }

    fn run(&mut self, script: &mut dyn Read, version: Version) -> DbResult<()> {
        log::debug!("Applying version {} on {}", version, self.db_type());
        self.store.apply(&mut self.conn, script, version)
    }

    fn db_type(&self) -> &'static str {
        self.store.dialect().name()
    }
}
