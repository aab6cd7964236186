//! Version table bookkeeping
//!
//! The version table holds one integer row per applied migration. The current
//! version is the largest recorded value; a missing table means version 0.
//! Applying a script and recording its version happen in one transaction.

use crate::connection::{Connection, Queryable, Transaction, Value};
use crate::dialect::{validate_identifier, Dialect};
use crate::error::{DbError, DbResult};
use std::io::Read;
use sw_core::Version;

/// Default version table name
pub const DEFAULT_TABLE: &str = "version";

/// Where the version table lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Schema holding the table; `None` uses the connection's default schema
    pub schema: Option<String>,

    /// Table name (default: `version`)
    pub table: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            schema: None,
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl StoreOptions {
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }
}

#[derive(Debug, Clone)]
enum SchemaState {
    Unresolved,
    Resolved(Option<String>),
}

/// Reads and records versions for one connection.
#[derive(Debug, Clone)]
pub struct VersionStore {
    dialect: Dialect,
    table: String,
    configured_schema: Option<String>,
    schema: SchemaState,
}

impl VersionStore {
    /// Validate `options` against `dialect`.
    ///
    /// A schema on a backend without schemas is rejected rather than ignored.
    pub fn new(dialect: Dialect, options: StoreOptions) -> DbResult<Self> {
        validate_identifier("table", &options.table)?;
        if let Some(schema) = &options.schema {
            validate_identifier("schema", schema)?;
            if !dialect.supports_schemas() {
                return Err(DbError::InvalidConfig(format!(
                    "{dialect} does not support schemas (got schema '{schema}')"
                )));
            }
        }
        Ok(Self {
            dialect,
            table: options.table,
            configured_schema: options.schema,
            schema: SchemaState::Unresolved,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Schema given at construction, if any
    pub fn configured_schema(&self) -> Option<&str> {
        self.configured_schema.as_deref()
    }

    /// Effective schema: the configured one, or the connection's default.
    ///
    /// Resolved once and cached for the lifetime of the store.
    pub fn resolve_schema<Q: Queryable + ?Sized>(&mut self, conn: &mut Q) -> DbResult<Option<String>> {
        if let SchemaState::Resolved(schema) = &self.schema {
            return Ok(schema.clone());
        }

        let schema = match (&self.configured_schema, self.dialect.default_schema_query()) {
            (Some(schema), _) => Some(schema.clone()),
            (None, None) => None,
            (None, Some(sql)) => match conn
                .query_value(sql, &[])
                .map_err(DbError::attribute(DbError::QueryError))?
            {
                Some(Value::Text(name)) if !name.is_empty() => Some(name),
                other => {
                    return Err(DbError::QueryError(format!(
                        "could not determine the default schema for {} (got {:?})",
                        self.dialect, other
                    )))
                }
            },
        };

        log::debug!(
            "Version table resolved to {}",
            self.dialect.qualified_table(schema.as_deref(), &self.table)
        );
        self.schema = SchemaState::Resolved(schema.clone());
        Ok(schema)
    }

    /// Highest recorded version; 0 when the table is missing or empty.
    pub fn read_version<C: Connection + ?Sized>(&mut self, conn: &mut C) -> DbResult<Version> {
        let schema = self.resolve_schema(conn)?;
        let schema = schema.as_deref();

        let (exists_sql, params) = self.dialect.table_exists(schema, &self.table);
        let exists = conn
            .query_value(exists_sql, &params)
            .map_err(DbError::attribute(DbError::QueryError))?;
        if exists.is_none() {
            return Ok(0);
        }

        let max = conn
            .query_value(&self.dialect.max_version(schema, &self.table), &[])
            .map_err(DbError::attribute(DbError::QueryError))?;
        version_from_value(max)
    }

    /// Run `script` and record `version` in a single transaction.
    ///
    /// Version 1 also creates the schema (when configured) and the version
    /// table. On failure the transaction is rolled back and the original
    /// error returned.
    pub fn apply<C: Connection + ?Sized>(
        &mut self,
        conn: &mut C,
        script: &mut dyn Read,
        version: Version,
    ) -> DbResult<()> {
        let mut body = String::new();
        script
            .read_to_string(&mut body)
            .map_err(|e| DbError::ScriptError(format!("failed to read script: {e}")))?;

        let mut tx = conn
            .begin()
            .map_err(DbError::attribute(DbError::TransactionError))?;

        match self.apply_in(&mut *tx, &body, version) {
            Ok(()) => tx
                .commit()
                .map_err(DbError::attribute(DbError::TransactionError)),
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    log::warn!("Rollback after failed migration {version} also failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }

    fn apply_in<T: Transaction + ?Sized>(
        &mut self,
        tx: &mut T,
        body: &str,
        version: Version,
    ) -> DbResult<()> {
        let bookkeeping = DbError::attribute(DbError::BookkeepingError);
        let first = version == 1;

        if first {
            if let Some(create) = self
                .configured_schema
                .as_deref()
                .and_then(|schema| self.dialect.create_schema(schema))
            {
                tx.execute(&create, &[]).map_err(&bookkeeping)?;
            }
        }

        let schema = self.resolve_schema(tx)?;
        let schema = schema.as_deref();

        if let Some(pin) = self
            .configured_schema
            .as_deref()
            .and_then(|schema| self.dialect.pin_schema(schema))
        {
            tx.execute(&pin, &[]).map_err(&bookkeeping)?;
        }

        if first {
            tx.execute(&self.dialect.create_table(schema, &self.table), &[])
                .map_err(&bookkeeping)?;
        }

        tx.execute_batch(body)
            .map_err(DbError::attribute(DbError::ScriptError))?;

        tx.execute(
            &self.dialect.insert_version(schema, &self.table, version),
            &[],
        )
        .map_err(&bookkeeping)
    }
}

fn version_from_value(value: Option<Value>) -> DbResult<Version> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Integer(version)) => Ok(version),
        Some(Value::Text(text)) => text
            .trim()
            .parse()
            .map_err(|_| DbError::QueryError(format!("version table holds a non-integer value '{text}'"))),
    }
}

#[cfg(test)]
#[path = "version_store_test.rs"]
mod tests;
