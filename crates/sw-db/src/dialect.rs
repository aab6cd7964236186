//! Per-backend SQL fragments for the version table
//!
//! Everything backend-specific the version store emits lives here: identifier
//! quoting, the existence probe, schema/table creation, and how to read the
//! connection's default schema.

use crate::error::{DbError, DbResult};
use sw_core::{DbType, Version};

/// Longest identifier accepted for a schema or table name
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Name of the single column in the version table
const VERSION_COLUMN: &str = "version";

/// SQL dialect of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Sqlite,
    Postgres,
    SqlServer,
    DuckDb,
}

/// Fixed statements that take no identifiers
struct Fragments {
    /// Probe by table name only; binds (table)
    table_exists: &'static str,
    /// Probe scoped to a schema; binds (schema, table)
    table_exists_in_schema: &'static str,
    /// Query returning the connection's current default schema
    default_schema: Option<&'static str>,
    /// Column type of the version column
    integer_type: &'static str,
}

const SQLITE: Fragments = Fragments {
    table_exists: "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
    table_exists_in_schema: "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
    default_schema: None,
    integer_type: "INTEGER",
};

const POSTGRES: Fragments = Fragments {
    table_exists: "SELECT 1 FROM information_schema.tables \
                   WHERE table_schema = current_schema() AND table_name = $1",
    table_exists_in_schema: "SELECT 1 FROM information_schema.tables \
                             WHERE table_schema = $1 AND table_name = $2",
    default_schema: Some("SELECT current_schema()"),
    integer_type: "BIGINT",
};

const SQLSERVER: Fragments = Fragments {
    table_exists: "SELECT 1 FROM INFORMATION_SCHEMA.TABLES \
                   WHERE TABLE_SCHEMA = SCHEMA_NAME() AND TABLE_NAME = @P1",
    table_exists_in_schema: "SELECT 1 FROM INFORMATION_SCHEMA.TABLES \
                             WHERE TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2",
    default_schema: Some("SELECT SCHEMA_NAME()"),
    integer_type: "BIGINT",
};

const DUCKDB: Fragments = Fragments {
    table_exists: "SELECT 1 FROM information_schema.tables \
                   WHERE table_schema = current_schema() AND table_name = ?",
    table_exists_in_schema: "SELECT 1 FROM information_schema.tables \
                             WHERE table_schema = ? AND table_name = ?",
    default_schema: Some("SELECT current_schema()"),
    integer_type: "BIGINT",
};

impl From<DbType> for Dialect {
    fn from(db_type: DbType) -> Self {
        match db_type {
            DbType::Sqlite => Dialect::Sqlite,
            DbType::Postgres => Dialect::Postgres,
            DbType::SqlServer => Dialect::SqlServer,
            DbType::DuckDb => Dialect::DuckDb,
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Dialect {
    fn fragments(self) -> &'static Fragments {
        match self {
            Dialect::Sqlite => &SQLITE,
            Dialect::Postgres => &POSTGRES,
            Dialect::SqlServer => &SQLSERVER,
            Dialect::DuckDb => &DUCKDB,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::Postgres => "postgres",
            Dialect::SqlServer => "sqlserver",
            Dialect::DuckDb => "duckdb",
        }
    }

    /// Whether the backend has named schemas that can hold the version table.
    pub fn supports_schemas(self) -> bool {
        !matches!(self, Dialect::Sqlite)
    }

    /// Quote an identifier, doubling any embedded closing quote.
    pub fn quote_ident(self, ident: &str) -> String {
        match self {
            Dialect::SqlServer => format!("[{}]", ident.replace(']', "]]")),
            _ => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// `schema.table` when a schema is known, otherwise just `table`.
    pub fn qualified_table(self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(schema) => format!("{}.{}", self.quote_ident(schema), self.quote_ident(table)),
            None => self.quote_ident(table),
        }
    }

    /// Query returning a row iff the version table exists, with its binds.
    pub fn table_exists<'a>(
        self,
        schema: Option<&'a str>,
        table: &'a str,
    ) -> (&'static str, Vec<&'a str>) {
        let fragments = self.fragments();
        match schema {
            Some(schema) if self.supports_schemas() => {
                (fragments.table_exists_in_schema, vec![schema, table])
            }
            _ => (fragments.table_exists, vec![table]),
        }
    }

    /// Query for the connection's current default schema, if the backend
    /// has schemas.
    pub fn default_schema_query(self) -> Option<&'static str> {
        self.fragments().default_schema
    }

    /// Idempotent `CREATE SCHEMA`; `None` for backends without schemas.
    pub fn create_schema(self, schema: &str) -> Option<String> {
        match self {
            Dialect::Sqlite => None,
            Dialect::Postgres | Dialect::DuckDb => Some(format!(
                "CREATE SCHEMA IF NOT EXISTS {}",
                self.quote_ident(schema)
            )),
            Dialect::SqlServer => Some(format!(
                "IF SCHEMA_ID({}) IS NULL EXEC({})",
                nstring_literal(schema),
                nstring_literal(&format!("CREATE SCHEMA {}", self.quote_ident(schema)))
            )),
        }
    }

    /// Idempotent `CREATE TABLE` for the version table.
    pub fn create_table(self, schema: Option<&str>, table: &str) -> String {
        let qualified = self.qualified_table(schema, table);
        let columns = format!(
            "({} {} NOT NULL PRIMARY KEY)",
            self.quote_ident(VERSION_COLUMN),
            self.fragments().integer_type
        );
        match self {
            Dialect::SqlServer => format!(
                "IF OBJECT_ID({}, N'U') IS NULL CREATE TABLE {} {}",
                nstring_literal(&qualified),
                qualified,
                columns
            ),
            _ => format!("CREATE TABLE IF NOT EXISTS {} {}", qualified, columns),
        }
    }

    /// Statement that makes `schema` the target of unqualified names for the
    /// rest of the current transaction. Only PostgreSQL supports this; the
    /// others rely on qualified bookkeeping statements and leave the
    /// script's own name resolution untouched.
    pub fn pin_schema(self, schema: &str) -> Option<String> {
        match self {
            Dialect::Postgres => Some(format!(
                "SET LOCAL search_path TO {}",
                self.quote_ident(schema)
            )),
            _ => None,
        }
    }

    pub fn max_version(self, schema: Option<&str>, table: &str) -> String {
        format!(
            "SELECT MAX({}) FROM {}",
            self.quote_ident(VERSION_COLUMN),
            self.qualified_table(schema, table)
        )
    }

    /// The version is an integer, so it is inlined rather than bound.
    pub fn insert_version(self, schema: Option<&str>, table: &str, version: Version) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.qualified_table(schema, table),
            self.quote_ident(VERSION_COLUMN),
            version
        )
    }
}

/// `N'...'` string literal with embedded quotes doubled
fn nstring_literal(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}

/// Reject names that cannot be safely quoted as identifiers.
pub fn validate_identifier(kind: &str, name: &str) -> DbResult<()> {
    if name.is_empty() {
        return Err(DbError::InvalidConfig(format!("{kind} name must not be empty")));
    }
    if name.chars().count() > MAX_IDENTIFIER_LEN {
        return Err(DbError::InvalidConfig(format!(
            "{kind} name '{name}' exceeds {MAX_IDENTIFIER_LEN} characters"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(DbError::InvalidConfig(format!(
            "{kind} name {name:?} contains control characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
