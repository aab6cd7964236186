//! Configuration types and parsing for stepwise.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project configuration from stepwise.yml
///
/// Every field has a default, so an absent file is equivalent to an empty one.
/// Command-line flags are layered on top by the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where migration scripts come from
    #[serde(default)]
    pub source: SourceConfig,

    /// Target database and version table layout
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Migration script location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Source URL; only `file://<dir>` is supported (default: `file://migrations`)
    #[serde(default = "default_source_url")]
    pub url: String,

    /// Glob pattern selecting scripts inside the directory (default: `*.sql`)
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            pattern: default_pattern(),
        }
    }
}

/// Target database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection URL such as `sqlite://app.db` or `postgres://user@host/db`
    #[serde(default)]
    pub url: Option<String>,

    /// Schema holding the version table. When unset the connection's current
    /// default schema is used.
    #[serde(default)]
    pub schema: Option<String>,

    /// Name of the version table (default: `version`)
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            schema: None,
            table: default_table(),
        }
    }
}

/// Database backend selector, keyed by URL scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// SQLite (`sqlite://path`)
    Sqlite,
    /// PostgreSQL (`postgres://...`)
    Postgres,
    /// Microsoft SQL Server (`sqlserver://...`)
    SqlServer,
    /// DuckDB (`duckdb://path`)
    DuckDb,
}

const SUPPORTED_DATABASES: &str = "sqlite, postgres, sqlserver, duckdb";

impl DbType {
    /// Resolve a URL scheme to a backend.
    pub fn from_scheme(scheme: &str) -> CoreResult<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(DbType::Sqlite),
            "postgres" | "postgresql" => Ok(DbType::Postgres),
            "sqlserver" | "mssql" => Ok(DbType::SqlServer),
            "duckdb" => Ok(DbType::DuckDb),
            _ => Err(CoreError::UnsupportedScheme {
                kind: "database",
                scheme: scheme.to_string(),
                supported: SUPPORTED_DATABASES,
            }),
        }
    }

    /// Whether the backend addresses its target by a local file path rather
    /// than a network URL.
    pub fn is_file_based(self) -> bool {
        matches!(self, DbType::Sqlite | DbType::DuckDb)
    }
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::Sqlite => write!(f, "sqlite"),
            DbType::Postgres => write!(f, "postgres"),
            DbType::SqlServer => write!(f, "sqlserver"),
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// A parsed database URL: which backend, and what to hand its driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTarget {
    /// Backend selected by the URL scheme
    pub db_type: DbType,

    /// Driver connection string. File-based backends get the path after
    /// `://`; network backends get the full URL.
    pub dsn: String,
}

impl DatabaseTarget {
    /// Parse `scheme://rest` into a backend and driver DSN.
    pub fn parse(url: &str) -> CoreResult<Self> {
        let (scheme, rest) = split_url(url)?;
        let db_type = DbType::from_scheme(scheme)?;
        let dsn = if db_type.is_file_based() {
            rest.to_string()
        } else {
            url.to_string()
        };
        if dsn.is_empty() {
            return Err(CoreError::InvalidUrl {
                url: url.to_string(),
            });
        }
        Ok(Self { db_type, dsn })
    }
}

/// Split `scheme://rest` at the first `://`.
pub fn split_url(url: &str) -> CoreResult<(&str, &str)> {
    match url.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() => Ok((scheme, rest)),
        _ => Err(CoreError::InvalidUrl {
            url: url.to_string(),
        }),
    }
}

fn default_source_url() -> String {
    "file://migrations".to_string()
}

fn default_pattern() -> String {
    "*.sql".to_string()
}

fn default_table() -> String {
    "version".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for stepwise.yml or stepwise.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => Err(CoreError::ConfigNotFound {
                path: dir.join("stepwise.yml").display().to_string(),
            }),
        }
    }

    /// Like [`load_from_dir`](Self::load_from_dir), but a missing file yields
    /// the default configuration.
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => {
                log::debug!("No stepwise.yml in {}, using defaults", dir.display());
                Ok(Self::default())
            }
        }
    }

    fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        ["stepwise.yml", "stepwise.yaml"]
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.source.pattern.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "source.pattern must not be empty".to_string(),
            });
        }

        let (scheme, location) = split_url(&self.source.url)?;
        if scheme != "file" {
            return Err(CoreError::UnsupportedScheme {
                kind: "source",
                scheme: scheme.to_string(),
                supported: "file",
            });
        }
        if location.is_empty() {
            return Err(CoreError::InvalidUrl {
                url: self.source.url.clone(),
            });
        }

        if self.database.table.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.table must not be empty".to_string(),
            });
        }

        if self.database.schema.as_deref() == Some("") {
            return Err(CoreError::ConfigInvalid {
                message: "database.schema must not be empty when set".to_string(),
            });
        }

        if let Some(url) = &self.database.url {
            DatabaseTarget::parse(url)?;
        }

        Ok(())
    }
}

impl SourceConfig {
    /// Directory holding the scripts, resolved against `root` when relative.
    pub fn directory(&self, root: &Path) -> CoreResult<PathBuf> {
        let (scheme, location) = split_url(&self.url)?;
        if scheme != "file" {
            return Err(CoreError::UnsupportedScheme {
                kind: "source",
                scheme: scheme.to_string(),
                supported: "file",
            });
        }
        let dir = Path::new(location);
        Ok(if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            root.join(dir)
        })
    }
}

impl DatabaseConfig {
    /// Parse the configured URL, failing if none was given.
    pub fn target(&self) -> CoreResult<DatabaseTarget> {
        let url = self.url.as_deref().ok_or_else(|| CoreError::ConfigInvalid {
            message: "no database configured (set database.url or pass --database)".to_string(),
        })?;
        DatabaseTarget::parse(url)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
