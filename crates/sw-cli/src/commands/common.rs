//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::path::Path;
use sw_core::{Config, FileSource};
use sw_db::{Database, StoreOptions};
use sw_migrate::Migrator;

use crate::cli::GlobalArgs;

/// Migrator over the configured script directory and database
pub(crate) type ProjectMigrator = Migrator<FileSource, Box<dyn Database>>;

/// Load `stepwise.yml` (or `--config`) and layer command-line flags on top.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_default(&global.project_dir).with_context(|| {
            format!(
                "Failed to load config from {}",
                global.project_dir.display()
            )
        })?,
    };
    apply_overrides(&mut config, global);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Flags win over file values.
pub(crate) fn apply_overrides(config: &mut Config, global: &GlobalArgs) {
    if let Some(source) = &global.source {
        config.source.url = source.clone();
    }
    if let Some(pattern) = &global.pattern {
        config.source.pattern = pattern.clone();
    }
    if let Some(database) = &global.database {
        config.database.url = Some(database.clone());
    }
    if let Some(schema) = &global.schema {
        config.database.schema = Some(schema.clone());
    }
    if let Some(table) = &global.table {
        config.database.table = table.clone();
    }
}

/// Script source for the project; relative directories resolve against the
/// project directory.
pub(crate) fn open_source(config: &Config, root: &Path) -> Result<FileSource> {
    let dir = config.source.directory(root)?;
    log::debug!("Reading migrations from {}", dir.display());
    let source = FileSource::new(dir).with_pattern(config.source.pattern.clone())?;
    Ok(source)
}

/// Connect to the configured database. Relative file paths for SQLite and
/// DuckDB resolve against the project directory.
pub(crate) fn open_database(config: &Config, root: &Path) -> Result<Box<dyn Database>> {
    let mut target = config.database.target()?;
    if target.db_type.is_file_based() && target.dsn != ":memory:" {
        let path = Path::new(&target.dsn);
        if path.is_relative() {
            target.dsn = root.join(path).display().to_string();
        }
    }

    let options = StoreOptions {
        schema: config.database.schema.clone(),
        table: config.database.table.clone(),
    };
    let database = sw_db::connect(&target, options)
        .with_context(|| format!("Failed to open {} database", target.db_type))?;
    Ok(database)
}

/// Build a migrator from the global arguments.
pub(crate) fn build_migrator(global: &GlobalArgs) -> Result<ProjectMigrator> {
    let config = load_config(global)?;
    let source = open_source(&config, &global.project_dir)?;
    let database = open_database(&config, &global.project_dir)?;
    Ok(Migrator::new(source, database))
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
