//! Status command implementation

use anyhow::Result;
use sw_db::Database;

use crate::cli::GlobalArgs;
use crate::commands::common::build_migrator;

/// Execute the status command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let mut migrator = build_migrator(global)?;
    let current = migrator.current_version()?;
    let pending = migrator.pending()?;

    println!(
        "Database: {} (version {})",
        migrator.database().db_type(),
        current
    );
    println!("Source:   {}", migrator.source().root().display());
    println!();

    if pending.is_empty() {
        println!("Up to date");
        return Ok(());
    }

    println!(
        "{} pending migration{}:",
        pending.len(),
        if pending.len() == 1 { "" } else { "s" }
    );
    for migration in &pending {
        println!("  {:>4}  {}", migration.version, migration.name);
    }
    Ok(())
}
