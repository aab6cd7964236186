//! Up command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, UpArgs};
use crate::commands::common::build_migrator;

/// Execute the up command
pub(crate) fn execute(args: &UpArgs, global: &GlobalArgs) -> Result<()> {
    let mut migrator = build_migrator(global)?;

    if args.dry_run {
        let current = migrator.current_version()?;
        let pending = migrator.pending()?;
        println!("Dry run - database is at version {current}");
        if pending.is_empty() {
            println!("No pending migrations");
        }
        for migration in &pending {
            println!("  Would apply {:>4}  {}", migration.version, migration.name);
        }
        return Ok(());
    }

    let report = migrator.run()?;

    if report.is_empty() {
        println!(
            "Database is up to date at version {}",
            report.final_version
        );
        return Ok(());
    }

    let total: std::time::Duration = report.applied.iter().map(|m| m.duration).sum();
    println!(
        "Migrated from version {} to {} ({} migration{} in {:.2?})",
        report.starting_version,
        report.final_version,
        report.applied.len(),
        if report.applied.len() == 1 { "" } else { "s" },
        total
    );
    Ok(())
}
