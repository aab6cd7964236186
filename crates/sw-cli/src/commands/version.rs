//! Version command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::build_migrator;

/// Execute the version command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let mut migrator = build_migrator(global)?;
    println!("{}", migrator.current_version()?);
    Ok(())
}
