use super::*;

#[test]
fn test_parse_up_with_globals() {
    let cli = Cli::try_parse_from([
        "sw",
        "up",
        "--database",
        "sqlite://app.db",
        "--source",
        "file://db/migrations",
        "--schema",
        "app",
        "-v",
    ])
    .unwrap();

    assert!(cli.global.verbose);
    assert_eq!(cli.global.database.as_deref(), Some("sqlite://app.db"));
    assert_eq!(cli.global.source.as_deref(), Some("file://db/migrations"));
    assert_eq!(cli.global.schema.as_deref(), Some("app"));
    assert!(matches!(cli.command, Commands::Up(UpArgs { dry_run: false })));
}

#[test]
fn test_parse_up_dry_run() {
    let cli = Cli::try_parse_from(["sw", "up", "--dry-run"]).unwrap();
    assert!(matches!(cli.command, Commands::Up(UpArgs { dry_run: true })));
}

#[test]
fn test_project_dir_defaults_to_cwd() {
    let cli = Cli::try_parse_from(["sw", "version"]).unwrap();
    assert_eq!(cli.global.project_dir, PathBuf::from("."));
    assert!(matches!(cli.command, Commands::Version));
}

#[test]
fn test_globals_before_subcommand() {
    let cli = Cli::try_parse_from([
        "sw",
        "-p",
        "/srv/app",
        "--table",
        "schema_history",
        "--pattern",
        "*.up.sql",
        "status",
    ])
    .unwrap();
    assert_eq!(cli.global.project_dir, PathBuf::from("/srv/app"));
    assert_eq!(cli.global.table.as_deref(), Some("schema_history"));
    assert_eq!(cli.global.pattern.as_deref(), Some("*.up.sql"));
    assert!(matches!(cli.command, Commands::Status));
}

#[test]
fn test_subcommand_required() {
    assert!(Cli::try_parse_from(["sw"]).is_err());
}

#[test]
fn test_cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
