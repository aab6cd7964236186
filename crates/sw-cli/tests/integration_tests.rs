//! Integration tests for the `sw` binary

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

/// Path to the compiled sw binary
fn sw_bin() -> String {
    env!("CARGO_BIN_EXE_sw").to_string()
}

/// Run `sw` against `project` via `--project-dir` and return (stdout, stderr, success).
fn run_sw(project: &Path, args: &[&str]) -> (String, String, bool) {
    let mut full_args = vec!["--project-dir", project.to_str().unwrap()];
    full_args.extend_from_slice(args);
    run_sw_from(Path::new("."), &full_args)
}

/// Run `sw` with `cwd` as the working directory and return (stdout, stderr, success).
fn run_sw_from(cwd: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(sw_bin())
        .current_dir(cwd)
        .args(args)
        .env_remove("STEPWISE_SOURCE")
        .env_remove("STEPWISE_DATABASE")
        .env_remove("STEPWISE_SCHEMA")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute sw with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn write_project(dir: &Path, scripts: &[(&str, &str)]) {
    fs::write(
        dir.join("stepwise.yml"),
        "database:\n  url: sqlite://app.db\n",
    )
    .unwrap();
    let migrations = dir.join("migrations");
    fs::create_dir_all(&migrations).unwrap();
    for (name, sql) in scripts {
        fs::write(migrations.join(name), sql).unwrap();
    }
}

fn count(db: &Path, sql: &str) -> i64 {
    let conn = rusqlite::Connection::open(db).unwrap();
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

#[test]
fn test_up_applies_and_reports() {
    let dir = tempdir().unwrap();
    write_project(
        dir.path(),
        &[
            ("001_users.sql", "CREATE TABLE users (id INTEGER PRIMARY KEY);"),
            ("002_seed.sql", "INSERT INTO users VALUES (1), (2);"),
        ],
    );

    let (stdout, stderr, ok) = run_sw(dir.path(), &["up"]);
    assert!(ok, "sw up failed: {stderr}");
    assert!(stdout.contains("Migrated from version 0 to 2"), "{stdout}");

    let db = dir.path().join("app.db");
    assert_eq!(count(&db, "SELECT COUNT(*) FROM users"), 2);
    assert_eq!(count(&db, "SELECT MAX(version) FROM version"), 2);

    let (stdout, _, ok) = run_sw(dir.path(), &["up"]);
    assert!(ok);
    assert!(stdout.contains("up to date at version 2"), "{stdout}");
}

#[test]
fn test_version_and_status() {
    let dir = tempdir().unwrap();
    write_project(
        dir.path(),
        &[
            ("001_a.sql", "CREATE TABLE a (id INTEGER);"),
            ("002_b.sql", "CREATE TABLE b (id INTEGER);"),
        ],
    );

    let (stdout, stderr, ok) = run_sw(dir.path(), &["version"]);
    assert!(ok, "{stderr}");
    assert_eq!(stdout.trim(), "0");

    let (stdout, _, ok) = run_sw(dir.path(), &["status"]);
    assert!(ok);
    assert!(stdout.contains("2 pending migrations"), "{stdout}");
    assert!(stdout.contains("001_a.sql"));

    let (_, _, ok) = run_sw(dir.path(), &["up", "--dry-run"]);
    assert!(ok);
    let (stdout, _, _) = run_sw(dir.path(), &["version"]);
    assert_eq!(stdout.trim(), "0");
}

#[test]
fn test_failed_migration_exits_nonzero_with_context() {
    let dir = tempdir().unwrap();
    write_project(
        dir.path(),
        &[
            ("001_ok.sql", "CREATE TABLE ok (id INTEGER);"),
            ("002_broken.sql", "CREATE TABLE;"),
            ("003_later.sql", "CREATE TABLE later (id INTEGER);"),
        ],
    );

    let (_, stderr, ok) = run_sw(dir.path(), &["up"]);
    assert!(!ok);
    assert!(stderr.contains("002_broken.sql"), "{stderr}");
    assert!(stderr.contains("[M004]"), "{stderr}");
    assert!(stderr.contains("[D003]"), "{stderr}");

    let (stdout, _, _) = run_sw(dir.path(), &["version"]);
    assert_eq!(stdout.trim(), "1");
}

#[test]
fn test_flags_without_config_file() {
    let dir = tempdir().unwrap();
    let scripts = dir.path().join("sql");
    fs::create_dir_all(&scripts).unwrap();
    fs::write(scripts.join("001_a.up.sql"), "CREATE TABLE a (id INTEGER);").unwrap();
    fs::write(scripts.join("001_a.down.sql"), "DROP TABLE a;").unwrap();

    let (_, stderr, ok) = run_sw(
        dir.path(),
        &[
            "--source",
            "file://sql",
            "--pattern",
            "*.up.sql",
            "--database",
            "duckdb://warehouse.duckdb",
            "--schema",
            "meta",
            "up",
        ],
    );
    assert!(ok, "{stderr}");
    assert!(dir.path().join("warehouse.duckdb").exists());
}

#[test]
fn test_missing_database_fails() {
    let dir = tempdir().unwrap();
    let (_, stderr, ok) = run_sw(dir.path(), &["version"]);
    assert!(!ok);
    assert!(stderr.contains("no database configured"), "{stderr}");
}

#[test]
fn test_default_project_dir_is_working_directory() {
    let dir = tempdir().unwrap();
    write_project(
        dir.path(),
        &[
            ("001_users.sql", "CREATE TABLE users (id INTEGER PRIMARY KEY);"),
            ("002_seed.sql", "INSERT INTO users VALUES (1);"),
        ],
    );

    let (stdout, stderr, ok) = run_sw_from(dir.path(), &["status"]);
    assert!(ok, "sw status failed: {stderr}");
    assert!(stdout.contains("  1  001_users.sql"), "{stdout}");

    let (stdout, stderr, ok) = run_sw_from(dir.path(), &["up"]);
    assert!(ok, "sw up failed: {stderr}");
    assert!(stdout.contains("Migrated from version 0 to 2"), "{stdout}");

    let db = dir.path().join("app.db");
    assert_eq!(count(&db, "SELECT COUNT(*) FROM users"), 1);
    assert_eq!(count(&db, "SELECT MAX(version) FROM version"), 2);
}
