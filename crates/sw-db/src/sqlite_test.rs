use super::*;
use crate::traits::Database;
use std::io::Cursor;
use tempfile::tempdir;

fn script(sql: &str) -> Cursor<Vec<u8>> {
    Cursor::new(sql.as_bytes().to_vec())
}

fn count_rows(db: &mut SqliteDatabase, table: &str) -> i64 {
    db.connection()
        .inner()
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .unwrap()
}

#[test]
fn test_in_memory() {
    let mut db = SqliteDatabase::in_memory(StoreOptions::default()).unwrap();
    assert_eq!(db.db_type(), "sqlite");
    assert_eq!(db.version().unwrap(), 0);
}

#[test]
fn test_run_applies_and_records() {
    let mut db = SqliteDatabase::in_memory(StoreOptions::default()).unwrap();
    db.run(&mut script("CREATE TABLE users (id INTEGER PRIMARY KEY);"), 1)
        .unwrap();
    db.run(
        &mut script("INSERT INTO users VALUES (1); INSERT INTO users VALUES (2);"),
        2,
    )
    .unwrap();

    assert_eq!(db.version().unwrap(), 2);
    assert_eq!(count_rows(&mut db, "users"), 2);
    assert_eq!(count_rows(&mut db, "version"), 2);
}

#[test]
fn test_failed_script_leaves_no_trace() {
    let mut db = SqliteDatabase::in_memory(StoreOptions::default()).unwrap();
    db.run(&mut script("CREATE TABLE users (id INTEGER PRIMARY KEY);"), 1)
        .unwrap();

    let err = db
        .run(
            &mut script("INSERT INTO users VALUES (10); INSERT INTO missing VALUES (1);"),
            2,
        )
        .unwrap_err();
    assert!(matches!(err, DbError::ScriptError(_)), "{err}");

    assert_eq!(db.version().unwrap(), 1);
    assert_eq!(count_rows(&mut db, "users"), 0);
}

#[test]
fn test_failed_first_migration_leaves_no_version_table() {
    let mut db = SqliteDatabase::in_memory(StoreOptions::default()).unwrap();
    let err = db.run(&mut script("CREATE TABL oops;"), 1).unwrap_err();
    assert!(matches!(err, DbError::ScriptError(_)));

    let exists: Option<i64> = db
        .connection()
        .inner()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = 'version'",
            [],
            |row| row.get(0),
        )
        .ok();
    assert_eq!(exists, Some(0));
    assert_eq!(db.version().unwrap(), 0);
}

#[test]
fn test_duplicate_version_is_bookkeeping_error() {
    let mut db = SqliteDatabase::in_memory(StoreOptions::default()).unwrap();
    db.run(&mut script("CREATE TABLE a (id INTEGER);"), 1).unwrap();

    let err = db
        .run(&mut script("CREATE TABLE b (id INTEGER);"), 1)
        .unwrap_err();
    assert!(matches!(err, DbError::BookkeepingError(_)), "{err}");

    let b_exists: i64 = db
        .connection()
        .inner()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = 'b'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(b_exists, 0);
}

#[test]
fn test_custom_table_name() {
    let options = StoreOptions::default().with_table("schema_history");
    let mut db = SqliteDatabase::in_memory(options).unwrap();
    db.run(&mut script("SELECT 1;"), 1).unwrap();

    assert_eq!(count_rows(&mut db, "schema_history"), 1);
    assert_eq!(db.version().unwrap(), 1);
}

#[test]
fn test_version_persists_across_connections() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.db");
    let path = path.to_str().unwrap();

    {
        let mut db = SqliteDatabase::open(path, StoreOptions::default()).unwrap();
        db.run(&mut script("CREATE TABLE t (id INTEGER);"), 1).unwrap();
        db.run(&mut script("ALTER TABLE t ADD COLUMN name TEXT;"), 2)
            .unwrap();
    }

    let mut db = SqliteDatabase::open(path, StoreOptions::default()).unwrap();
    assert_eq!(db.version().unwrap(), 2);
}

#[test]
fn test_version_is_read_only() {
    let mut db = SqliteDatabase::in_memory(StoreOptions::default()).unwrap();
    assert_eq!(db.version().unwrap(), 0);
    let tables: i64 = db
        .connection()
        .inner()
        .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))
        .unwrap();
    assert_eq!(tables, 0);
}
