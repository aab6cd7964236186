use super::*;
use std::fs;
use tempfile::tempdir;

fn write_scripts(dir: &Path, names: &[&str]) {
    for name in names {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, format!("-- {name}\nSELECT 1;")).unwrap();
    }
}

fn read_body(mut script: Script) -> String {
    let mut body = String::new();
    script.read_to_string(&mut body).unwrap();
    body
}

#[test]
fn test_next_walks_sorted_scripts() {
    let dir = tempdir().unwrap();
    write_scripts(dir.path(), &["003_z.sql", "001_x.sql", "002_y.sql"]);
    let source = FileSource::new(dir.path());

    assert_eq!(source.next(0).unwrap(), Some(1));
    assert_eq!(source.next(1).unwrap(), Some(2));
    assert_eq!(source.next(2).unwrap(), Some(3));
    assert_eq!(source.next(3).unwrap(), None);
}

#[test]
fn test_read_maps_versions_to_sorted_names() {
    let dir = tempdir().unwrap();
    write_scripts(dir.path(), &["002_y.sql", "001_x.sql"]);
    let source = FileSource::new(dir.path());

    let first = source.read(1).unwrap();
    assert_eq!(first.name, "001_x.sql");
    assert_eq!(first.version, 1);
    assert!(read_body(first).starts_with("-- 001_x.sql"));

    let second = source.read(2).unwrap();
    assert_eq!(second.name, "002_y.sql");
}

#[test]
fn test_read_out_of_range_is_not_found() {
    let dir = tempdir().unwrap();
    write_scripts(dir.path(), &["001_x.sql"]);
    let source = FileSource::new(dir.path());

    for version in [0, -1, 2, 10] {
        let err = source.read(version).unwrap_err();
        assert!(err.is_not_found(), "version {version}: {err}");
    }
}

#[test]
fn test_negative_current_is_exhausted() {
    let dir = tempdir().unwrap();
    write_scripts(dir.path(), &["001_x.sql"]);
    let source = FileSource::new(dir.path());
    assert_eq!(source.next(-1).unwrap(), None);
}

#[test]
fn test_current_ahead_of_scripts_is_an_error() {
    let dir = tempdir().unwrap();
    write_scripts(dir.path(), &["001_x.sql", "002_y.sql"]);
    let source = FileSource::new(dir.path());

    let err = source.next(5).unwrap_err();
    assert!(matches!(
        err,
        CoreError::VersionAhead {
            current: 5,
            available: 2
        }
    ));
}

#[test]
fn test_empty_directory() {
    let dir = tempdir().unwrap();
    let source = FileSource::new(dir.path());
    assert!(source.scripts().unwrap().is_empty());
    assert_eq!(source.next(0).unwrap(), None);
}

#[test]
fn test_missing_directory_has_no_scripts() {
    let dir = tempdir().unwrap();
    let source = FileSource::new(dir.path().join("nope"));
    assert_eq!(source.next(0).unwrap(), None);
}

#[test]
fn test_pattern_filters_files() {
    let dir = tempdir().unwrap();
    write_scripts(
        dir.path(),
        &["001_a.sql", "README.md", "002_b.sql", "notes.txt"],
    );
    let source = FileSource::new(dir.path());
    assert_eq!(source.scripts().unwrap(), vec!["001_a.sql", "002_b.sql"]);
}

#[test]
fn test_star_does_not_cross_directories() {
    let dir = tempdir().unwrap();
    write_scripts(dir.path(), &["001_a.sql", "nested/002_b.sql"]);

    let flat = FileSource::new(dir.path());
    assert_eq!(flat.scripts().unwrap(), vec!["001_a.sql"]);

    let nested = FileSource::new(dir.path())
        .with_pattern("nested/*.sql")
        .unwrap();
    assert_eq!(nested.scripts().unwrap(), vec!["nested/002_b.sql"]);
    assert_eq!(nested.read(1).unwrap().name, "nested/002_b.sql");
}

#[test]
fn test_directories_matching_pattern_are_skipped() {
    let dir = tempdir().unwrap();
    write_scripts(dir.path(), &["001_a.sql"]);
    fs::create_dir_all(dir.path().join("archive.sql")).unwrap();

    let source = FileSource::new(dir.path());
    assert_eq!(source.scripts().unwrap(), vec!["001_a.sql"]);
}

#[test]
fn test_invalid_patterns_rejected() {
    let err = FileSource::new(".").with_pattern("").unwrap_err();
    assert!(matches!(err, CoreError::InvalidPattern { .. }));

    let err = FileSource::new(".").with_pattern("[*.sql").unwrap_err();
    assert!(matches!(err, CoreError::InvalidPattern { .. }));
}

#[test]
fn test_new_script_extends_sequence() {
    let dir = tempdir().unwrap();
    write_scripts(dir.path(), &["001_a.sql"]);
    let source = FileSource::new(dir.path());
    assert_eq!(source.next(1).unwrap(), None);

    write_scripts(dir.path(), &["002_b.sql"]);
    assert_eq!(source.next(1).unwrap(), Some(2));
}

#[test]
fn test_static_source_sorts_by_name() {
    let source = StaticSource::new([
        ("002_b.sql", "CREATE TABLE b (id INTEGER);"),
        ("001_a.sql", "CREATE TABLE a (id INTEGER);"),
    ]);
    assert_eq!(source.len(), 2);
    assert_eq!(
        source.names().collect::<Vec<_>>(),
        vec!["001_a.sql", "002_b.sql"]
    );

    assert_eq!(source.next(0).unwrap(), Some(1));
    assert_eq!(source.next(2).unwrap(), None);

    let script = source.read(1).unwrap();
    assert_eq!(script.name, "001_a.sql");
    assert_eq!(read_body(script), "CREATE TABLE a (id INTEGER);");
}

#[test]
fn test_static_source_empty() {
    let source = StaticSource::default();
    assert!(source.is_empty());
    assert_eq!(source.next(0).unwrap(), None);
    assert!(source.read(1).unwrap_err().is_not_found());
}

#[test]
fn test_boxed_source_delegates() {
    let source: Box<dyn Source> = Box::new(StaticSource::new([("001_a.sql", "SELECT 1;")]));
    assert_eq!(source.next(0).unwrap(), Some(1));
    assert_eq!(source.read(1).unwrap().name, "001_a.sql");
}

/// Scratch directory under the working directory, so it can be named relatively.
fn local_tempdir() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::Builder::new()
        .prefix("stepwise-scripts")
        .tempdir_in(".")
        .unwrap();
    let name = dir.path().file_name().unwrap().to_owned();
    (dir, PathBuf::from(name))
}

#[test]
fn test_dot_relative_root_reads_scripts() {
    let (_guard, name) = local_tempdir();
    write_scripts(&name, &["002_b.sql", "001_a.sql"]);

    let roots = [
        Path::new(".").join(&name),
        PathBuf::from(format!("./{}/", name.display())),
        Path::new(".").join(".").join(&name),
    ];
    for root in roots {
        let source = FileSource::new(&root);
        assert_eq!(
            source.scripts().unwrap(),
            vec!["001_a.sql", "002_b.sql"],
            "root {}",
            root.display()
        );

        let script = source.read(1).unwrap();
        assert_eq!(script.name, "001_a.sql");
        assert_eq!(read_body(script), "-- 001_a.sql\nSELECT 1;");
        assert_eq!(source.name(2).unwrap(), "002_b.sql");
    }
}

#[test]
fn test_parent_relative_root_reads_scripts() {
    let (_guard, name) = local_tempdir();
    write_scripts(&name, &["001_a.sql"]);

    let cwd = std::env::current_dir().unwrap();
    let parent_hop = Path::new(".")
        .join("..")
        .join(cwd.file_name().unwrap())
        .join(&name);
    let source = FileSource::new(&parent_hop);

    assert_eq!(source.scripts().unwrap(), vec!["001_a.sql"]);
    assert_eq!(read_body(source.read(1).unwrap()), "-- 001_a.sql\nSELECT 1;");
}

#[test]
fn test_name_does_not_require_reading() {
    let dir = tempdir().unwrap();
    write_scripts(dir.path(), &["001_a.sql", "002_b.sql"]);
    let source = FileSource::new(dir.path());

    assert_eq!(source.name(2).unwrap(), "002_b.sql");
    assert!(source.name(3).unwrap_err().is_not_found());

    let embedded = StaticSource::new([("001_a.sql", "SELECT 1;")]);
    assert_eq!(embedded.name(1).unwrap(), "001_a.sql");
    assert!(embedded.name(0).unwrap_err().is_not_found());
}
