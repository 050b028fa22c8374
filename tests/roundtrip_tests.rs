use std::io::Write;

use litescope::engine::{Database, Session, DEFAULT_EXPORT_NAME};

const SEED: &str = "
    CREATE TABLE invoice (id INTEGER PRIMARY KEY, customer TEXT, total REAL);
    INSERT INTO invoice VALUES (1, 'Alice', 9.99);
    INSERT INTO invoice VALUES (2, 'Bob', 12.50);
    INSERT INTO invoice VALUES (3, NULL, 0.0);
    CREATE VIEW paying AS SELECT customer FROM invoice WHERE total > 0;
";

fn seeded_file() -> tempfile::NamedTempFile {
    let db = Database::empty().unwrap();
    db.execute_script(SEED).unwrap();
    let mut file = tempfile::Builder::new()
        .suffix(".sqlite3")
        .tempfile()
        .unwrap();
    file.write_all(&db.to_bytes().unwrap()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_export_reload_preserves_catalog_and_rows() {
    let file = seeded_file();
    let mut session = Session::new().unwrap();
    session.load_from_path(file.path()).unwrap();

    let exported = tempfile::Builder::new().suffix(".sqlite").tempfile().unwrap();
    session.export_to_path(exported.path()).unwrap();

    let mut reloaded = Session::new().unwrap();
    reloaded.load_from_path(exported.path()).unwrap();

    assert_eq!(session.catalog(), reloaded.catalog());

    for sql in [
        "SELECT * FROM invoice ORDER BY id;",
        "SELECT * FROM paying;",
        "SELECT COUNT(*) FROM invoice;",
    ] {
        assert_eq!(
            session.db().query(sql, &[]).unwrap(),
            reloaded.db().query(sql, &[]).unwrap(),
            "round trip diverged for {}",
            sql
        );
    }
}

#[test]
fn test_export_bytes_equals_reimported_image() {
    let file = seeded_file();
    let mut session = Session::new().unwrap();
    session.load_from_path(file.path()).unwrap();

    let bytes = session.export_bytes().unwrap();
    let mut second = Session::new().unwrap();
    second.load_from_bytes(&bytes, "copy.sqlite").unwrap();
    assert_eq!(session.catalog(), second.catalog());
}

#[test]
fn test_display_name_follows_loaded_file() {
    let file = seeded_file();
    let mut session = Session::new().unwrap();
    session.load_from_path(file.path()).unwrap();

    let expected = file.path().file_name().unwrap().to_string_lossy();
    assert_eq!(session.export_name(), expected);
}

#[test]
fn test_unloaded_session_exports_under_default_name() {
    let session = Session::new().unwrap();
    assert_eq!(session.export_name(), DEFAULT_EXPORT_NAME);
}

#[test]
fn test_invalid_image_on_disk_keeps_previous_database() {
    let file = seeded_file();
    let mut session = Session::new().unwrap();
    session.load_from_path(file.path()).unwrap();

    let mut bogus = tempfile::Builder::new().suffix(".db").tempfile().unwrap();
    bogus.write_all(b"definitely not a database").unwrap();
    bogus.flush().unwrap();

    assert!(session.load_from_path(bogus.path()).is_err());
    assert_eq!(session.catalog().len(), 2);
    let set = session
        .db()
        .query("SELECT COUNT(*) FROM invoice;", &[])
        .unwrap();
    assert_eq!(set.values[0][0], litescope::result::Value::Integer(3));
}

#[test]
fn test_exported_empty_database_reloads_cleanly() {
    let session = Session::new().unwrap();
    let bytes = session.export_bytes().unwrap();

    let mut reloaded = Session::new().unwrap();
    reloaded.load_from_bytes(&bytes, "empty.sqlite").unwrap();
    assert!(reloaded.catalog().is_empty());
}
