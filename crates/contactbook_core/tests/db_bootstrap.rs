use contactbook_core::db::schema::{stored_schema_version, SCHEMA_VERSION};
use contactbook_core::db::{open_db, open_db_in_memory, DbError, DEFAULT_DB_FILE_NAME};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_contacts_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    assert_table_exists(&conn, "contacts");
}

#[test]
fn open_db_enables_synchronous_full() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join(DEFAULT_DB_FILE_NAME)).unwrap();

    // FULL == 2
    let synchronous: i64 = conn
        .query_row("PRAGMA synchronous;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(synchronous, 2);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_DB_FILE_NAME);

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), SCHEMA_VERSION);
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), SCHEMA_VERSION);
    assert_table_exists(&conn_second, "contacts");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn opening_next_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("next.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION + 1))
        .unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion { db_version, .. } => {
            assert_eq!(db_version, SCHEMA_VERSION + 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unversioned_file_gets_contacts_table_and_keeps_other_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE app_settings (key TEXT PRIMARY KEY, value TEXT);
         INSERT INTO app_settings (key, value) VALUES ('theme', 'dark');",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    assert_table_exists(&conn, "contacts");
    let theme: String = conn
        .query_row("SELECT value FROM app_settings;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(theme, "dark");
}

#[test]
fn opening_path_inside_missing_directory_is_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing/nested/contacts.db");

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::StorageUnavailable { location, .. } => {
            assert!(location.ends_with("contacts.db"), "location: {location}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn opening_non_database_file_is_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.db");
    std::fs::write(&path, vec![0x5a_u8; 4096]).unwrap();

    let err = open_db(&path).unwrap_err();
    assert!(
        matches!(err, DbError::StorageUnavailable { .. }),
        "unexpected error: {err}"
    );
}

fn schema_version(conn: &Connection) -> u32 {
    stored_schema_version(conn).unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
