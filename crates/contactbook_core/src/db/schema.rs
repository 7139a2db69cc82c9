//! Contact store schema bootstrap.
//!
//! # Invariants
//! - A fresh database (`user_version = 0`) gets the `contacts` table and
//!   `SCHEMA_VERSION` in one transaction.
//! - A database already at `SCHEMA_VERSION` is used as is.
//! - Any other version was written by a newer build and is rejected.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Schema version stamped into `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

const CONTACTS_SCHEMA_SQL: &str = include_str!("contacts_schema.sql");

/// Creates the `contacts` table on a fresh database, or checks the stamp
/// on an existing one.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    match stored_schema_version(conn)? {
        0 => create_contacts_table(conn),
        SCHEMA_VERSION => Ok(()),
        newer => Err(DbError::UnsupportedSchemaVersion {
            db_version: newer,
            latest_supported: SCHEMA_VERSION,
        }),
    }
}

/// Reads the schema stamp of `conn`; `0` means never bootstrapped.
pub fn stored_schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn create_contacts_table(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(CONTACTS_SCHEMA_SQL)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;

    info!(
        "event=db_schema_create module=db status=ok schema_version={}",
        SCHEMA_VERSION
    );
    Ok(())
}
