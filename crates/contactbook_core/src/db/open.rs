//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure pragmas required for synchronous durability.
//! - Create or verify the contact schema before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `synchronous=FULL`.
//! - Returned connections are stamped with `SCHEMA_VERSION`.

use super::schema::ensure_schema;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// File name suggested to callers that keep one store per app data directory.
pub const DEFAULT_DB_FILE_NAME: &str = "contacts.sqlite3";

/// How long a statement waits on a locked database file before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MEMORY_LOCATION: &str = ":memory:";

/// Opens (creating if needed) a SQLite database file and bootstraps it.
///
/// # Errors
/// - `DbError::StorageUnavailable` when the file cannot be opened or configured.
/// - `DbError::UnsupportedSchemaVersion` when the file was written by a newer build.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let location = path.display().to_string();
    open_with("file", &location, || Connection::open(path))
}

/// Opens an in-memory SQLite database and bootstraps it.
///
/// Used by tests and by callers that want a throwaway store.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", MEMORY_LOCATION, Connection::open_in_memory)
}

fn open_with(
    mode: &str,
    location: &str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match connect() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(unavailable(location, err));
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(match err {
                DbError::Sqlite(source) => unavailable(location, source),
                other => other,
            })
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA synchronous = FULL;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    ensure_schema(conn)?;
    Ok(())
}

fn unavailable(location: &str, source: rusqlite::Error) -> DbError {
    DbError::StorageUnavailable {
        location: location.to_string(),
        source,
    }
}
