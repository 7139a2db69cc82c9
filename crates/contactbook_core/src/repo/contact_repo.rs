//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide fetch-all / upsert / delete over the `contacts` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Inserts are upserts keyed by `id`; a replaced row keeps its position.
//! - Deleting a missing contact is a successful no-op.
//! - Every write is committed before the call returns.
//! - Read paths reject undecodable rows instead of masking them.

use crate::db::schema::{stored_schema_version, SCHEMA_VERSION};
use crate::db::DbError;
use crate::model::contact::{Contact, ContactId};
use log::debug;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_SELECT_SQL: &str = "SELECT id, name, tel FROM contacts ORDER BY seq ASC;";

const CONTACT_UPSERT_SQL: &str = "INSERT INTO contacts (id, name, tel)
     VALUES (?1, ?2, ?3)
     ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        tel = excluded.tel;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Read-path SQLite failure.
    Db(DbError),
    /// Insert/delete could not be durably committed.
    WriteFailed(DbError),
    /// Persisted row cannot be converted into a `Contact`.
    InvalidData(String),
    /// Connection schema is not at the expected version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::WriteFailed(err) => write!(f, "contact write failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "contact repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "contact repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "contact repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) | Self::WriteFailed(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for contact storage.
///
/// Implementations must keep the upsert and idempotent-delete contracts
/// documented on each method; `ContactList` relies on them to stay in step
/// with the store.
pub trait ContactRepository {
    /// Returns every stored contact in store-native order.
    ///
    /// The order is stable while no mutation happens in between. An empty
    /// store yields an empty vec.
    fn fetch_all(&self) -> RepoResult<Vec<Contact>>;

    /// Creates the contact, or replaces `name`/`tel` of the stored contact
    /// with the same `id`.
    fn insert(&self, contact: &Contact) -> RepoResult<()>;

    /// Batch form of [`ContactRepository::insert`], committed as one unit.
    ///
    /// Later items win when the batch repeats an id.
    fn insert_all(&self, contacts: &[Contact]) -> RepoResult<()>;

    /// Removes the stored contact sharing `contact.id`, if any.
    ///
    /// Missing rows are not an error.
    fn delete(&self, contact: &Contact) -> RepoResult<()>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Creates repository from a bootstrapped connection.
    ///
    /// Connections that did not go through `db::open_db*` are rejected.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_contact_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn fetch_all(&self) -> RepoResult<Vec<Contact>> {
        let mut stmt = self.conn.prepare(CONTACT_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();

        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }

        debug!(
            "event=contact_fetch_all module=repo status=ok count={}",
            contacts.len()
        );
        Ok(contacts)
    }

    fn insert(&self, contact: &Contact) -> RepoResult<()> {
        self.conn
            .execute(
                CONTACT_UPSERT_SQL,
                params![contact.id, contact.name.as_str(), contact.tel.as_str()],
            )
            .map_err(write_failed)?;

        debug!(
            "event=contact_insert module=repo status=ok id={}",
            contact.id
        );
        Ok(())
    }

    fn insert_all(&self, contacts: &[Contact]) -> RepoResult<()> {
        if contacts.is_empty() {
            return Ok(());
        }

        let tx = self.conn.unchecked_transaction().map_err(write_failed)?;
        {
            let mut stmt = tx.prepare(CONTACT_UPSERT_SQL).map_err(write_failed)?;
            for contact in contacts {
                stmt.execute(params![
                    contact.id,
                    contact.name.as_str(),
                    contact.tel.as_str()
                ])
                .map_err(write_failed)?;
            }
        }
        tx.commit().map_err(write_failed)?;

        debug!(
            "event=contact_insert_all module=repo status=ok count={}",
            contacts.len()
        );
        Ok(())
    }

    fn delete(&self, contact: &Contact) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", [contact.id])
            .map_err(write_failed)?;

        let status = if changed == 0 { "noop" } else { "ok" };
        debug!(
            "event=contact_delete module=repo status={status} id={}",
            contact.id
        );
        Ok(())
    }
}

fn write_failed(err: rusqlite::Error) -> RepoError {
    RepoError::WriteFailed(DbError::Sqlite(err))
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let id: ContactId = match row.get_ref("id")? {
        ValueRef::Integer(value) => value,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid id of type {} in contacts.id",
                other.data_type()
            )));
        }
    };

    Ok(Contact {
        id,
        name: parse_text_column(row, "name")?,
        tel: parse_text_column(row, "tel")?,
    })
}

fn parse_text_column(row: &Row<'_>, column: &'static str) -> RepoResult<String> {
    match row.get_ref(column)? {
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec()).map_err(|_| {
            RepoError::InvalidData(format!("invalid utf-8 text in contacts.{column}"))
        }),
        other => Err(RepoError::InvalidData(format!(
            "invalid {column} of type {} in contacts.{column}",
            other.data_type()
        ))),
    }
}

fn ensure_contact_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = SCHEMA_VERSION;
    let actual_version = stored_schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "contacts")? {
        return Err(RepoError::MissingRequiredTable("contacts"));
    }

    for column in ["seq", "id", "name", "tel"] {
        if !table_has_column(conn, "contacts", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "contacts",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
