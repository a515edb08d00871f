//! Sessions: one unit of work against the SQLite store.
//!
//! A [`Session`] is acquired from a [`SessionProvider`] at the start of a
//! request and released when it goes out of scope, whichever way the request
//! ends. The server never holds a provider as a global; it is handed one when
//! the router is built, which is also how tests swap in an isolated store.
//!
//! Two storage modes exist:
//! * [`PersistenceMode::File`] opens a fresh connection per session, so
//!   concurrent requests get independent connections and SQLite does the
//!   locking.
//! * [`PersistenceMode::InMemory`] keeps a single connection alive (an
//!   in-memory database disappears with its last connection) and hands it out
//!   behind a mutex, one session at a time.

use std::ops::Deref;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::Connection;
use tracing::debug;

use crate::error::{OrgmapError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceMode {
    InMemory,
    File(PathBuf),
}

/// Hands out sessions. Implementations must release whatever a session holds
/// when the session is dropped.
pub trait SessionProvider: Send + Sync {
    fn session(&self) -> Result<Session<'_>>;
}

/// Scoped handle on a connection. Dereferences to [`rusqlite::Connection`].
pub enum Session<'p> {
    Owned(Connection),
    Shared(MutexGuard<'p, Connection>),
}

impl Deref for Session<'_> {
    type Target = Connection;
    fn deref(&self) -> &Connection {
        match self {
            Session::Owned(connection) => connection,
            Session::Shared(guard) => &**guard,
        }
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        debug!(shared = matches!(self, Session::Shared(_)), "session released");
    }
}

enum Store {
    Memory(Mutex<Connection>),
    File(PathBuf),
}

/// SQLite backed [`SessionProvider`].
pub struct SqliteSessions {
    store: Store,
}

impl SqliteSessions {
    /// Opens the store and makes sure the schema exists.
    pub fn new(mode: PersistenceMode) -> Result<Self> {
        let store = match mode {
            PersistenceMode::InMemory => {
                let connection = Connection::open_in_memory()?;
                configure(&connection)?;
                provision_schema(&connection)?;
                Store::Memory(Mutex::new(connection))
            }
            PersistenceMode::File(path) => {
                let connection = Connection::open(&path)?;
                configure(&connection)?;
                provision_schema(&connection)?;
                Store::File(path)
            }
        };
        Ok(Self { store })
    }
}

impl SessionProvider for SqliteSessions {
    fn session(&self) -> Result<Session<'_>> {
        let session = match &self.store {
            Store::Memory(connection) => Session::Shared(
                connection
                    .lock()
                    .map_err(|e| OrgmapError::Lock(e.to_string()))?,
            ),
            Store::File(path) => {
                let connection = Connection::open(path)?;
                configure(&connection)?;
                Session::Owned(connection)
            }
        };
        debug!(shared = matches!(session, Session::Shared(_)), "session acquired");
        Ok(session)
    }
}

// Foreign keys are off by default in SQLite and the pragma is per connection.
fn configure(connection: &Connection) -> Result<()> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    connection.busy_timeout(Duration::from_secs(5))?;
    Ok(())
}

fn provision_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(
        "
        create table if not exists organisation (
            id integer primary key autoincrement,
            name text not null
        );
        create table if not exists location (
            id integer primary key autoincrement,
            organisation_id integer not null,
            location_name text not null,
            longitude real not null,
            latitude real not null,
            constraint location_belongs_to_organisation foreign key (
                organisation_id
            ) references organisation(id)
        );
        create index if not exists location_organisation_id on location (
            organisation_id
        );
        ",
    )?;
    Ok(())
}
