//! The data access boundary between the web handlers and the database.

use std::{
    fmt::Debug,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;

use crate::{
    Error,
    config::DatabaseSecrets,
    contact::{Contact, NewContact, create_contact},
    database_id::{ContactId, RefundId, TransactionId},
    db::{configure_connection, initialize},
    ledger::{Ledger, fetch_ledger},
    refund::{self, Refund, update_refund_contact},
    transaction::{self, NewTransaction, Transaction},
};

/// The operations the application performs on its data.
///
/// Each call is a complete unit of work: implementations acquire whatever
/// resources they need and release them before returning, on success and on
/// error.
pub trait Store: Debug + Send + Sync {
    /// Read every transaction, refund and contact from one consistent snapshot.
    fn fetch_all(&self) -> Result<Ledger, Error>;

    /// Record a transaction, and a pending refund if it was flagged for one.
    ///
    /// Either both rows are stored or neither is.
    fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<(Transaction, Option<Refund>), Error>;

    /// Delete a transaction and its refund. Deleting a missing ID does nothing.
    fn delete_transaction(&self, id: TransactionId) -> Result<(), Error>;

    /// Add a contact with a unique name.
    fn create_contact(&self, contact: NewContact) -> Result<Contact, Error>;

    /// Set or clear who a refund should be claimed from.
    fn reassign_refund_contact(
        &self,
        refund_id: RefundId,
        contact_id: Option<ContactId>,
    ) -> Result<(), Error>;

    /// Mark a refund as paid back.
    fn complete_refund(&self, refund_id: RefundId) -> Result<(), Error>;
}

#[derive(Debug, Clone)]
enum ConnectionSource {
    /// Open a new connection for every operation.
    Path(String),
    /// Share a single connection, used for in-memory databases.
    Shared(Arc<Mutex<Connection>>),
}

/// A [Store] backed by SQLite.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    source: ConnectionSource,
}

impl SqliteStore {
    /// Connect to the database described by `secrets`.
    ///
    /// The database is opened once to create any missing tables, then closed.
    /// Every later operation opens its own connection.
    ///
    /// The URL may be a `sqlite://` URL, a `file:` URI or a plain path. The
    /// auth token is not needed by local SQLite files.
    ///
    /// # Errors
    /// Returns an [Error::ConnectionFailed] if the database cannot be opened,
    /// or another [Error] if the tables cannot be created.
    pub fn connect(secrets: &DatabaseSecrets) -> Result<Self, Error> {
        let path = database_path(&secrets.url).to_owned();

        let connection = open_connection(&path)?;
        initialize(&connection)?;
        close_connection(connection);

        tracing::info!("Connected to the database at {path}");

        Ok(Self {
            source: ConnectionSource::Path(path),
        })
    }

    /// Create a store backed by a new, empty in-memory database.
    ///
    /// # Errors
    /// Returns an [Error] if the tables cannot be created.
    pub fn in_memory() -> Result<Self, Error> {
        let connection = Connection::open_in_memory()?;
        initialize(&connection)?;

        Ok(Self {
            source: ConnectionSource::Shared(Arc::new(Mutex::new(connection))),
        })
    }

    /// Run `operation` with a connection that is released afterwards.
    fn with_session<T>(
        &self,
        operation: impl FnOnce(&mut Connection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        match &self.source {
            ConnectionSource::Path(path) => {
                let mut connection = open_connection(path)?;
                let result = operation(&mut connection);
                close_connection(connection);

                result
            }
            ConnectionSource::Shared(connection) => {
                let mut connection = connection.lock().map_err(|error| {
                    tracing::error!("could not acquire database lock: {error}");
                    Error::DatabaseLockError
                })?;

                operation(&mut connection)
            }
        }
    }
}

impl Store for SqliteStore {
    fn fetch_all(&self) -> Result<Ledger, Error> {
        self.with_session(fetch_ledger)
    }

    fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<(Transaction, Option<Refund>), Error> {
        self.with_session(|connection| transaction::create_transaction(transaction, connection))
    }

    fn delete_transaction(&self, id: TransactionId) -> Result<(), Error> {
        self.with_session(|connection| transaction::delete_transaction(id, connection))
    }

    fn create_contact(&self, contact: NewContact) -> Result<Contact, Error> {
        self.with_session(|connection| create_contact(contact, connection))
    }

    fn reassign_refund_contact(
        &self,
        refund_id: RefundId,
        contact_id: Option<ContactId>,
    ) -> Result<(), Error> {
        self.with_session(|connection| update_refund_contact(refund_id, contact_id, connection))
    }

    fn complete_refund(&self, refund_id: RefundId) -> Result<(), Error> {
        self.with_session(|connection| refund::complete_refund(refund_id, connection))
    }
}

/// Get the path or SQLite URI to open from a database URL.
fn database_path(url: &str) -> &str {
    url.strip_prefix("sqlite://").unwrap_or(url)
}

fn open_connection(path: &str) -> Result<Connection, Error> {
    let connection = Connection::open(path)?;
    configure_connection(&connection)?;

    Ok(connection)
}

fn close_connection(connection: Connection) {
    if let Err((_, error)) = connection.close() {
        tracing::warn!("could not close the database connection: {error}");
    }
}
