//! Creates the database schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, contact::create_contact_table, refund::create_refund_table,
    transaction::create_transaction_table,
};

/// Turn on the per-connection settings the schema relies on.
///
/// Must be called on every new connection, outside of any SQL transaction.
pub fn configure_connection(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    Ok(())
}

/// Create the contact, transaction and refund tables if they do not exist.
///
/// The tables are created in a single exclusive SQL transaction.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    configure_connection(connection)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_contact_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_refund_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
