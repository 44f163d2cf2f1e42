//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{ContactId, TransactionId},
    refund::{Refund, insert_pending_refund},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money left (payment) or arrived (receipt).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money that was paid out.
    Payment,
    /// Money that was received.
    Receipt,
}

impl TransactionType {
    /// All transaction types in the order they are offered in forms.
    pub const ALL: [TransactionType; 2] = [TransactionType::Payment, TransactionType::Receipt];

    /// The text stored in the database and submitted by forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Payment => "Payment",
            TransactionType::Receipt => "Receipt",
        }
    }
}

/// Whether the cash has actually moved yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// The money has been paid or received.
    Settled,
    /// The money is still to be paid or received.
    Pending,
}

impl TransactionStatus {
    /// All transaction statuses in the order they are offered in forms.
    pub const ALL: [TransactionStatus; 2] =
        [TransactionStatus::Settled, TransactionStatus::Pending];

    /// The text stored in the database and submitted by forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Settled => "Settled",
            TransactionStatus::Pending => "Pending",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Payment" => Ok(TransactionType::Payment),
            "Receipt" => Ok(TransactionType::Receipt),
            other => Err(Error::InvalidEnumValue {
                kind: "transaction type",
                value: other.to_owned(),
            }),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Settled" => Ok(TransactionStatus::Settled),
            "Pending" => Ok(TransactionStatus::Pending),
            other => Err(Error::InvalidEnumValue {
                kind: "transaction status",
                value: other.to_owned(),
            }),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

impl ToSql for TransactionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// A payment or receipt, i.e. an event where money was either spent or earned.
///
/// Transactions are never edited after they are recorded, they can only be
/// deleted. To record a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money paid or received, always greater than zero.
    pub amount: f64,
    /// Whether the money was paid or received.
    pub kind: TransactionType,
    /// Whether the money has moved yet.
    pub status: TransactionStatus,
    /// When the money was (or will be) paid or received.
    pub payment_date: Date,
    /// A free text category, e.g. "Travel".
    pub category: Option<String>,
    /// The contact the money was paid to or received from.
    pub contact_id: Option<ContactId>,
}

impl Transaction {
    /// Start recording a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(description: &str, amount: f64, payment_date: Date) -> TransactionBuilder {
        TransactionBuilder {
            description: description.to_owned(),
            amount,
            kind: TransactionType::Payment,
            status: TransactionStatus::Settled,
            payment_date,
            category: None,
            contact_id: None,
            flag_for_refund: false,
        }
    }
}

/// A builder for creating [NewTransaction] instances.
///
/// The builder holds the raw user input. Call [TransactionBuilder::finalise]
/// to validate it.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// let transaction = Transaction::build("Taxi to the airport", 45.99, date!(2025 - 01 - 15))
///     .category(Some("Travel"))
///     .flag_for_refund(true)
///     .finalise()
///     .unwrap();
///
/// assert!(transaction.creates_refund());
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// A human-readable description of the transaction.
    pub description: String,

    /// The amount of money, must be greater than zero.
    ///
    /// The direction of the money is given by `kind`, not the sign.
    pub amount: f64,

    /// Whether the money was paid or received. Defaults to a payment.
    pub kind: TransactionType,

    /// Whether the money has moved yet. Defaults to settled.
    pub status: TransactionStatus,

    /// The date when the money was (or will be) paid or received.
    pub payment_date: Date,

    /// Optional free text category. Blank text is treated as no category.
    pub category: Option<String>,

    /// The contact the money was paid to or received from.
    pub contact_id: Option<ContactId>,

    /// Whether the user asked to be reimbursed for this transaction.
    ///
    /// Only payments can be reimbursed, the flag is ignored for receipts.
    pub flag_for_refund: bool,
}

impl TransactionBuilder {
    /// Set whether the money was paid or received.
    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = kind;
        self
    }

    /// Set whether the money has moved yet.
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the category.
    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = category.map(str::to_owned);
        self
    }

    /// Set the contact.
    pub fn contact_id(mut self, contact_id: Option<ContactId>) -> Self {
        self.contact_id = contact_id;
        self
    }

    /// Ask for a refund to be tracked for this transaction.
    pub fn flag_for_refund(mut self, flag_for_refund: bool) -> Self {
        self.flag_for_refund = flag_for_refund;
        self
    }

    /// Validate the input and produce a [NewTransaction].
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::EmptyDescription] if the description is empty or only whitespace,
    /// - or [Error::InvalidAmount] if the amount is not a number greater than zero.
    pub fn finalise(self) -> Result<NewTransaction, Error> {
        let description = self.description.trim();

        if description.is_empty() {
            return Err(Error::EmptyDescription);
        }

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidAmount(self.amount));
        }

        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .map(str::to_owned);

        Ok(NewTransaction {
            description: description.to_owned(),
            amount: self.amount,
            kind: self.kind,
            status: self.status,
            payment_date: self.payment_date,
            category,
            contact_id: self.contact_id,
            creates_refund: self.flag_for_refund && self.kind == TransactionType::Payment,
        })
    }
}

/// A validated transaction that is ready to be inserted into the database.
///
/// Can only be created through [TransactionBuilder::finalise].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    description: String,
    amount: f64,
    kind: TransactionType,
    status: TransactionStatus,
    payment_date: Date,
    category: Option<String>,
    contact_id: Option<ContactId>,
    creates_refund: bool,
}

impl NewTransaction {
    /// Whether inserting this transaction also opens a pending refund.
    ///
    /// Always `false` for receipts.
    pub fn creates_refund(&self) -> bool {
        self.creates_refund
    }

    /// The trimmed description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Insert a transaction and, if requested, its pending refund.
///
/// Both rows are written in a single SQL transaction, so either both are
/// stored or neither is.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidContact] if the contact ID does not refer to a contact,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    transaction: NewTransaction,
    connection: &mut Connection,
) -> Result<(Transaction, Option<Refund>), Error> {
    let sql_transaction = connection.transaction()?;

    let created = sql_transaction
        .prepare(
            "INSERT INTO \"transaction\"
                (description, amount, type, status, payment_date, category, contact_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, description, amount, type, status, payment_date, category, contact_id",
        )?
        .query_row(
            (
                &transaction.description,
                transaction.amount,
                transaction.kind,
                transaction.status,
                transaction.payment_date,
                &transaction.category,
                transaction.contact_id,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidContact(transaction.contact_id),
            error => error.into(),
        })?;

    let refund = if transaction.creates_refund {
        Some(insert_pending_refund(created.id, &sql_transaction)?)
    } else {
        None
    };

    sql_transaction.commit()?;

    Ok((created, refund))
}

/// Delete a transaction together with any refund that references it.
///
/// Both deletes run in a single SQL transaction. Deleting an ID that does not
/// exist is not an error.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(id: TransactionId, connection: &mut Connection) -> Result<(), Error> {
    let sql_transaction = connection.transaction()?;

    let refunds_deleted =
        sql_transaction.execute("DELETE FROM refund WHERE transaction_id = ?1", [id])?;
    let transactions_deleted =
        sql_transaction.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    sql_transaction.commit()?;

    tracing::debug!(
        "deleted {transactions_deleted} transaction(s) and {refunds_deleted} refund(s) for transaction {id}"
    );

    Ok(())
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
#[cfg(test)]
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, description, amount, type, status, payment_date, category, contact_id
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get the total number of transactions in the database.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL CHECK (length(trim(description)) > 0),
                amount REAL NOT NULL CHECK (amount > 0),
                type TEXT NOT NULL CHECK (type IN ('Payment', 'Receipt')),
                status TEXT NOT NULL CHECK (status IN ('Settled', 'Pending')),
                payment_date TEXT NOT NULL,
                category TEXT,
                contact_id INTEGER,
                FOREIGN KEY(contact_id) REFERENCES contact(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// The row must hold the transaction columns in table order, starting at
/// `offset`.
pub fn map_transaction_row_with_offset(
    row: &Row,
    offset: usize,
) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(offset)?,
        description: row.get(offset + 1)?,
        amount: row.get(offset + 2)?,
        kind: row.get(offset + 3)?,
        status: row.get(offset + 4)?,
        payment_date: row.get(offset + 5)?,
        category: row.get(offset + 6)?,
        contact_id: row.get(offset + 7)?,
    })
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    map_transaction_row_with_offset(row, 0)
}

// ============================================================================
// TESTS
// ============================================================================
