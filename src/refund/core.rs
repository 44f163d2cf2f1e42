//! Defines the refund model, its status machine and its database queries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{ContactId, RefundId, TransactionId},
};

/// Where a refund is in its life cycle.
///
/// Refunds start as [RefundStatus::Pending] and can only move to
/// [RefundStatus::Done], which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefundStatus {
    /// The money has not been paid back yet.
    Pending,
    /// The money has been paid back.
    Done,
}

impl RefundStatus {
    /// The text stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundStatus::Pending => "Pending",
            RefundStatus::Done => "Done",
        }
    }
}

impl Display for RefundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RefundStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RefundStatus::Pending),
            "Done" => Ok(RefundStatus::Done),
            other => Err(Error::InvalidEnumValue {
                kind: "refund status",
                value: other.to_owned(),
            }),
        }
    }
}

impl ToSql for RefundStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for RefundStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// A payment that someone owes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    /// The ID of the refund.
    pub id: RefundId,
    /// The payment being reimbursed.
    pub transaction_id: TransactionId,
    /// Whether the money has been paid back.
    pub status: RefundStatus,
    /// Who the refund should be claimed from.
    pub refund_to_contact_id: Option<ContactId>,
}

/// A refund joined with the details of its payment and beneficiary, as shown
/// in the refund lists and the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRow {
    /// The ID of the refund.
    pub id: RefundId,
    /// The payment being reimbursed.
    pub transaction_id: TransactionId,
    /// Whether the money has been paid back.
    pub status: RefundStatus,
    /// Who the refund should be claimed from.
    pub refund_to_contact_id: Option<ContactId>,
    /// The name of the contact the refund should be claimed from.
    pub refund_to_name: Option<String>,
    /// The description of the payment.
    pub description: String,
    /// The amount of the payment.
    pub amount: f64,
    /// When the payment was made.
    pub payment_date: Date,
}

/// Insert a pending refund for the transaction `transaction_id`.
///
/// Called while inserting a flagged payment, inside the same SQL transaction.
pub(crate) fn insert_pending_refund(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Refund, Error> {
    let refund = connection
        .prepare(
            "INSERT INTO refund (transaction_id, status, refund_to_contact_id)
             VALUES (?1, ?2, NULL)
             RETURNING id, transaction_id, status, refund_to_contact_id",
        )?
        .query_row((transaction_id, RefundStatus::Pending), map_refund_row)?;

    Ok(refund)
}

/// Set or clear who a refund should be claimed from.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingRefund] if `refund_id` does not refer to a refund,
/// - [Error::InvalidContact] if `contact_id` does not refer to a contact,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_refund_contact(
    refund_id: RefundId,
    contact_id: Option<ContactId>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE refund SET refund_to_contact_id = ?1 WHERE id = ?2",
            (contact_id, refund_id),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidContact(contact_id),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingRefund);
    }

    Ok(())
}

/// Mark a refund as paid back.
///
/// Completing a refund that is already done leaves it done.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingRefund] if `refund_id` does not refer to a refund,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn complete_refund(refund_id: RefundId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE refund SET status = ?1 WHERE id = ?2",
        (RefundStatus::Done, refund_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingRefund);
    }

    Ok(())
}

/// Retrieve every refund with its payment details and beneficiary name.
///
/// Rows are ordered by status (done first), then newest first.
pub fn get_all_refund_rows(connection: &Connection) -> Result<Vec<RefundRow>, Error> {
    connection
        .prepare(
            "SELECT r.id, r.transaction_id, r.status, r.refund_to_contact_id, c.name,
                t.description, t.amount, t.payment_date
             FROM refund r
             INNER JOIN \"transaction\" t ON r.transaction_id = t.id
             LEFT JOIN contact c ON r.refund_to_contact_id = c.id
             ORDER BY r.status, r.id DESC",
        )?
        .query_map([], map_refund_row_with_details)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a refund by its `id`.
#[cfg(test)]
pub fn get_refund(id: RefundId, connection: &Connection) -> Result<Refund, Error> {
    connection
        .prepare(
            "SELECT id, transaction_id, status, refund_to_contact_id FROM refund WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_refund_row)
        .map_err(|error| error.into())
}

/// Get the total number of refunds in the database.
#[cfg(test)]
pub fn count_refunds(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM refund;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the refund table.
///
/// Each transaction can have at most one refund.
pub fn create_refund_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS refund (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            transaction_id INTEGER NOT NULL UNIQUE,
            status TEXT NOT NULL CHECK (status IN ('Pending', 'Done')),
            refund_to_contact_id INTEGER,
            FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(refund_to_contact_id) REFERENCES contact(id) ON UPDATE CASCADE ON DELETE SET NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_refund_row(row: &Row) -> Result<Refund, rusqlite::Error> {
    Ok(Refund {
        id: row.get(0)?,
        transaction_id: row.get(1)?,
        status: row.get(2)?,
        refund_to_contact_id: row.get(3)?,
    })
}

fn map_refund_row_with_details(row: &Row) -> Result<RefundRow, rusqlite::Error> {
    Ok(RefundRow {
        id: row.get(0)?,
        transaction_id: row.get(1)?,
        status: row.get(2)?,
        refund_to_contact_id: row.get(3)?,
        refund_to_name: row.get(4)?,
        description: row.get(5)?,
        amount: row.get(6)?,
        payment_date: row.get(7)?,
    })
}


#[cfg(test)]
mod refund_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        contact::{Contact, ContactName, ContactType, NewContact, create_contact},
        db::initialize,
        refund::{
            Refund, RefundStatus, complete_refund, get_all_refund_rows, get_refund,
            update_refund_contact,
        },
        transaction::{Transaction, create_transaction},
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn create_flagged_payment(description: &str, connection: &mut Connection) -> Refund {
        let transaction = Transaction::build(description, 80.0, date!(2025 - 03 - 14))
            .flag_for_refund(true)
            .finalise()
            .unwrap();

        create_transaction(transaction, connection)
            .unwrap()
            .1
            .expect("flagged payment should create a refund")
    }

    fn create_test_contact(name: &str, connection: &Connection) -> Contact {
        create_contact(
            NewContact {
                name: ContactName::new_unchecked(name),
                document: None,
                kind: ContactType::Client,
                notes: None,
            },
            connection,
        )
        .unwrap()
    }

    #[test]
    fn complete_refund_marks_refund_done() {
        let mut connection = get_test_connection();
        let refund = create_flagged_payment("Train ticket", &mut connection);

        complete_refund(refund.id, &connection).unwrap();

        assert_eq!(
            get_refund(refund.id, &connection).unwrap().status,
            RefundStatus::Done
        );
    }

    #[test]
    fn complete_refund_twice_is_ok() {
        let mut connection = get_test_connection();
        let refund = create_flagged_payment("Train ticket", &mut connection);

        complete_refund(refund.id, &connection).unwrap();
        let result = complete_refund(refund.id, &connection);

        assert_eq!(result, Ok(()));
        assert_eq!(
            get_refund(refund.id, &connection).unwrap().status,
            RefundStatus::Done
        );
    }

    #[test]
    fn complete_missing_refund_fails() {
        let connection = get_test_connection();

        let result = complete_refund(999, &connection);

        assert_eq!(result, Err(Error::UpdateMissingRefund));
    }

    #[test]
    fn update_refund_contact_sets_beneficiary() {
        let mut connection = get_test_connection();
        let refund = create_flagged_payment("Train ticket", &mut connection);
        let contact = create_test_contact("Employer", &connection);

        update_refund_contact(refund.id, Some(contact.id), &connection).unwrap();

        assert_eq!(
            get_refund(refund.id, &connection)
                .unwrap()
                .refund_to_contact_id,
            Some(contact.id)
        );
    }

    #[test]
    fn update_refund_contact_to_none_clears_beneficiary() {
        let mut connection = get_test_connection();
        let refund = create_flagged_payment("Train ticket", &mut connection);
        let contact = create_test_contact("Employer", &connection);
        update_refund_contact(refund.id, Some(contact.id), &connection).unwrap();

        update_refund_contact(refund.id, None, &connection).unwrap();

        assert_eq!(
            get_refund(refund.id, &connection)
                .unwrap()
                .refund_to_contact_id,
            None
        );
    }

    #[test]
    fn update_refund_contact_fails_on_missing_contact() {
        let mut connection = get_test_connection();
        let refund = create_flagged_payment("Train ticket", &mut connection);

        let result = update_refund_contact(refund.id, Some(1234), &connection);

        assert_eq!(result, Err(Error::InvalidContact(Some(1234))));
    }

    #[test]
    fn update_refund_contact_fails_on_missing_refund() {
        let connection = get_test_connection();

        let result = update_refund_contact(77, None, &connection);

        assert_eq!(result, Err(Error::UpdateMissingRefund));
    }

    #[test]
    fn refund_rows_include_payment_details_and_beneficiary() {
        let mut connection = get_test_connection();
        let refund = create_flagged_payment("Train ticket", &mut connection);
        let contact = create_test_contact("Employer", &connection);
        update_refund_contact(refund.id, Some(contact.id), &connection).unwrap();

        let rows = get_all_refund_rows(&connection).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.id, refund.id);
        assert_eq!(row.transaction_id, refund.transaction_id);
        assert_eq!(row.description, "Train ticket");
        assert_eq!(row.amount, 80.0);
        assert_eq!(row.payment_date, date!(2025 - 03 - 14));
        assert_eq!(row.refund_to_name.as_deref(), Some("Employer"));
    }

    #[test]
    fn refund_rows_are_ordered_by_status_then_newest_first() {
        let mut connection = get_test_connection();
        let first = create_flagged_payment("First", &mut connection);
        let second = create_flagged_payment("Second", &mut connection);
        let third = create_flagged_payment("Third", &mut connection);
        complete_refund(first.id, &connection).unwrap();

        let ids: Vec<_> = get_all_refund_rows(&connection)
            .unwrap()
            .into_iter()
            .map(|row| row.id)
            .collect();

        assert_eq!(ids, [first.id, third.id, second.id]);
    }
}
