//! The full snapshot of the data that every page renders from.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    contact::{Contact, get_all_contacts},
    refund::{RefundRow, RefundStatus, get_all_refund_rows},
    transaction::{Transaction, map_transaction_row_with_offset},
};

/// A transaction with the name of its contact resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// The stored transaction.
    pub transaction: Transaction,
    /// The name of the contact, if the transaction has one.
    pub contact_name: Option<String>,
}

/// Everything in the database, read in one go.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// All transactions, newest first.
    pub transactions: Vec<LedgerTransaction>,
    /// All refunds, done refunds first, then newest first.
    pub refunds: Vec<RefundRow>,
    /// All contacts, ordered by name.
    pub contacts: Vec<Contact>,
}

impl Ledger {
    /// The refunds that have not been paid back yet.
    pub fn pending_refunds(&self) -> impl Iterator<Item = &RefundRow> {
        self.refunds_with_status(RefundStatus::Pending)
    }

    /// The refunds that have been paid back.
    pub fn completed_refunds(&self) -> impl Iterator<Item = &RefundRow> {
        self.refunds_with_status(RefundStatus::Done)
    }

    fn refunds_with_status(&self, status: RefundStatus) -> impl Iterator<Item = &RefundRow> {
        self.refunds
            .iter()
            .filter(move |refund| refund.status == status)
    }
}

/// Read all transactions, refunds and contacts.
///
/// The three queries run inside one SQL transaction so that they see the
/// same snapshot of the database.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the queries fail.
pub fn fetch_ledger(connection: &mut Connection) -> Result<Ledger, Error> {
    let sql_transaction = connection.transaction()?;

    let transactions = get_all_ledger_transactions(&sql_transaction)?;
    let refunds = get_all_refund_rows(&sql_transaction)?;
    let contacts = get_all_contacts(&sql_transaction)?;

    sql_transaction.commit()?;

    Ok(Ledger {
        transactions,
        refunds,
        contacts,
    })
}

fn get_all_ledger_transactions(connection: &Connection) -> Result<Vec<LedgerTransaction>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.description, t.amount, t.type, t.status, t.payment_date,
                t.category, t.contact_id, c.name
             FROM \"transaction\" t
             LEFT JOIN contact c ON t.contact_id = c.id
             ORDER BY t.id DESC",
        )?
        .query_map([], map_ledger_transaction_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

fn map_ledger_transaction_row(row: &Row) -> Result<LedgerTransaction, rusqlite::Error> {
    Ok(LedgerTransaction {
        transaction: map_transaction_row_with_offset(row, 0)?,
        contact_name: row.get(8)?,
    })
}

#[cfg(test)]
mod fetch_ledger_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        contact::{ContactName, ContactType, NewContact, create_contact},
        db::initialize,
        ledger::fetch_ledger,
        refund::complete_refund,
        transaction::{Transaction, TransactionType, create_transaction},
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn empty_database_gives_empty_ledger() {
        let mut connection = get_test_connection();

        let ledger = fetch_ledger(&mut connection).unwrap();

        assert!(ledger.transactions.is_empty());
        assert!(ledger.refunds.is_empty());
        assert!(ledger.contacts.is_empty());
    }

    #[test]
    fn transactions_are_newest_first_with_contact_names() {
        let mut connection = get_test_connection();
        let contact = create_contact(
            NewContact {
                name: ContactName::new_unchecked("Landlord"),
                document: None,
                kind: ContactType::Supplier,
                notes: None,
            },
            &connection,
        )
        .unwrap();
        let rent = Transaction::build("Rent", 1200.0, date!(2025 - 02 - 01))
            .contact_id(Some(contact.id))
            .finalise()
            .unwrap();
        let salary = Transaction::build("Salary", 3000.0, date!(2025 - 02 - 02))
            .kind(TransactionType::Receipt)
            .finalise()
            .unwrap();
        create_transaction(rent, &mut connection).unwrap();
        create_transaction(salary, &mut connection).unwrap();

        let ledger = fetch_ledger(&mut connection).unwrap();

        let rows: Vec<_> = ledger
            .transactions
            .iter()
            .map(|row| {
                (
                    row.transaction.description.as_str(),
                    row.contact_name.as_deref(),
                )
            })
            .collect();
        assert_eq!(rows, [("Salary", None), ("Rent", Some("Landlord"))]);
        assert_eq!(ledger.contacts.len(), 1);
    }

    #[test]
    fn partitions_refunds_by_status() {
        let mut connection = get_test_connection();
        let mut refund_ids = Vec::new();
        for description in ["Taxi", "Hotel"] {
            let transaction = Transaction::build(description, 50.0, date!(2025 - 02 - 01))
                .flag_for_refund(true)
                .finalise()
                .unwrap();
            let (_, refund) = create_transaction(transaction, &mut connection).unwrap();
            refund_ids.push(refund.unwrap().id);
        }
        complete_refund(refund_ids[0], &connection).unwrap();

        let ledger = fetch_ledger(&mut connection).unwrap();

        let pending: Vec<_> = ledger
            .pending_refunds()
            .map(|refund| refund.description.as_str())
            .collect();
        let completed: Vec<_> = ledger
            .completed_refunds()
            .map(|refund| refund.description.as_str())
            .collect();
        assert_eq!(pending, ["Hotel"]);
        assert_eq!(completed, ["Taxi"]);
    }
}
