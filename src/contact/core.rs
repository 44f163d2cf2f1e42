//! Core contact domain types and database queries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::ContactId};

/// A validated, non-empty contact name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ContactName(String);

impl ContactName {
    /// Create a contact name.
    ///
    /// Leading and trailing whitespace is removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyContactName] if `name` is
    /// empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyContactName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a contact name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for ContactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContactName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContactName::new(s)
    }
}

impl Display for ContactName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The relationship with a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactType {
    /// Someone who pays you.
    Client,
    /// Someone you pay.
    Supplier,
    /// A business partner.
    Partner,
    /// Anyone else.
    Other,
}

impl ContactType {
    /// All contact types in the order they are offered in forms.
    pub const ALL: [ContactType; 4] = [
        ContactType::Client,
        ContactType::Supplier,
        ContactType::Partner,
        ContactType::Other,
    ];

    /// The text stored in the database and submitted by forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactType::Client => "Client",
            ContactType::Supplier => "Supplier",
            ContactType::Partner => "Partner",
            ContactType::Other => "Other",
        }
    }
}

impl Display for ContactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContactType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Client" => Ok(ContactType::Client),
            "Supplier" => Ok(ContactType::Supplier),
            "Partner" => Ok(ContactType::Partner),
            "Other" => Ok(ContactType::Other),
            other => Err(Error::InvalidEnumValue {
                kind: "contact type",
                value: other.to_owned(),
            }),
        }
    }
}

impl ToSql for ContactType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ContactType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// A person or business that money is paid to or received from.
///
/// Contacts are never edited or deleted once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// The ID of the contact.
    pub id: ContactId,
    /// The unique name of the contact.
    pub name: ContactName,
    /// An identifying document number, e.g. a tax number.
    pub document: Option<String>,
    /// The relationship with the contact.
    pub kind: ContactType,
    /// Free text notes.
    pub notes: Option<String>,
}

/// The data needed to create a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    /// The unique name of the contact.
    pub name: ContactName,
    /// An identifying document number, e.g. a tax number.
    pub document: Option<String>,
    /// The relationship with the contact.
    pub kind: ContactType,
    /// Free text notes.
    pub notes: Option<String>,
}

/// Create a contact and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateContactName] if a contact with the same name exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_contact(contact: NewContact, connection: &Connection) -> Result<Contact, Error> {
    connection
        .execute(
            "INSERT INTO contact (name, document, type, notes) VALUES (?1, ?2, ?3, ?4);",
            (
                contact.name.as_ref(),
                &contact.document,
                contact.kind,
                &contact.notes,
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateContactName(contact.name.to_string()),
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Contact {
        id,
        name: contact.name,
        document: contact.document,
        kind: contact.kind,
        notes: contact.notes,
    })
}

/// Retrieve all contacts ordered alphabetically by name.
pub fn get_all_contacts(connection: &Connection) -> Result<Vec<Contact>, Error> {
    connection
        .prepare("SELECT id, name, document, type, notes FROM contact ORDER BY name ASC;")?
        .query_map([], map_contact_row)?
        .map(|maybe_contact| maybe_contact.map_err(|error| error.into()))
        .collect()
}

/// Get the total number of contacts in the database.
#[cfg(test)]
pub fn count_contacts(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM contact;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the contact table.
pub fn create_contact_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS contact (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            document TEXT,
            type TEXT NOT NULL CHECK (type IN ('Client', 'Supplier', 'Partner', 'Other')),
            notes TEXT
        )",
        (),
    )?;

    Ok(())
}

fn map_contact_row(row: &Row) -> Result<Contact, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = ContactName::new_unchecked(&raw_name);
    let document = row.get(2)?;
    let kind = row.get(3)?;
    let notes = row.get(4)?;

    Ok(Contact {
        id,
        name,
        document,
        kind,
        notes,
    })
}



#[cfg(test)]
mod contact_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        contact::{
            Contact, ContactName, ContactType, NewContact, count_contacts, create_contact,
            get_all_contacts,
        },
        db::initialize,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn new_contact(name: &str) -> NewContact {
        NewContact {
            name: ContactName::new_unchecked(name),
            document: None,
            kind: ContactType::Client,
            notes: None,
        }
    }

    #[test]
    fn create_contact_succeeds() {
        let connection = get_test_connection();
        let contact = NewContact {
            name: ContactName::new_unchecked("Jane Doe"),
            document: Some("123.456.789-00".to_owned()),
            kind: ContactType::Partner,
            notes: Some("Met at the conference".to_owned()),
        };

        let created = create_contact(contact, &connection).unwrap();

        assert_eq!(
            created,
            Contact {
                id: 1,
                name: ContactName::new_unchecked("Jane Doe"),
                document: Some("123.456.789-00".to_owned()),
                kind: ContactType::Partner,
                notes: Some("Met at the conference".to_owned()),
            }
        );
        assert_eq!(get_all_contacts(&connection), Ok(vec![created]));
    }

    #[test]
    fn create_contact_fails_on_duplicate_name() {
        let connection = get_test_connection();
        create_contact(new_contact("ACME"), &connection).unwrap();

        let result = create_contact(new_contact("ACME"), &connection);

        assert_eq!(result, Err(Error::DuplicateContactName("ACME".to_owned())));
        assert_eq!(count_contacts(&connection), Ok(1));
    }

    #[test]
    fn get_all_contacts_orders_by_name() {
        let connection = get_test_connection();
        for name in ["Zed", "Alice", "Mallory"] {
            create_contact(new_contact(name), &connection).unwrap();
        }

        let names: Vec<String> = get_all_contacts(&connection)
            .unwrap()
            .into_iter()
            .map(|contact| contact.name.to_string())
            .collect();

        assert_eq!(names, ["Alice", "Mallory", "Zed"]);
    }
}
