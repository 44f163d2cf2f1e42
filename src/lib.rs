//! Cashbook is a web app for keeping track of payments, receipts and the
//! reimbursements you are owed.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
pub mod config;
mod contact;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod export;
mod html;
mod internal_server_error;
mod ledger;
mod logging;
mod navigation;
mod not_found;
mod refund;
mod routing;
mod store;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use contact::{Contact, ContactName, ContactType, NewContact};
pub use dashboard::CashSummary;
pub use database_id::{ContactId, DatabaseId, RefundId, TransactionId};
pub use db::initialize as initialize_db;
pub use export::{EXPORT_CONTENT_TYPE, build_workbook};
pub use ledger::{Ledger, LedgerTransaction};
pub use logging::logging_middleware;
pub use refund::{Refund, RefundRow, RefundStatus};
pub use routing::build_router;
pub use store::{SqliteStore, Store};
pub use timezone::get_local_offset;
pub use transaction::{
    NewTransaction, Transaction, TransactionBuilder, TransactionStatus, TransactionType,
};

use crate::{alert::Alert, html::render, internal_server_error::InternalServerError};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The database could not be opened or reached.
    ///
    /// The string holds the error reported by the database driver.
    #[error("could not connect to the database: {0}")]
    ConnectionFailed(String),

    /// A transaction was submitted with an empty description.
    #[error("the transaction description cannot be empty")]
    EmptyDescription,

    /// A transaction was submitted with an amount that is zero, negative or
    /// not a number.
    #[error("{0} is not a valid amount, the amount must be greater than zero")]
    InvalidAmount(f64),

    /// A contact was submitted with an empty name.
    #[error("the contact name cannot be empty")]
    EmptyContactName,

    /// The specified contact name already exists in the database.
    #[error("the contact \"{0}\" already exists in the database")]
    DuplicateContactName(String),

    /// The contact ID used to create a transaction or assign a refund did
    /// not match a valid contact.
    #[error("the contact ID {0:?} does not refer to a valid contact")]
    InvalidContact(Option<ContactId>),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a refund that does not exist.
    #[error("tried to update a refund that is not in the database")]
    UpdateMissingRefund,

    /// A row held a value that could not be parsed into one of the domain
    /// enums, e.g. an unknown transaction type.
    #[error("unknown {kind} \"{value}\"")]
    InvalidEnumValue {
        /// What was being parsed, e.g. "transaction type".
        kind: &'static str,
        /// The offending text.
        value: String,
    },

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The spreadsheet export could not be written.
    #[error("could not create the spreadsheet: {0}")]
    ExportError(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(ref sql_error, _)
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CANTOPEN
                    || sql_error.extended_code == rusqlite::ffi::SQLITE_AUTH =>
            {
                Error::ConnectionFailed(value.to_string())
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => not_found::get_404_not_found_response(),
            Error::ConnectionFailed(detail) => {
                tracing::error!("Could not connect to the database: {detail}");
                InternalServerError {
                    description: "Could not connect to the database",
                    fix: &detail,
                }
                .into_response()
            }
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::ConnectionFailed(detail) => render(
                StatusCode::SERVICE_UNAVAILABLE,
                Alert::error("Could not connect to the database", &detail),
            ),
            Error::EmptyDescription | Error::InvalidAmount(_) | Error::EmptyContactName => render(
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::error("Invalid form data", &self.to_string()),
            ),
            Error::DuplicateContactName(name) => render(
                StatusCode::CONFLICT,
                Alert::error(
                    "Duplicate Contact Name",
                    &format!(
                        "The contact '{name}' already exists. \
                        Choose a different name or use the existing contact.",
                    ),
                ),
            ),
            Error::InvalidContact(contact_id) => render(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid contact",
                    &format!("Could not find a contact with the ID {contact_id:?}"),
                ),
            ),
            Error::UpdateMissingRefund => render(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not update refund",
                    "The refund could not be found. \
                    Try refreshing the page to see if its transaction has been deleted.",
                ),
            ),
            Error::InvalidTimezoneError(timezone) => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Invalid Timezone Settings",
                    &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                ),
            ),
            error => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error("Something went wrong", &error.to_string()),
            ),
        }
    }
}
