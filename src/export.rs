//! Downloads the whole ledger as an Excel workbook.

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use time::{OffsetDateTime, macros::format_description};

use crate::{AppState, Error, ledger::Ledger, store::Store, timezone::get_local_offset};

/// The MIME type of an `.xlsx` workbook.
pub const EXPORT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const TRANSACTION_HEADERS: [&str; 8] = [
    "Transaction ID",
    "Description",
    "Amount",
    "Type",
    "Status",
    "Payment Date",
    "Category",
    "Contact",
];

const REFUND_HEADERS: [&str; 5] = [
    "Original Transaction ID",
    "Description",
    "Amount",
    "Refund To",
    "Refund Status",
];

const CONTACT_HEADERS: [&str; 5] = ["ID", "Name", "Document", "Type", "Notes"];

impl From<XlsxError> for Error {
    fn from(value: XlsxError) -> Self {
        Error::ExportError(value.to_string())
    }
}

/// The state needed for the export endpoint.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The store to read the ledger from.
    pub store: Arc<dyn Store>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            store: state.store.clone(),
        }
    }
}

/// Responds with the ledger as an `.xlsx` attachment named after today's date.
pub async fn export_endpoint(State(state): State<ExportState>) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let workbook = state
        .store
        .fetch_all()
        .and_then(|ledger| build_workbook(&ledger));

    let workbook = match workbook {
        Ok(workbook) => workbook,
        Err(error) => {
            tracing::error!("could not export the ledger: {error}");
            return error.into_response();
        }
    };

    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();
    let file_name = match today.format(format_description!("[year][month][day]")) {
        Ok(date) => format!("cashbook_report_{date}.xlsx"),
        Err(error) => {
            tracing::error!("could not format the export date: {error}");
            return Error::ExportError(error.to_string()).into_response();
        }
    };
    let disposition = format!("attachment; filename=\"{file_name}\"");

    (
        [
            (CONTENT_TYPE, EXPORT_CONTENT_TYPE),
            (CONTENT_DISPOSITION, disposition.as_str()),
        ],
        workbook,
    )
        .into_response()
}

/// Write the transactions, refunds and contacts of `ledger` to a workbook
/// with one sheet each, and return the bytes of the `.xlsx` file.
///
/// Amounts and IDs are written as numbers. Missing optional values are left
/// as empty cells.
///
/// # Errors
/// Returns an [Error::ExportError] if the workbook could not be written.
pub fn build_workbook(ledger: &Ledger) -> Result<Vec<u8>, Error> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Transactions")?;
    write_headers(sheet, &TRANSACTION_HEADERS, &header_format)?;
    for (row, entry) in (1u32..).zip(&ledger.transactions) {
        let transaction = &entry.transaction;
        sheet.write_number(row, 0, transaction.id as f64)?;
        sheet.write_string(row, 1, &transaction.description)?;
        sheet.write_number(row, 2, transaction.amount)?;
        sheet.write_string(row, 3, transaction.kind.as_str())?;
        sheet.write_string(row, 4, transaction.status.as_str())?;
        sheet.write_string(row, 5, transaction.payment_date.to_string())?;
        write_optional(sheet, row, 6, transaction.category.as_deref())?;
        write_optional(sheet, row, 7, entry.contact_name.as_deref())?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name("Refunds")?;
    write_headers(sheet, &REFUND_HEADERS, &header_format)?;
    for (row, refund) in (1u32..).zip(&ledger.refunds) {
        sheet.write_number(row, 0, refund.transaction_id as f64)?;
        sheet.write_string(row, 1, &refund.description)?;
        sheet.write_number(row, 2, refund.amount)?;
        write_optional(sheet, row, 3, refund.refund_to_name.as_deref())?;
        sheet.write_string(row, 4, refund.status.as_str())?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name("Contacts")?;
    write_headers(sheet, &CONTACT_HEADERS, &header_format)?;
    for (row, contact) in (1u32..).zip(&ledger.contacts) {
        sheet.write_number(row, 0, contact.id as f64)?;
        sheet.write_string(row, 1, contact.name.to_string())?;
        write_optional(sheet, row, 2, contact.document.as_deref())?;
        sheet.write_string(row, 3, contact.kind.as_str())?;
        write_optional(sheet, row, 4, contact.notes.as_deref())?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], format: &Format) -> Result<(), Error> {
    for (column, header) in (0u16..).zip(headers) {
        sheet.write_string_with_format(0, column, *header, format)?;
        sheet.set_column_width(column, 18)?;
    }

    Ok(())
}

fn write_optional(
    sheet: &mut Worksheet,
    row: u32,
    column: u16,
    text: Option<&str>,
) -> Result<(), Error> {
    if let Some(text) = text {
        sheet.write_string(row, column, text)?;
    }

    Ok(())
}
