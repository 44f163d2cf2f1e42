//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/refunds/{refund_id}/contact', use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page with the cash summary.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing every transaction.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for recording a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page listing pending and completed refunds.
pub const REFUNDS_VIEW: &str = "/refunds";
/// The page for adding contacts and listing the contact directory.
pub const CONTACTS_VIEW: &str = "/contacts";
/// The route for downloading the spreadsheet export.
pub const EXPORT: &str = "/export";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to delete a single transaction.
pub const DELETE_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to create a contact.
pub const CONTACTS_API: &str = "/api/contacts";
/// The route to change who a refund should be paid to.
pub const REFUND_CONTACT: &str = "/api/refunds/{refund_id}/contact";
/// The route to mark a refund as done.
pub const COMPLETE_REFUND: &str = "/api/refunds/{refund_id}/complete";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/transactions/{transaction_id}',
/// '{transaction_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
