//! Defines the endpoint for recording a new transaction.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use serde::Deserialize;
use time::Date;

use crate::{
    database_id::ContactId,
    endpoints,
    store::Store,
    transaction::{
        Transaction, TransactionStatus, TransactionType,
        new_transaction_page::{TransactionFormDefaults, transaction_form_view},
    },
};

/// The form data for recording a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Text detailing the transaction.
    pub description: String,
    /// The amount of money paid or received.
    pub amount: f64,
    /// Whether the money was paid or received.
    pub kind: TransactionType,
    /// Whether the money has moved yet.
    pub status: TransactionStatus,
    /// When the money was (or will be) paid or received.
    pub payment_date: Date,
    /// Optional free text category.
    #[serde(default)]
    pub category: Option<String>,
    /// The contact the money was paid to or received from.
    #[serde(default)]
    pub contact_id: Option<ContactId>,
    /// Whether to track a refund for this payment.
    #[serde(default)]
    pub flag_for_refund: bool,
}

/// A route handler for recording a new transaction, redirects to the
/// transactions view on success.
///
/// Invalid input re-renders the form with an error message.
pub async fn create_transaction_endpoint(
    State(store): State<Arc<dyn Store>>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let new_transaction = Transaction::build(&form.description, form.amount, form.payment_date)
        .kind(form.kind)
        .status(form.status)
        .category(form.category.as_deref())
        .contact_id(form.contact_id)
        .flag_for_refund(form.flag_for_refund)
        .finalise();

    let new_transaction = match new_transaction {
        Ok(new_transaction) => new_transaction,
        Err(error) => {
            tracing::debug!("rejected transaction form: {error}");
            return invalid_form_response(store.as_ref(), &form, &error.to_string());
        }
    };

    match store.create_transaction(new_transaction) {
        Ok((transaction, refund)) => {
            tracing::info!(
                "created transaction {} with refund {:?}",
                transaction.id,
                refund.map(|refund| refund.id)
            );

            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_alert_response()
        }
    }
}

fn invalid_form_response(
    store: &dyn Store,
    form: &TransactionForm,
    error_message: &str,
) -> Response {
    let contacts = match store.fetch_all() {
        Ok(ledger) => ledger.contacts,
        Err(error) => return error.into_alert_response(),
    };

    let defaults = TransactionFormDefaults {
        description: &form.description,
        amount: Some(form.amount).filter(|amount| amount.is_finite()),
        kind: form.kind,
        status: form.status,
        payment_date: form.payment_date,
        category: form.category.as_deref().unwrap_or_default(),
        contact_id: form.contact_id,
        flag_for_refund: form.flag_for_refund,
    };

    transaction_form_view(&defaults, &contacts, &format!("Error: {error_message}")).into_response()
}

#[cfg(test)]
mod create_transaction_endpoint_tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        Error, endpoints,
        refund::RefundStatus,
        store::{SqliteStore, Store},
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, must_get_form,
            parse_html_fragment,
        },
        transaction::{
            TransactionStatus, TransactionType,
            create_endpoint::{TransactionForm, create_transaction_endpoint},
        },
    };

    fn get_test_store() -> Arc<dyn Store> {
        Arc::new(SqliteStore::in_memory().unwrap())
    }

    fn form(description: &str, amount: f64) -> TransactionForm {
        TransactionForm {
            description: description.to_owned(),
            amount,
            kind: TransactionType::Payment,
            status: TransactionStatus::Settled,
            payment_date: date!(2025 - 05 - 20),
            category: None,
            contact_id: None,
            flag_for_refund: false,
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let store = get_test_store();

        let response =
            create_transaction_endpoint(State(store.clone()), Form(form("Groceries", 54.2))).await;

        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let ledger = store.fetch_all().unwrap();
        assert_eq!(ledger.transactions.len(), 1);
        let transaction = &ledger.transactions[0].transaction;
        assert_eq!(transaction.description, "Groceries");
        assert_eq!(transaction.amount, 54.2);
        assert_eq!(transaction.payment_date, date!(2025 - 05 - 20));
    }

    #[tokio::test]
    async fn blank_category_is_stored_as_none() {
        let store = get_test_store();
        let form = TransactionForm {
            category: Some(String::new()),
            ..form("Taxi", 12.5)
        };

        let response = create_transaction_endpoint(State(store.clone()), Form(form)).await;

        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let ledger = store.fetch_all().unwrap();
        assert_eq!(ledger.transactions[0].transaction.category, None);
    }

    #[tokio::test]
    async fn flagged_payment_creates_pending_refund() {
        let store = get_test_store();
        let form = TransactionForm {
            flag_for_refund: true,
            ..form("Client dinner", 120.0)
        };

        let response = create_transaction_endpoint(State(store.clone()), Form(form)).await;

        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let ledger = store.fetch_all().unwrap();
        assert_eq!(ledger.refunds.len(), 1);
        assert_eq!(ledger.refunds[0].status, RefundStatus::Pending);
    }

    #[tokio::test]
    async fn flagged_receipt_creates_no_refund() {
        let store = get_test_store();
        let form = TransactionForm {
            kind: TransactionType::Receipt,
            flag_for_refund: true,
            ..form("Consulting", 800.0)
        };

        create_transaction_endpoint(State(store.clone()), Form(form)).await;

        let ledger = store.fetch_all().unwrap();
        assert_eq!(ledger.transactions.len(), 1);
        assert!(ledger.refunds.is_empty());
    }

    #[tokio::test]
    async fn empty_description_renders_form_error() {
        let store = get_test_store();

        let response =
            create_transaction_endpoint(State(store.clone()), Form(form("   ", 10.0))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            &format!("Error: {}", Error::EmptyDescription),
        );
        assert!(store.fetch_all().unwrap().transactions.is_empty());
    }

    #[tokio::test]
    async fn zero_amount_renders_form_error() {
        let store = get_test_store();

        let response =
            create_transaction_endpoint(State(store.clone()), Form(form("Lunch", 0.0))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, &format!("Error: {}", Error::InvalidAmount(0.0)));
        assert!(store.fetch_all().unwrap().transactions.is_empty());
    }

    #[tokio::test]
    async fn unknown_contact_renders_alert() {
        let store = get_test_store();
        let form = TransactionForm {
            contact_id: Some(99),
            ..form("Lunch", 10.0)
        };

        let response = create_transaction_endpoint(State(store.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.fetch_all().unwrap().transactions.is_empty());
    }

    #[test]
    fn parses_form_with_empty_optional_fields() {
        let form: TransactionForm = serde_html_form::from_str(
            "description=Taxi&amount=12.5&kind=Payment&status=Pending\
            &payment_date=2025-05-20&category=&contact_id=&flag_for_refund=true",
        )
        .unwrap();

        assert_eq!(form.category, Some(String::new()));
        assert_eq!(form.contact_id, None);
        assert!(form.flag_for_refund);
        assert_eq!(form.status, TransactionStatus::Pending);
        assert_eq!(form.payment_date, date!(2025 - 05 - 20));
    }

    #[test]
    fn unchecked_refund_flag_defaults_to_false() {
        let form: TransactionForm = serde_html_form::from_str(
            "description=Taxi&amount=12.5&kind=Receipt&status=Settled&payment_date=2025-05-20",
        )
        .unwrap();

        assert!(!form.flag_for_refund);
        assert_eq!(form.kind, TransactionType::Receipt);
    }
}
