//! Defines the route handler and form for the page for recording a new transaction.

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    contact::Contact,
    database_id::ContactId,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, base, form_error, render,
    },
    navigation::NavBar,
    store::Store,
    timezone::get_local_offset,
    transaction::{TransactionStatus, TransactionType},
};

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct NewTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The store to read the contacts from.
    pub store: Arc<dyn Store>,
}

impl FromRef<AppState> for NewTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            store: state.store.clone(),
        }
    }
}

/// The values to fill the transaction form with.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransactionFormDefaults<'a> {
    pub description: &'a str,
    pub amount: Option<f64>,
    pub kind: TransactionType,
    pub status: TransactionStatus,
    pub payment_date: Date,
    pub category: &'a str,
    pub contact_id: Option<ContactId>,
    pub flag_for_refund: bool,
}

impl TransactionFormDefaults<'_> {
    /// An empty form dated `payment_date`.
    pub fn empty(payment_date: Date) -> Self {
        Self {
            description: "",
            amount: None,
            kind: TransactionType::Payment,
            status: TransactionStatus::Settled,
            payment_date,
            category: "",
            contact_id: None,
            flag_for_refund: false,
        }
    }
}

/// Renders the page for recording a transaction.
///
/// The payment date defaults to today in the server's timezone.
pub async fn get_new_transaction_page(State(state): State<NewTransactionPageState>) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let ledger = match state.store.fetch_all() {
        Ok(ledger) => ledger,
        Err(error) => return error.into_response(),
    };

    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();
    let form = transaction_form_view(
        &TransactionFormDefaults::empty(today),
        &ledger.contacts,
        "",
    );

    render(StatusCode::OK, new_transaction_view(&form))
}

fn new_transaction_view(form: &Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            (form)
        }
    };

    base("New Transaction", &content)
}

fn select_option(value: &str, label: &str, selected: bool) -> Markup {
    html! {
        @if selected {
            option value=(value) selected { (label) }
        } @else {
            option value=(value) { (label) }
        }
    }
}

/// The form for recording a transaction.
///
/// The form replaces itself with the server's response, so that validation
/// errors are shown inline below the fields.
pub(crate) fn transaction_form_view(
    defaults: &TransactionFormDefaults<'_>,
    contacts: &[Contact],
    error_message: &str,
) -> Markup {
    let amount = defaults.amount.map(|amount| format!("{amount:.2}"));

    html! {
        form
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "New Transaction" }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    name="description"
                    id="description"
                    type="text"
                    placeholder="What was it for?"
                    value=(defaults.description)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    value=[amount.as_deref()]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Type" }

                select name="kind" id="kind" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for kind in TransactionType::ALL {
                        (select_option(kind.as_str(), kind.as_str(), kind == defaults.kind))
                    }
                }
            }

            div
            {
                label for="contact_id" class=(FORM_LABEL_STYLE) { "Contact" }

                select name="contact_id" id="contact_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    (select_option("", "None", defaults.contact_id.is_none()))

                    @for contact in contacts {
                        (select_option(
                            &contact.id.to_string(),
                            contact.name.as_ref(),
                            Some(contact.id) == defaults.contact_id,
                        ))
                    }
                }
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                input
                    name="category"
                    id="category"
                    type="text"
                    placeholder="e.g. Travel"
                    value=(defaults.category)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="status" class=(FORM_LABEL_STYLE) { "Status" }

                select name="status" id="status" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for status in TransactionStatus::ALL {
                        (select_option(status.as_str(), status.as_str(), status == defaults.status))
                    }
                }
            }

            div
            {
                label for="payment_date" class=(FORM_LABEL_STYLE) { "Payment date" }

                input
                    name="payment_date"
                    id="payment_date"
                    type="date"
                    value=(defaults.payment_date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex items-center gap-3"
            {
                input
                    name="flag_for_refund"
                    id="flag_for_refund"
                    type="checkbox"
                    value="true"
                    checked[defaults.flag_for_refund]
                    class=(FORM_CHECKBOX_STYLE);

                label for="flag_for_refund" class="text-sm font-medium"
                {
                    "Flag for refund (payments only)"
                }
            }

            (form_error(error_message))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                "Save Transaction"
            }
        }
    }
}

#[cfg(test)]
mod new_transaction_page_tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode};
    use time::OffsetDateTime;

    use crate::{
        contact::{ContactName, ContactType, NewContact},
        endpoints,
        store::SqliteStore,
        test_utils::{
            assert_content_type, assert_form_checkbox, assert_form_input,
            assert_form_input_with_value, assert_form_select, assert_form_submit_button_with_text,
            assert_hx_endpoint, assert_status_ok, assert_valid_html, must_get_form,
            parse_html_document,
        },
        transaction::new_transaction_page::{NewTransactionPageState, get_new_transaction_page},
    };

    fn get_test_state() -> NewTransactionPageState {
        NewTransactionPageState {
            local_timezone: "Etc/UTC".to_owned(),
            store: Arc::new(SqliteStore::in_memory().unwrap()),
        }
    }

    #[tokio::test]
    async fn renders_form() {
        let state = get_test_state();

        let response = get_new_transaction_page(State(state)).await;

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "description", "text");
        assert_form_input(&form, "amount", "number");
        assert_form_input_with_value(
            &form,
            "payment_date",
            "date",
            &OffsetDateTime::now_utc().date().to_string(),
        );
        assert_form_select(&form, "kind", &["Payment", "Receipt"]);
        assert_form_select(&form, "status", &["Settled", "Pending"]);
        assert_form_select(&form, "contact_id", &[""]);
        assert_form_checkbox(&form, "flag_for_refund");
        assert_form_submit_button_with_text(&form, "Save Transaction");
    }

    #[tokio::test]
    async fn lists_contacts_in_contact_select() {
        let state = get_test_state();
        let contact = state
            .store
            .create_contact(NewContact {
                name: ContactName::new_unchecked("ACME"),
                document: None,
                kind: ContactType::Supplier,
                notes: None,
            })
            .unwrap();

        let response = get_new_transaction_page(State(state)).await;

        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        assert_form_select(&form, "contact_id", &["", &contact.id.to_string()]);
    }

    #[tokio::test]
    async fn invalid_timezone_renders_error_page() {
        let state = NewTransactionPageState {
            local_timezone: "Not/AZone".to_owned(),
            ..get_test_state()
        };

        let response = get_new_transaction_page(State(state)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
