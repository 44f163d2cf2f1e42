//! Displays the history of every recorded transaction.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, EMPTY_NOTICE_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        date_datetime_attr, format_currency, render,
    },
    ledger::LedgerTransaction,
    navigation::NavBar,
    store::Store,
};

/// The query parameters for the transactions page.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    /// The transaction the user has asked to delete and must confirm.
    pub confirm_delete: Option<TransactionId>,
}

/// Renders the transactions page.
///
/// If `confirm_delete` is set, the row for that transaction asks the user to
/// confirm the deletion instead of showing the delete link.
pub async fn get_transactions_page(
    State(store): State<Arc<dyn Store>>,
    Query(query): Query<TransactionsQuery>,
) -> Response {
    let ledger = match store.fetch_all() {
        Ok(ledger) => ledger,
        Err(error) => {
            tracing::error!("could not load transactions: {error}");
            return error.into_response();
        }
    };

    render(
        StatusCode::OK,
        transactions_view(&ledger.transactions, query.confirm_delete),
    )
}

fn delete_cell(transaction_id: TransactionId, confirm_delete: Option<TransactionId>) -> Markup {
    let delete_url = format_endpoint(endpoints::DELETE_TRANSACTION, transaction_id);

    html! {
        @if confirm_delete == Some(transaction_id) {
            div class="flex items-center gap-3" data-confirm-delete=(transaction_id)
            {
                span { "Delete?" }

                button
                    type="button"
                    hx-delete=(delete_url)
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Yes"
                }

                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "No" }
            }
        } @else {
            a
                href={ (endpoints::TRANSACTIONS_VIEW) "?confirm_delete=" (transaction_id) }
                class=(BUTTON_DELETE_STYLE)
            {
                "Delete"
            }
        }
    }
}

fn transactions_view(
    transactions: &[LedgerTransaction],
    confirm_delete: Option<TransactionId>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let table_row = |row: &LedgerTransaction| {
        let transaction = &row.transaction;

        html!(
            tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 dark:text-white"
                {
                    (transaction.description)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (transaction.category.as_deref().unwrap_or("-"))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (row.contact_name.as_deref().unwrap_or("-"))
                }

                td class=(TABLE_CELL_STYLE) { (transaction.kind) }

                td class="px-6 py-4 text-right tabular-nums"
                {
                    (format_currency(transaction.amount))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    time datetime=(date_datetime_attr(transaction.payment_date))
                    {
                        (transaction.payment_date)
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(BADGE_STYLE) { (transaction.status) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (delete_cell(transaction.id, confirm_delete))
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(BUTTON_SECONDARY_STYLE)
                    {
                        "New Transaction"
                    }
                }

                @if transactions.is_empty() {
                    p class=(EMPTY_NOTICE_STYLE)
                    {
                        "No transactions recorded yet. Record one "
                        a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "here" }
                        "."
                    }
                } @else {
                    div class="w-full overflow-x-auto dark:bg-gray-800"
                    {
                        table class="w-full text-sm text-left rtl:text-right
                            text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Contact" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                    th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Payment date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }

                            tbody
                            {
                                @for transaction in transactions {
                                    (table_row(transaction))
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Transactions", &content)
}
