//! The dashboard: how much cash has come in and gone out.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Serialize;

use crate::{
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, EMPTY_NOTICE_STYLE, PAGE_CONTAINER_STYLE, base, format_currency,
        link, render,
    },
    ledger::LedgerTransaction,
    navigation::NavBar,
    store::Store,
    transaction::{TransactionStatus, TransactionType},
};

/// Totals of the money that has actually moved.
///
/// Only settled transactions are counted. Pending transactions have not
/// moved any cash yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CashSummary {
    /// The sum of settled receipts.
    pub receipts: f64,
    /// The sum of settled payments.
    pub payments: f64,
    /// Receipts minus payments.
    pub balance: f64,
}

impl CashSummary {
    /// Sum the settled transactions by type.
    pub fn from_transactions<'a>(
        transactions: impl IntoIterator<Item = &'a LedgerTransaction>,
    ) -> Self {
        let (receipts, payments) = transactions
            .into_iter()
            .map(|row| &row.transaction)
            .filter(|transaction| transaction.status == TransactionStatus::Settled)
            .fold((0.0, 0.0), |(receipts, payments), transaction| {
                match transaction.kind {
                    TransactionType::Receipt => (receipts + transaction.amount, payments),
                    TransactionType::Payment => (receipts, payments + transaction.amount),
                }
            });

        Self {
            receipts,
            payments,
            balance: receipts - payments,
        }
    }

    /// Whether any settled transaction contributed to the totals.
    fn is_empty(&self) -> bool {
        self.receipts == 0.0 && self.payments == 0.0
    }
}

/// Renders the dashboard page.
pub async fn get_dashboard_page(State(store): State<Arc<dyn Store>>) -> Response {
    let ledger = match store.fetch_all() {
        Ok(ledger) => ledger,
        Err(error) => {
            tracing::error!("could not load the dashboard: {error}");
            return error.into_response();
        }
    };

    let summary = CashSummary::from_transactions(&ledger.transactions);

    render(
        StatusCode::OK,
        dashboard_view(&summary, !ledger.transactions.is_empty()),
    )
}

fn summary_card(title: &str, amount: f64, id: &str) -> Markup {
    html! {
        div
            id=(id)
            class="bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            p class="text-sm text-gray-600 dark:text-gray-400" { (title) }
            p class="text-2xl font-semibold tabular-nums" { (format_currency(amount)) }
        }
    }
}

fn dashboard_view(summary: &CashSummary, has_transactions: bool) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-4xl space-y-6"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Cash Summary" }

                    @if has_transactions {
                        a
                            href=(endpoints::EXPORT)
                            download
                            class=(BUTTON_SECONDARY_STYLE)
                        {
                            "Export to Excel"
                        }
                    }
                }

                @if summary.is_empty() {
                    p class=(EMPTY_NOTICE_STYLE)
                    {
                        "No settled transactions yet. Totals will show up here once you "
                        (link(endpoints::NEW_TRANSACTION_VIEW, "record a transaction"))
                        " that has been paid or received."
                    }
                }

                div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
                {
                    (summary_card("Receipts", summary.receipts, "receipts"))
                    (summary_card("Payments", summary.payments, "payments"))
                    (summary_card("Balance", summary.balance, "balance"))
                }
            }
        }
    );

    base("Dashboard", &content)
}
