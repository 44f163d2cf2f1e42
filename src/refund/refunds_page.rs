//! Lists the refunds that are still owed and the ones that have been paid back.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    contact::Contact,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, EMPTY_NOTICE_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        date_datetime_attr, format_currency, render,
    },
    ledger::Ledger,
    navigation::NavBar,
    refund::RefundRow,
    store::Store,
};

/// Renders the refunds page.
pub async fn get_refunds_page(State(store): State<Arc<dyn Store>>) -> Response {
    match store.fetch_all() {
        Ok(ledger) => render(StatusCode::OK, refunds_view(&ledger)),
        Err(error) => {
            tracing::error!("could not load refunds: {error}");
            error.into_response()
        }
    }
}

fn pending_refund_card(refund: &RefundRow, contacts: &[Contact]) -> Markup {
    let reassign_url = format_endpoint(endpoints::REFUND_CONTACT, refund.id);
    let complete_url = format_endpoint(endpoints::COMPLETE_REFUND, refund.id);
    let select_id = format!("refund-{}-contact", refund.id);

    html! {
        li
            class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm
                dark:border-gray-700 dark:bg-gray-800 space-y-3"
            data-refund-id=(refund.id)
        {
            div class="flex items-start justify-between gap-3"
            {
                div
                {
                    p class="text-sm font-semibold text-gray-900 dark:text-white"
                    {
                        (refund.description)
                    }
                    p class="text-xs text-gray-500 dark:text-gray-400"
                    {
                        time datetime=(date_datetime_attr(refund.payment_date))
                        {
                            (refund.payment_date)
                        }
                    }
                }

                p class="text-sm tabular-nums text-right text-gray-900 dark:text-white"
                {
                    (format_currency(refund.amount))
                }
            }

            form
                hx-put=(reassign_url)
                hx-target-error="#alert-container"
                class="flex flex-wrap items-end gap-2"
            {
                label for=(select_id) class="sr-only" { "Refund to" }

                select
                    id=(select_id)
                    name="contact_id"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @if refund.refund_to_contact_id.is_none() {
                        option value="" selected { "No contact" }
                    } @else {
                        option value="" { "No contact" }
                    }

                    @for contact in contacts {
                        @if Some(contact.id) == refund.refund_to_contact_id {
                            option value=(contact.id) selected { (contact.name) }
                        } @else {
                            option value=(contact.id) { (contact.name) }
                        }
                    }
                }

                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Save contact" }
            }

            button
                type="button"
                hx-post=(complete_url)
                hx-target-error="#alert-container"
                class=(BUTTON_PRIMARY_STYLE)
            {
                "Mark as done"
            }
        }
    }
}

fn completed_refunds_table<'a>(refunds: impl Iterator<Item = &'a RefundRow>) -> Markup {
    html! {
        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                    th scope="col" class="px-6 py-3 text-right" { "Amount" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Refunded by" }
                }
            }

            tbody
            {
                @for refund in refunds {
                    tr class=(TABLE_ROW_STYLE) data-refund-id=(refund.id)
                    {
                        th
                            scope="row"
                            class="px-6 py-4 font-medium text-gray-900 dark:text-white"
                        {
                            (refund.description)
                        }
                        td class="px-6 py-4 text-right tabular-nums"
                        {
                            (format_currency(refund.amount))
                        }
                        td class=(TABLE_CELL_STYLE)
                        {
                            (refund.refund_to_name.as_deref().unwrap_or("-"))
                        }
                    }
                }
            }
        }
    }
}

fn refunds_view(ledger: &Ledger) -> Markup {
    let nav_bar = NavBar::new(endpoints::REFUNDS_VIEW).into_html();
    let has_pending = ledger.pending_refunds().next().is_some();
    let completed_count = ledger.completed_refunds().count();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-3xl space-y-4" id="pending-refunds"
            {
                h1 class="text-xl font-bold" { "Pending Refunds" }

                @if has_pending {
                    ul class="space-y-4"
                    {
                        @for refund in ledger.pending_refunds() {
                            (pending_refund_card(refund, &ledger.contacts))
                        }
                    }
                } @else {
                    p class=(EMPTY_NOTICE_STYLE) { "No refunds pending." }
                }
            }

            section class="w-full max-w-3xl mt-8" id="completed-refunds"
            {
                details class="rounded border border-gray-200 dark:border-gray-700"
                {
                    summary class="cursor-pointer px-4 py-3 font-semibold"
                    {
                        "Completed refunds (" (completed_count) ")"
                    }

                    div class="overflow-x-auto"
                    {
                        @if completed_count == 0 {
                            p class="px-4 py-3 text-sm text-gray-500 dark:text-gray-400"
                            {
                                "No completed refunds yet."
                            }
                        } @else {
                            (completed_refunds_table(ledger.completed_refunds()))
                        }
                    }
                }
            }
        }
    );

    base("Refunds", &content)
}
