//! The contacts page: a form for adding contacts and the contact directory.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    contact::{Contact, ContactType},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, EMPTY_NOTICE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        form_error, render,
    },
    navigation::NavBar,
    store::Store,
};

/// Renders the contacts page.
pub async fn get_contacts_page(State(store): State<Arc<dyn Store>>) -> Response {
    let ledger = match store.fetch_all() {
        Ok(ledger) => ledger,
        Err(error) => {
            tracing::error!("could not load contacts: {error}");
            return error.into_response();
        }
    };

    render(StatusCode::OK, contacts_view(&ledger.contacts))
}

/// The values to fill the new contact form with.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ContactFormDefaults<'a> {
    pub name: &'a str,
    pub document: &'a str,
    pub kind: Option<ContactType>,
    pub notes: &'a str,
}

/// The form for adding a contact.
///
/// The form replaces itself with the server's response, so that validation
/// errors are shown inline below the fields.
pub(crate) fn new_contact_form_view(
    defaults: ContactFormDefaults<'_>,
    error_message: &str,
) -> Markup {
    let selected_kind = defaults.kind.unwrap_or(ContactType::Client);

    html! {
        form
            hx-post=(endpoints::CONTACTS_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            h2 class="text-lg font-semibold" { "New Contact" }

            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Contact name"
                    value=(defaults.name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="document" class=(FORM_LABEL_STYLE) { "Document" }

                input
                    id="document"
                    type="text"
                    name="document"
                    placeholder="Tax or ID number"
                    value=(defaults.document)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Type" }

                select name="kind" id="kind" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for kind in ContactType::ALL {
                        @if kind == selected_kind {
                            option value=(kind) selected { (kind) }
                        } @else {
                            option value=(kind) { (kind) }
                        }
                    }
                }
            }

            div
            {
                label for="notes" class=(FORM_LABEL_STYLE) { "Notes" }

                textarea
                    id="notes"
                    name="notes"
                    rows="3"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (defaults.notes)
                }
            }

            (form_error(error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Contact" }
        }
    }
}

fn contacts_view(contacts: &[Contact]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CONTACTS_VIEW).into_html();
    let form = new_contact_form_view(ContactFormDefaults::default(), "");

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full grid gap-8 lg:grid-cols-3 lg:max-w-6xl"
            {
                section class="lg:col-span-1" { (form) }

                section class="lg:col-span-2 space-y-4"
                {
                    h1 class="text-xl font-bold" { "Contacts" }

                    @if contacts.is_empty() {
                        p class=(EMPTY_NOTICE_STYLE) { "No contacts yet." }
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
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Document" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Notes" }
                                    }
                                }

                                tbody
                                {
                                    @for contact in contacts {
                                        tr class=(TABLE_ROW_STYLE)
                                        {
                                            th
                                                scope="row"
                                                class="px-6 py-4 font-medium text-gray-900 dark:text-white"
                                            {
                                                (contact.name)
                                            }
                                            td class=(TABLE_CELL_STYLE)
                                            {
                                                (contact.document.as_deref().unwrap_or("-"))
                                            }
                                            td class=(TABLE_CELL_STYLE) { (contact.kind) }
                                            td class=(TABLE_CELL_STYLE)
                                            {
                                                (contact.notes.as_deref().unwrap_or(""))
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Contacts", &content)
}
