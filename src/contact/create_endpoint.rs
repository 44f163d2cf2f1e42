//! Contact creation endpoint.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{
    contact::{
        ContactName, ContactType, NewContact,
        contacts_page::{ContactFormDefaults, new_contact_form_view},
    },
    endpoints,
    store::Store,
};

/// Form data for contact creation.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    /// The unique name of the contact.
    pub name: String,
    /// An optional document number.
    #[serde(default)]
    pub document: Option<String>,
    /// The relationship with the contact.
    pub kind: ContactType,
    /// Optional notes.
    #[serde(default)]
    pub notes: Option<String>,
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// Handle contact creation form submission.
pub async fn create_contact_endpoint(
    State(store): State<Arc<dyn Store>>,
    Form(form): Form<ContactForm>,
) -> Response {
    let name = match ContactName::new(&form.name) {
        Ok(name) => name,
        Err(error) => {
            let defaults = ContactFormDefaults {
                name: &form.name,
                document: form.document.as_deref().unwrap_or_default(),
                kind: Some(form.kind),
                notes: form.notes.as_deref().unwrap_or_default(),
            };

            return new_contact_form_view(defaults, &format!("Error: {error}")).into_response();
        }
    };

    let contact = NewContact {
        name,
        document: non_blank(form.document.as_deref()),
        kind: form.kind,
        notes: non_blank(form.notes.as_deref()),
    };

    match store.create_contact(contact) {
        Ok(contact) => {
            tracing::info!("created contact {}", contact.id);

            (
                HxRedirect(endpoints::CONTACTS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create contact: {error}");

            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod create_contact_endpoint_tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;

    use crate::{
        Error,
        contact::{
            ContactType,
            create_endpoint::{ContactForm, create_contact_endpoint},
        },
        endpoints,
        store::{SqliteStore, Store},
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, element_text,
            must_get_form, parse_html_fragment, select_all,
        },
    };

    fn get_test_store() -> Arc<dyn Store> {
        Arc::new(SqliteStore::in_memory().unwrap())
    }

    fn form(name: &str) -> ContactForm {
        ContactForm {
            name: name.to_owned(),
            document: Some("  ".to_owned()),
            kind: ContactType::Supplier,
            notes: Some("Pays on the 20th".to_owned()),
        }
    }

    #[tokio::test]
    async fn can_create_contact() {
        let store = get_test_store();

        let response = create_contact_endpoint(State(store.clone()), Form(form("ACME"))).await;

        assert_hx_redirect(&response, endpoints::CONTACTS_VIEW);
        let contacts = store.fetch_all().unwrap().contacts;
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].name.as_ref(), "ACME");
        assert_eq!(contacts[0].document, None);
        assert_eq!(contacts[0].kind, ContactType::Supplier);
        assert_eq!(contacts[0].notes.as_deref(), Some("Pays on the 20th"));
    }

    #[tokio::test]
    async fn empty_name_renders_form_error() {
        let store = get_test_store();

        let response = create_contact_endpoint(State(store.clone()), Form(form(" "))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, &format!("Error: {}", Error::EmptyContactName));
        assert!(store.fetch_all().unwrap().contacts.is_empty());
    }

    #[tokio::test]
    async fn duplicate_name_renders_conflict_alert() {
        let store = get_test_store();
        create_contact_endpoint(State(store.clone()), Form(form("ACME"))).await;

        let response = create_contact_endpoint(State(store.clone()), Form(form("ACME"))).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let html = parse_html_fragment(response).await;
        let alert = select_all(&html, "[role=alert] p");
        assert_eq!(element_text(&alert[0]), "Duplicate Contact Name");
        assert_eq!(store.fetch_all().unwrap().contacts.len(), 1);
    }
}
