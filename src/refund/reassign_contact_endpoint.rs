//! Changes who a refund should be claimed from.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// An empty select value means "no contact", which axum_extra's Form parses as None.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{
    database_id::{ContactId, RefundId},
    endpoints,
    store::Store,
};

/// The form data for reassigning a refund.
#[derive(Debug, Deserialize)]
pub struct RefundContactForm {
    /// The new beneficiary, or `None` to clear it.
    #[serde(default)]
    pub contact_id: Option<ContactId>,
}

/// A route handler for setting or clearing a refund's contact, redirects to
/// the refunds view on success.
pub async fn reassign_refund_contact_endpoint(
    State(store): State<Arc<dyn Store>>,
    Path(refund_id): Path<RefundId>,
    Form(form): Form<RefundContactForm>,
) -> Response {
    match store.reassign_refund_contact(refund_id, form.contact_id) {
        Ok(()) => (
            HxRedirect(endpoints::REFUNDS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not reassign refund {refund_id}: {error}");
            error.into_alert_response()
        }
    }
}
