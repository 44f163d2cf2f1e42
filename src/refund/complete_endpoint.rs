//! Marks a refund as paid back.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{database_id::RefundId, endpoints, store::Store};

/// A route handler for marking a refund as done, redirects to the refunds
/// view on success.
pub async fn complete_refund_endpoint(
    State(store): State<Arc<dyn Store>>,
    Path(refund_id): Path<RefundId>,
) -> Response {
    match store.complete_refund(refund_id) {
        Ok(()) => (
            HxRedirect(endpoints::REFUNDS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not complete refund {refund_id}: {error}");
            error.into_alert_response()
        }
    }
}
