use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{database_id::TransactionId, endpoints, store::Store};

/// A route handler for deleting a transaction and its refund, redirects to
/// the transactions view.
///
/// Deleting a transaction that no longer exists also redirects, since the
/// result is the same.
pub async fn delete_transaction_endpoint(
    State(store): State<Arc<dyn Store>>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    match store.delete_transaction(transaction_id) {
        Ok(()) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
    use std::sync::Arc;

    use axum::extract::{Path, State};
    use time::macros::date;

    use crate::{
        endpoints,
        store::{SqliteStore, Store},
        test_utils::assert_hx_redirect,
        transaction::{Transaction, delete_endpoint::delete_transaction_endpoint},
    };

    #[tokio::test]
    async fn deletes_transaction_and_refund() {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let transaction = Transaction::build("Taxi", 25.0, date!(2025 - 04 - 02))
            .flag_for_refund(true)
            .finalise()
            .unwrap();
        let (transaction, _) = store.create_transaction(transaction).unwrap();

        let response =
            delete_transaction_endpoint(State(store.clone()), Path(transaction.id)).await;

        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let ledger = store.fetch_all().unwrap();
        assert!(ledger.transactions.is_empty());
        assert!(ledger.refunds.is_empty());
    }

    #[tokio::test]
    async fn deleting_missing_transaction_redirects() {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());

        let response = delete_transaction_endpoint(State(store), Path(1234)).await;

        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
    }
}
