//! Payments and receipts.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for validating new transactions
//! - Database functions for storing and deleting transactions
//! - View handlers for the transaction pages

mod core;
mod create_endpoint;
mod delete_endpoint;
mod new_transaction_page;
mod transactions_page;

pub use core::{
    NewTransaction, Transaction, TransactionBuilder, TransactionStatus, TransactionType,
    create_transaction, create_transaction_table, delete_transaction,
    map_transaction_row_with_offset,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use new_transaction_page::get_new_transaction_page;
pub use transactions_page::get_transactions_page;

#[cfg(test)]
pub use core::{count_transactions, get_transaction};
