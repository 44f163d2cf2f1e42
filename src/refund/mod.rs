//! Reimbursements owed for payments.
//!
//! A refund is opened when a payment is recorded with the refund flag set, and
//! is closed by marking it as done.

mod complete_endpoint;
mod core;
mod reassign_contact_endpoint;
mod refunds_page;

pub use complete_endpoint::complete_refund_endpoint;
pub(crate) use core::insert_pending_refund;
pub use core::{
    Refund, RefundRow, RefundStatus, complete_refund, create_refund_table, get_all_refund_rows,
    update_refund_contact,
};
pub use reassign_contact_endpoint::reassign_refund_contact_endpoint;
pub use refunds_page::get_refunds_page;

#[cfg(test)]
pub use core::{count_refunds, get_refund};
