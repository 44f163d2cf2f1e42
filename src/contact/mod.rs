//! The people and businesses money is paid to or received from.

mod contacts_page;
mod core;
mod create_endpoint;

pub use contacts_page::get_contacts_page;
pub use core::{
    Contact, ContactName, ContactType, NewContact, create_contact, create_contact_table,
    get_all_contacts,
};
pub use create_endpoint::create_contact_endpoint;

#[cfg(test)]
pub use core::count_contacts;
