// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use contact::{Contact, ContactRef};
pub use contact_manager::{
    ContactEvent, ContactManager, ContactManagerDependencies, ResolvedContacts,
};
pub use error::ContactError;

pub mod avatar_cache;
mod contact;
mod contact_manager;
mod error;
pub mod services;
pub mod types;
