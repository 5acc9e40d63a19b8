// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;

use tracing::debug;

use crate::types::{
    AvatarData, ContactCapabilities, ContactInfoField, Handle, Location, Presence,
};

use super::contact_manager::ContactManager;

/// A change notification delivered by the connection for one or more
/// contacts.
#[derive(Debug, Clone)]
pub enum ContactEvent {
    AliasesChanged(Vec<(Handle, String)>),
    /// A contact's avatar token changed. Carries no payload; interested
    /// parties re-request the avatar data.
    AvatarUpdated {
        handle: Handle,
        token: String,
    },
    /// An avatar payload arrived in response to a batched request.
    AvatarRetrieved {
        handle: Handle,
        token: String,
        bytes: Vec<u8>,
        mime_type: String,
    },
    PresencesChanged(HashMap<Handle, Presence>),
    CapabilitiesChanged(HashMap<Handle, ContactCapabilities>),
    LocationUpdated {
        handle: Handle,
        location: Location,
    },
    ContactInfoChanged {
        handle: Handle,
        info: Vec<ContactInfoField>,
    },
}

impl ContactManager {
    /// Routes a change notification to the affected cached contacts.
    /// Handles without a live contact are dropped, not buffered.
    pub fn handle_event(&self, event: ContactEvent) {
        match event {
            ContactEvent::AliasesChanged(aliases) => {
                debug!("Got AliasesChanged for {} contact(s)", aliases.len());
                for (handle, alias) in aliases {
                    if let Some(contact) = self.lookup_contact_by_handle(handle) {
                        contact.receive_alias(alias);
                    }
                }
            }
            ContactEvent::AvatarUpdated { handle, token } => {
                debug!("Got AvatarUpdated for handle {}", handle);
                if let Some(contact) = self.lookup_contact_by_handle(handle) {
                    contact.set_avatar_token(token);
                }
            }
            ContactEvent::AvatarRetrieved {
                handle,
                token,
                bytes,
                mime_type,
            } => {
                debug!("Got AvatarRetrieved for handle {}", handle);
                let avatar = AvatarData::with_mime_str(bytes, &mime_type);
                self.persist_avatar(&token, &avatar);

                if let Some(contact) = self.lookup_contact_by_handle(handle) {
                    contact.set_avatar_token(token);
                    contact.receive_avatar(avatar);
                }
            }
            ContactEvent::PresencesChanged(presences) => {
                debug!("Got PresencesChanged for {} contact(s)", presences.len());
                for (handle, presence) in presences {
                    if let Some(contact) = self.lookup_contact_by_handle(handle) {
                        contact.receive_presence(presence);
                    }
                }
            }
            ContactEvent::CapabilitiesChanged(capabilities) => {
                debug!(
                    "Got CapabilitiesChanged for {} contact(s)",
                    capabilities.len()
                );
                for (handle, caps) in capabilities {
                    if let Some(contact) = self.lookup_contact_by_handle(handle) {
                        contact.receive_capabilities(caps);
                    }
                }
            }
            ContactEvent::LocationUpdated { handle, location } => {
                debug!("Got LocationUpdated for handle {}", handle);
                if let Some(contact) = self.lookup_contact_by_handle(handle) {
                    contact.receive_location(location);
                }
            }
            ContactEvent::ContactInfoChanged { handle, info } => {
                debug!("Got ContactInfoChanged for handle {}", handle);
                if let Some(contact) = self.lookup_contact_by_handle(handle) {
                    contact.receive_info(info);
                }
            }
        }
    }
}
