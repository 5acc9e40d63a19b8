// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;
use strum_macros::Display;

/// Change-notification streams the connection can deliver for contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ChangeStream {
    AliasesChanged,
    AvatarUpdated,
    AvatarRetrieved,
    PresencesChanged,
    CapabilitiesChanged,
    LocationUpdated,
    ContactInfoChanged,
}

/// Installs subscriptions to connection-level change notifications. Events
/// flow back through `ContactManager::handle_event`.
#[cfg_attr(feature = "test", mockall::automock)]
pub trait NotificationService: Send + Sync {
    fn subscribe(&self, stream: ChangeStream) -> Result<()>;
}
