// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use avatar_service::AvatarService;
pub use connection_service::ConnectionService;
pub use contact_attributes_service::{ContactAttributesService, IdentifierResolution};
pub use notification_service::{ChangeStream, NotificationService};
pub use roster_service::RosterService;

mod avatar_service;
mod connection_service;
mod contact_attributes_service;
mod notification_service;
mod roster_service;

use std::sync::Arc;

pub type DynAvatarService = Arc<dyn AvatarService>;
pub type DynConnectionService = Arc<dyn ConnectionService>;
pub type DynContactAttributesService = Arc<dyn ContactAttributesService>;
pub type DynNotificationService = Arc<dyn NotificationService>;
pub type DynRosterService = Arc<dyn RosterService>;

#[cfg(feature = "test")]
pub mod mocks {
    pub use super::avatar_service::MockAvatarService;
    pub use super::connection_service::MockConnectionService;
    pub use super::contact_attributes_service::MockContactAttributesService;
    pub use super::notification_service::MockNotificationService;
    pub use super::roster_service::MockRosterService;
}
