// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

//! Connection interface names and contact attribute keys as they appear on
//! the wire.

use std::collections::HashMap;

use serde_json::Value;

pub const CONNECTION: &str = "org.freedesktop.Telepathy.Connection";

/// The aggregate interface for batched contact attribute queries. Feature
/// support is keyed off its presence.
pub const CONTACTS: &str = "org.freedesktop.Telepathy.Connection.Interface.Contacts";

pub const ALIASING: &str = "org.freedesktop.Telepathy.Connection.Interface.Aliasing";
pub const AVATARS: &str = "org.freedesktop.Telepathy.Connection.Interface.Avatars";
pub const SIMPLE_PRESENCE: &str = "org.freedesktop.Telepathy.Connection.Interface.SimplePresence";
pub const CONTACT_CAPABILITIES: &str =
    "org.freedesktop.Telepathy.Connection.Interface.ContactCapabilities";
pub const LOCATION: &str = "org.freedesktop.Telepathy.Connection.Interface.Location";
pub const CONTACT_INFO: &str = "org.freedesktop.Telepathy.Connection.Interface.ContactInfo";
pub const CONTACT_GROUPS: &str = "org.freedesktop.Telepathy.Connection.Interface.ContactGroups";

/// Attribute bag returned by a batched attribute query, keyed by
/// `<interface>/<attribute>`.
pub type AttributeMap = HashMap<String, Value>;

pub mod attr {
    pub const CONTACT_ID: &str = "org.freedesktop.Telepathy.Connection/contact-id";
    pub const ALIAS: &str = "org.freedesktop.Telepathy.Connection.Interface.Aliasing/alias";
    pub const AVATAR_TOKEN: &str = "org.freedesktop.Telepathy.Connection.Interface.Avatars/token";
    pub const PRESENCE: &str =
        "org.freedesktop.Telepathy.Connection.Interface.SimplePresence/presence";
    pub const CAPABILITIES: &str =
        "org.freedesktop.Telepathy.Connection.Interface.ContactCapabilities/capabilities";
    pub const LOCATION: &str = "org.freedesktop.Telepathy.Connection.Interface.Location/location";
    pub const INFO: &str = "org.freedesktop.Telepathy.Connection.Interface.ContactInfo/info";
}
