// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Display)]
pub enum PresenceKind {
    #[default]
    Unset,
    Offline,
    Available,
    Away,
    ExtendedAway,
    Hidden,
    Busy,
    Unknown,
    Error,
}

/// Simple presence as delivered by the presence interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Presence {
    pub kind: PresenceKind,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl Presence {
    pub fn available(status: impl Into<String>) -> Self {
        Presence {
            kind: PresenceKind::Available,
            status: status.into(),
            message: String::new(),
        }
    }
}
