// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CHANNEL_TYPE: &str = "org.freedesktop.Telepathy.Channel.ChannelType";
const CHANNEL_TYPE_TEXT: &str = "org.freedesktop.Telepathy.Channel.Type.Text";

/// One requestable channel class advertised for a contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RequestableChannelClass {
    #[serde(default)]
    pub fixed_properties: Map<String, Value>,
    #[serde(default)]
    pub allowed_properties: Vec<String>,
}

/// Per-contact capabilities, expressed as requestable channel classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ContactCapabilities {
    pub classes: Vec<RequestableChannelClass>,
}

impl ContactCapabilities {
    pub fn supports_text_chats(&self) -> bool {
        self.classes.iter().any(|class| {
            class.fixed_properties.get(CHANNEL_TYPE).and_then(Value::as_str)
                == Some(CHANNEL_TYPE_TEXT)
        })
    }
}
