// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::warn;

use crate::types::interface::attr;
use crate::types::{
    AttributeMap, AvatarData, ContactCapabilities, ContactInfoField, FeatureSet, Handle, Location,
    Presence,
};

pub type ContactRef = Arc<Contact>;

/// One remote party, shared by everything that holds a reference to it. The
/// manager's cache observes contacts weakly and never extends their
/// lifetime.
#[derive(Debug)]
pub struct Contact {
    handle: Handle,
    state: RwLock<ContactState>,
}

#[derive(Debug, Default)]
struct ContactState {
    identifier: String,
    requested_features: FeatureSet,
    alias: Option<String>,
    presence: Option<Presence>,
    avatar_token: Option<String>,
    avatar: Option<AvatarData>,
    capabilities: Option<ContactCapabilities>,
    location: Option<Location>,
    info: Option<Vec<ContactInfoField>>,
}

impl Contact {
    pub(crate) fn new(handle: Handle, features: FeatureSet, attributes: &AttributeMap) -> Self {
        let mut state = ContactState {
            requested_features: features,
            ..Default::default()
        };
        Self::apply_attributes(&mut state, attributes);

        Contact {
            handle,
            state: RwLock::new(state),
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn identifier(&self) -> String {
        self.state.read().identifier.clone()
    }

    /// The features that have been requested for this contact so far. Grows
    /// monotonically.
    pub fn requested_features(&self) -> FeatureSet {
        self.state.read().requested_features.clone()
    }

    pub fn alias(&self) -> Option<String> {
        self.state.read().alias.clone()
    }

    pub fn presence(&self) -> Option<Presence> {
        self.state.read().presence.clone()
    }

    /// Whether we have ever learned this contact's avatar token. An empty
    /// token is known too and means "no avatar set".
    pub fn is_avatar_token_known(&self) -> bool {
        self.state.read().avatar_token.is_some()
    }

    pub fn avatar_token(&self) -> Option<String> {
        self.state.read().avatar_token.clone()
    }

    pub fn avatar(&self) -> Option<AvatarData> {
        self.state.read().avatar.clone()
    }

    pub fn capabilities(&self) -> Option<ContactCapabilities> {
        self.state.read().capabilities.clone()
    }

    pub fn location(&self) -> Option<Location> {
        self.state.read().location.clone()
    }

    pub fn info(&self) -> Option<Vec<ContactInfoField>> {
        self.state.read().info.clone()
    }

    /// Widens the requested feature set and refreshes attributes. Never
    /// discards data already held; re-requesting a satisfied feature set is
    /// a no-op beyond the attribute refresh.
    pub fn augment(&self, features: &FeatureSet, attributes: &AttributeMap) {
        let mut state = self.state.write();
        state.requested_features.unite(features);
        Self::apply_attributes(&mut state, attributes);
    }

    pub(crate) fn receive_alias(&self, alias: String) {
        self.state.write().alias = Some(alias);
    }

    pub(crate) fn receive_presence(&self, presence: Presence) {
        self.state.write().presence = Some(presence);
    }

    pub(crate) fn set_avatar_token(&self, token: String) {
        self.state.write().avatar_token = Some(token);
    }

    pub(crate) fn receive_avatar(&self, avatar: AvatarData) {
        self.state.write().avatar = Some(avatar);
    }

    pub(crate) fn receive_capabilities(&self, capabilities: ContactCapabilities) {
        self.state.write().capabilities = Some(capabilities);
    }

    pub(crate) fn receive_location(&self, location: Location) {
        self.state.write().location = Some(location);
    }

    pub(crate) fn receive_info(&self, info: Vec<ContactInfoField>) {
        self.state.write().info = Some(info);
    }

    fn apply_attributes(state: &mut ContactState, attributes: &AttributeMap) {
        if let Some(identifier) = attributes.get(attr::CONTACT_ID).and_then(Value::as_str) {
            state.identifier = identifier.to_string();
        }
        if let Some(alias) = attributes.get(attr::ALIAS).and_then(Value::as_str) {
            state.alias = Some(alias.to_string());
        }
        if let Some(token) = attributes.get(attr::AVATAR_TOKEN).and_then(Value::as_str) {
            state.avatar_token = Some(token.to_string());
        }
        if let Some(value) = attributes.get(attr::PRESENCE) {
            match serde_json::from_value(value.clone()) {
                Ok(presence) => state.presence = Some(presence),
                Err(err) => warn!("Discarding malformed presence attribute: {}", err),
            }
        }
        if let Some(value) = attributes.get(attr::CAPABILITIES) {
            match serde_json::from_value(value.clone()) {
                Ok(capabilities) => state.capabilities = Some(capabilities),
                Err(err) => warn!("Discarding malformed capabilities attribute: {}", err),
            }
        }
        if let Some(value) = attributes.get(attr::LOCATION) {
            match serde_json::from_value(value.clone()) {
                Ok(location) => state.location = Some(location),
                Err(err) => warn!("Discarding malformed location attribute: {}", err),
            }
        }
        if let Some(value) = attributes.get(attr::INFO) {
            match serde_json::from_value(value.clone()) {
                Ok(info) => state.info = Some(info),
                Err(err) => warn!("Discarding malformed contact info attribute: {}", err),
            }
        }
    }
}
