// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::{BTreeSet, HashMap};
use std::mem;
use std::sync::{Arc, Weak};

use itertools::Itertools;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use strum::IntoEnumIterator;
use tracing::{debug, warn};

use crate::avatar_cache::DynAvatarCache;
use crate::contact::{Contact, ContactRef};
use crate::error::ContactError;
use crate::services::{
    ChangeStream, DynAvatarService, DynConnectionService, DynContactAttributesService,
    DynNotificationService, DynRosterService,
};
use crate::types::{
    interface, AttributeMap, AvatarData, ConnectionFeature, Feature, FeatureSet, Handle,
};

/// Collaborators the manager delegates to.
pub struct ContactManagerDependencies {
    pub connection: DynConnectionService,
    pub contact_attributes: DynContactAttributesService,
    pub avatars: DynAvatarService,
    pub notifications: DynNotificationService,
    pub roster: DynRosterService,
    pub avatar_cache: DynAvatarCache,
}

/// Outcome of a contact acquisition: contacts in request order, plus
/// anything the connection did not recognize.
#[derive(Debug, Default)]
pub struct ResolvedContacts {
    pub contacts: Vec<ContactRef>,
    pub invalid_handles: Vec<Handle>,
    pub invalid_identifiers: Vec<String>,
}

#[derive(Default)]
struct AvatarRequestQueue {
    pending: Vec<Handle>,
    flush_scheduled: bool,
}

/// Authoritative, de-duplicated view of the contacts known to one
/// connection.
///
/// At most one live `Contact` exists per handle; the manager holds only weak
/// observations and lets contacts die with their last strong owner. Feature
/// data is fetched lazily through the batched attribute query, change
/// notifications are subscribed to exactly once per feature, and avatar
/// requests coalesce into one batched call per scheduler turn.
pub struct ContactManager {
    connection: DynConnectionService,
    contact_attributes: DynContactAttributesService,
    avatars: DynAvatarService,
    notifications: DynNotificationService,
    roster: DynRosterService,
    avatar_cache: DynAvatarCache,
    default_features: FeatureSet,

    contacts: Mutex<HashMap<Handle, Weak<Contact>>>,
    tracking: Mutex<BTreeSet<Feature>>,
    supported_features: OnceCell<FeatureSet>,
    avatar_queue: Mutex<AvatarRequestQueue>,
}

impl ContactManager {
    /// `default_features` is unioned into the feature set of every
    /// acquisition request.
    pub fn new(deps: ContactManagerDependencies, default_features: FeatureSet) -> Self {
        ContactManager {
            connection: deps.connection,
            contact_attributes: deps.contact_attributes,
            avatars: deps.avatars,
            notifications: deps.notifications,
            roster: deps.roster,
            avatar_cache: deps.avatar_cache,
            default_features,
            contacts: Mutex::new(HashMap::new()),
            tracking: Mutex::new(BTreeSet::new()),
            supported_features: OnceCell::new(),
            avatar_queue: Mutex::new(AvatarRequestQueue::default()),
        }
    }

    /// The features the remote connection can answer attribute queries for.
    /// Computed once per connection: empty forever unless the connection
    /// advertises the aggregate contacts interface.
    pub fn supported_features(&self) -> FeatureSet {
        self.supported_features
            .get_or_init(|| {
                if !self
                    .connection
                    .interfaces()
                    .iter()
                    .any(|name| name == interface::CONTACTS)
                {
                    return FeatureSet::default();
                }

                let attribute_interfaces = self.connection.contact_attribute_interfaces();
                let supported = Feature::iter()
                    .filter(|feature| *feature != Feature::RosterGroups)
                    .filter(|feature| {
                        attribute_interfaces
                            .iter()
                            .any(|name| name == feature.interface())
                    })
                    .collect::<FeatureSet>();

                debug!("{} contact features supported", supported.len());
                supported
            })
            .clone()
    }

    /// Looks up the live contact for `handle`. A dangling weak entry is
    /// purged as a side effect of the lookup.
    pub fn lookup_contact_by_handle(&self, handle: Handle) -> Option<ContactRef> {
        let mut contacts = self.contacts.lock();

        match contacts.get(&handle) {
            Some(weak) => match weak.upgrade() {
                Some(contact) => Some(contact),
                None => {
                    contacts.remove(&handle);
                    None
                }
            },
            None => None,
        }
    }

    /// Returns the one live contact for `handle`, constructing it or
    /// augmenting the existing entity with the given features and
    /// attributes.
    pub fn ensure_contact(
        &self,
        handle: Handle,
        features: &FeatureSet,
        attributes: &AttributeMap,
    ) -> ContactRef {
        let mut contacts = self.contacts.lock();

        if let Some(existing) = contacts.get(&handle).and_then(Weak::upgrade) {
            existing.augment(features, attributes);
            return existing;
        }

        let contact = Arc::new(Contact::new(handle, features.clone(), attributes));
        contacts.insert(handle, Arc::downgrade(&contact));
        contact
    }

    /// Installs the change-notification subscription backing `feature` on
    /// first use. Subsequent calls are no-ops.
    fn ensure_tracking(&self, feature: Feature) {
        if !self.tracking.lock().insert(feature) {
            return;
        }

        let stream = match feature {
            Feature::Alias => Some(ChangeStream::AliasesChanged),
            Feature::AvatarToken => Some(ChangeStream::AvatarUpdated),
            Feature::AvatarData => Some(ChangeStream::AvatarRetrieved),
            Feature::SimplePresence => Some(ChangeStream::PresencesChanged),
            Feature::Capabilities => Some(ChangeStream::CapabilitiesChanged),
            Feature::Location => Some(ChangeStream::LocationUpdated),
            Feature::Info => Some(ChangeStream::ContactInfoChanged),
            // Roster group updates arrive through the roster collaborator,
            // not through a change-notification stream.
            Feature::RosterGroups => None,
        };

        let Some(stream) = stream else { return };

        if let Err(err) = self.notifications.subscribe(stream) {
            warn!("Failed to subscribe to {} notifications: {}", stream, err);
        }
    }

    /// Turns raw handles into contacts carrying at least the requested
    /// features. Contacts that already satisfy the request are returned
    /// as-is; the rest are fetched through one batched attribute query
    /// covering the union of missing features. Handles the connection does
    /// not recognize are reported in `invalid_handles`.
    pub async fn contacts_for_handles(
        &self,
        handles: &[Handle],
        features: &FeatureSet,
    ) -> Result<ResolvedContacts, ContactError> {
        self.ensure_usable(ConnectionFeature::Core)?;

        let mut requested = features.clone();
        requested.unite(&self.default_features);

        let mut satisfying = HashMap::<Handle, ContactRef>::new();
        let mut other = Vec::<Handle>::new();
        let mut missing_features = FeatureSet::default();

        for &handle in handles {
            match self.lookup_contact_by_handle(handle) {
                Some(contact) => {
                    let missing = requested.difference(&contact.requested_features());
                    if missing.is_empty() {
                        satisfying.insert(handle, contact);
                    } else {
                        other.push(handle);
                        missing_features.unite(&missing);
                    }
                }
                None => {
                    other.push(handle);
                    missing_features.unite(&requested);
                }
            }
        }

        let supported = self.supported_features();
        let mut interfaces = Vec::new();
        for feature in missing_features.iter() {
            self.ensure_tracking(feature);

            // Only query interfaces reported as supported, anything else
            // would error.
            if supported.contains(feature) {
                interfaces.push(feature.interface().to_string());
            }
        }
        let interfaces = interfaces.into_iter().unique().collect::<Vec<_>>();

        let attributes = if other.is_empty() {
            HashMap::new()
        } else {
            debug!(
                "Fetching {} feature(s) for {} contact(s)",
                missing_features.len(),
                other.len()
            );
            self.contact_attributes
                .contact_attributes(&other, &interfaces)
                .await?
        };

        let mut resolved = ResolvedContacts::default();
        for handle in handles {
            if let Some(contact) = satisfying.get(handle) {
                resolved.contacts.push(contact.clone());
            } else if let Some(attrs) = attributes.get(handle) {
                resolved
                    .contacts
                    .push(self.ensure_contact(*handle, &requested, attrs));
            } else {
                resolved.invalid_handles.push(*handle);
            }
        }

        Ok(resolved)
    }

    /// Resolves string identifiers to handles, then proceeds as
    /// `contacts_for_handles`. Identifiers the connection does not
    /// recognize are reported in `invalid_identifiers` while the valid
    /// remainder proceeds.
    pub async fn contacts_for_identifiers(
        &self,
        identifiers: &[String],
        features: &FeatureSet,
    ) -> Result<ResolvedContacts, ContactError> {
        self.ensure_usable(ConnectionFeature::Core)?;

        let resolution = self
            .contact_attributes
            .resolve_identifiers(identifiers)
            .await?;
        let handles = resolution
            .handles
            .iter()
            .map(|(_, handle)| *handle)
            .collect::<Vec<_>>();

        let mut resolved = self.contacts_for_handles(&handles, features).await?;
        resolved.invalid_identifiers = resolution.invalid_identifiers;
        Ok(resolved)
    }

    /// Requests additional features for already-live contacts. Only the
    /// per-contact delta of features not yet held is fetched.
    pub async fn upgrade_contacts(
        &self,
        contacts: &[ContactRef],
        features: &FeatureSet,
    ) -> Result<ResolvedContacts, ContactError> {
        self.ensure_usable(ConnectionFeature::Core)?;

        let handles = contacts
            .iter()
            .map(|contact| contact.handle())
            .collect::<Vec<_>>();
        self.contacts_for_handles(&handles, features).await
    }

    /// Delivers `contact`'s avatar from the disk cache when possible,
    /// otherwise queues the handle for a batched request. Requests arriving
    /// within the same scheduler turn coalesce into a single call; queued
    /// duplicates are left to the batched call, which tolerates them.
    pub fn request_contact_avatar(self: &Arc<Self>, contact: &Contact) {
        if let Some(token) = contact.avatar_token() {
            match self.avatar_cache.cached_avatar(&token) {
                Ok(Some(avatar)) => {
                    debug!("Avatar found in cache for handle {}", contact.handle());
                    contact.receive_avatar(avatar);
                    return;
                }
                Ok(None) => (),
                Err(err) => debug!("Avatar cache read failed for token {}: {}", token, err),
            }
        }

        debug!("Need to request avatar for handle {}", contact.handle());

        let mut queue = self.avatar_queue.lock();
        queue.pending.push(contact.handle());

        if !queue.flush_scheduled {
            queue.flush_scheduled = true;

            let manager = Arc::downgrade(self);
            tokio::spawn(async move {
                if let Some(manager) = manager.upgrade() {
                    manager.flush_avatar_requests().await;
                }
            });
        }
    }

    /// Snapshots and clears the queue, then issues exactly one batched
    /// request for it. Requests arriving after the snapshot start a fresh
    /// queue and flush cycle.
    async fn flush_avatar_requests(&self) {
        let handles = {
            let mut queue = self.avatar_queue.lock();
            queue.flush_scheduled = false;
            mem::take(&mut queue.pending)
        };

        if handles.is_empty() {
            return;
        }

        debug!("Requesting {} avatar(s)", handles.len());
        if let Err(err) = self.avatars.request_avatars(handles).await {
            warn!("Batched avatar request failed: {}", err);
        }
    }

    // Cache write failure must not prevent in-memory delivery.
    pub(super) fn persist_avatar(&self, token: &str, avatar: &AvatarData) {
        if let Err(err) = self.avatar_cache.cache_avatar(token, avatar) {
            debug!("Avatar cache write failed for token {}: {}", token, err);
        }
    }

    /// Contacts that would reasonably appear on a contact list. Empty until
    /// the roster is ready.
    pub fn all_known_contacts(&self) -> Vec<ContactRef> {
        if !self.connection.is_ready(ConnectionFeature::Roster) {
            return Vec::new();
        }
        self.roster.all_known_contacts()
    }

    /// User-defined contact list group names. Empty until roster groups are
    /// ready.
    pub fn all_known_groups(&self) -> Vec<String> {
        if !self.connection.is_ready(ConnectionFeature::RosterGroups) {
            return Vec::new();
        }
        self.roster.all_known_groups()
    }

    /// Contacts in the given group, or empty if the group does not exist.
    pub fn group_contacts(&self, group: &str) -> Vec<ContactRef> {
        if !self.connection.is_ready(ConnectionFeature::RosterGroups) {
            return Vec::new();
        }
        self.roster.group_contacts(group)
    }

    pub fn can_request_presence_subscription(&self) -> bool {
        self.connection.is_ready(ConnectionFeature::Roster)
            && self.roster.can_request_presence_subscription()
    }

    /// Whether the message argument to `request_presence_subscription` is
    /// actually transmitted by the protocol.
    pub fn subscription_request_has_message(&self) -> bool {
        self.connection.is_ready(ConnectionFeature::Roster)
            && self.roster.subscription_request_has_message()
    }

    pub fn can_remove_presence_subscription(&self) -> bool {
        self.connection.is_ready(ConnectionFeature::Roster)
            && self.roster.can_remove_presence_subscription()
    }

    pub fn subscription_removal_has_message(&self) -> bool {
        self.connection.is_ready(ConnectionFeature::Roster)
            && self.roster.subscription_removal_has_message()
    }

    /// Whether a pending subscription request can be cancelled before the
    /// contact responds.
    pub fn can_rescind_presence_subscription_request(&self) -> bool {
        self.connection.is_ready(ConnectionFeature::Roster)
            && self.roster.can_rescind_presence_subscription_request()
    }

    pub fn subscription_rescinding_has_message(&self) -> bool {
        self.connection.is_ready(ConnectionFeature::Roster)
            && self.roster.subscription_rescinding_has_message()
    }

    pub fn can_authorize_presence_publication(&self) -> bool {
        self.connection.is_ready(ConnectionFeature::Roster)
            && self.roster.can_authorize_presence_publication()
    }

    pub fn publication_authorization_has_message(&self) -> bool {
        self.connection.is_ready(ConnectionFeature::Roster)
            && self.roster.publication_authorization_has_message()
    }

    pub fn publication_rejection_has_message(&self) -> bool {
        self.connection.is_ready(ConnectionFeature::Roster)
            && self.roster.publication_rejection_has_message()
    }

    pub fn can_remove_presence_publication(&self) -> bool {
        self.connection.is_ready(ConnectionFeature::Roster)
            && self.roster.can_remove_presence_publication()
    }

    pub fn publication_removal_has_message(&self) -> bool {
        self.connection.is_ready(ConnectionFeature::Roster)
            && self.roster.publication_removal_has_message()
    }

    /// Whether this protocol keeps a list of blocked contacts.
    pub fn can_block_contacts(&self) -> bool {
        self.connection.is_ready(ConnectionFeature::Roster) && self.roster.can_block_contacts()
    }

    /// Attempts to add a user-defined contact list group. Succeeds if the
    /// group already exists.
    pub async fn add_group(&self, group: &str) -> Result<(), ContactError> {
        self.ensure_usable(ConnectionFeature::RosterGroups)?;
        Ok(self.roster.add_group(group).await?)
    }

    pub async fn remove_group(&self, group: &str) -> Result<(), ContactError> {
        self.ensure_usable(ConnectionFeature::RosterGroups)?;
        Ok(self.roster.remove_group(group).await?)
    }

    pub async fn add_contacts_to_group(
        &self,
        group: &str,
        contacts: &[ContactRef],
    ) -> Result<(), ContactError> {
        self.ensure_usable(ConnectionFeature::RosterGroups)?;
        Ok(self.roster.add_contacts_to_group(group, contacts).await?)
    }

    pub async fn remove_contacts_from_group(
        &self,
        group: &str,
        contacts: &[ContactRef],
    ) -> Result<(), ContactError> {
        self.ensure_usable(ConnectionFeature::RosterGroups)?;
        Ok(self
            .roster
            .remove_contacts_from_group(group, contacts)
            .await?)
    }

    /// Attempts to subscribe to the presence of the given contacts.
    /// Completes once the request has been submitted; it does not wait for
    /// the contacts to authorize it.
    pub async fn request_presence_subscription(
        &self,
        contacts: &[ContactRef],
        message: Option<String>,
    ) -> Result<(), ContactError> {
        self.ensure_usable(ConnectionFeature::Roster)?;
        Ok(self
            .roster
            .request_presence_subscription(contacts, message)
            .await?)
    }

    /// Stops receiving the presence of the given contacts, or rescinds a
    /// pending subscription request.
    pub async fn remove_presence_subscription(
        &self,
        contacts: &[ContactRef],
        message: Option<String>,
    ) -> Result<(), ContactError> {
        self.ensure_usable(ConnectionFeature::Roster)?;
        Ok(self
            .roster
            .remove_presence_subscription(contacts, message)
            .await?)
    }

    /// Grants the given contacts permission to receive the user's presence.
    pub async fn authorize_presence_publication(
        &self,
        contacts: &[ContactRef],
        message: Option<String>,
    ) -> Result<(), ContactError> {
        self.ensure_usable(ConnectionFeature::Roster)?;
        Ok(self
            .roster
            .authorize_presence_publication(contacts, message)
            .await?)
    }

    /// Denies or revokes publication of the user's presence to the given
    /// contacts.
    pub async fn remove_presence_publication(
        &self,
        contacts: &[ContactRef],
        message: Option<String>,
    ) -> Result<(), ContactError> {
        self.ensure_usable(ConnectionFeature::Roster)?;
        Ok(self
            .roster
            .remove_presence_publication(contacts, message)
            .await?)
    }

    /// Removes contacts entirely: subscription, publication and any stored
    /// roster entry.
    pub async fn remove_contacts(
        &self,
        contacts: &[ContactRef],
        message: Option<String>,
    ) -> Result<(), ContactError> {
        self.ensure_usable(ConnectionFeature::Roster)?;
        Ok(self.roster.remove_contacts(contacts, message).await?)
    }

    /// Adds the contacts to, or removes them from, the list of blocked
    /// contacts.
    pub async fn block_contacts(
        &self,
        contacts: &[ContactRef],
        block: bool,
    ) -> Result<(), ContactError> {
        self.ensure_usable(ConnectionFeature::Roster)?;
        Ok(self.roster.block_contacts(contacts, block).await?)
    }

    fn ensure_usable(&self, required: ConnectionFeature) -> Result<(), ContactError> {
        if !self.connection.is_valid() {
            return Err(ContactError::invalid_connection());
        }
        if !self.connection.is_ready(required) {
            return Err(ContactError::feature_not_ready(required));
        }
        Ok(())
    }
}
