// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use tether_core_client::avatar_cache::{DynAvatarCache, NoopAvatarCache};
use tether_core_client::services::mocks::{
    MockAvatarService, MockConnectionService, MockContactAttributesService,
    MockNotificationService, MockRosterService,
};
use tether_core_client::services::{ChangeStream, IdentifierResolution};
use tether_core_client::types::interface::{self, attr};
use tether_core_client::types::{
    AttributeMap, ContactCapabilities, ContactInfoField, Feature, FeatureSet, Handle, Location,
    Presence,
};
use tether_core_client::{ContactEvent, ContactManager, ContactManagerDependencies};

#[derive(Default)]
struct TestDeps {
    connection: MockConnectionService,
    contact_attributes: MockContactAttributesService,
    avatars: MockAvatarService,
    notifications: MockNotificationService,
    roster: MockRosterService,
}

impl TestDeps {
    fn into_manager(self, default_features: FeatureSet) -> Arc<ContactManager> {
        self.into_manager_with_cache(Arc::new(NoopAvatarCache::default()), default_features)
    }

    fn into_manager_with_cache(
        self,
        avatar_cache: DynAvatarCache,
        default_features: FeatureSet,
    ) -> Arc<ContactManager> {
        Arc::new(ContactManager::new(
            ContactManagerDependencies {
                connection: Arc::new(self.connection),
                contact_attributes: Arc::new(self.contact_attributes),
                avatars: Arc::new(self.avatars),
                notifications: Arc::new(self.notifications),
                roster: Arc::new(self.roster),
                avatar_cache,
            },
            default_features,
        ))
    }
}

fn connection_ready(connection: &mut MockConnectionService, attribute_interfaces: &[&str]) {
    connection.expect_is_valid().return_const(true);
    connection.expect_is_ready().returning(|_| true);
    connection
        .expect_interfaces()
        .return_const(vec![interface::CONTACTS.to_string()]);
    connection.expect_contact_attribute_interfaces().return_const(
        attribute_interfaces
            .iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>(),
    );
}

fn contact_id_attrs(identifier: &str) -> AttributeMap {
    HashMap::from([(attr::CONTACT_ID.to_string(), json!(identifier))])
}

/// Makes the attribute query answer every requested handle with a baseline
/// attribute bag.
fn echo_attributes(service: &mut MockContactAttributesService) {
    service.expect_contact_attributes().returning(|handles, _| {
        let handles = handles.to_vec();
        Box::pin(async move {
            Ok(handles
                .into_iter()
                .map(|handle| {
                    (
                        handle,
                        contact_id_attrs(&format!("contact-{}@example.org", handle)),
                    )
                })
                .collect::<HashMap<_, _>>())
        })
    });
}

#[test]
fn test_cache_keeps_one_live_contact_per_handle() {
    let manager = TestDeps::default().into_manager(FeatureSet::new());

    let contact = manager.ensure_contact(
        Handle(1),
        &FeatureSet::new(),
        &contact_id_attrs("ada@example.org"),
    );
    let same = manager.ensure_contact(Handle(1), &FeatureSet::new(), &HashMap::new());
    assert!(Arc::ptr_eq(&contact, &same));

    let looked_up = manager.lookup_contact_by_handle(Handle(1)).unwrap();
    assert!(Arc::ptr_eq(&contact, &looked_up));
}

#[test]
fn test_cache_forgets_dropped_contacts() {
    let manager = TestDeps::default().into_manager(FeatureSet::new());

    let contact = manager.ensure_contact(
        Handle(1),
        &FeatureSet::new(),
        &contact_id_attrs("ada@example.org"),
    );
    drop(contact);

    assert!(manager.lookup_contact_by_handle(Handle(1)).is_none());

    // The stale entry is gone; a new acquisition builds a fresh entity.
    let recreated = manager.ensure_contact(
        Handle(1),
        &FeatureSet::new(),
        &contact_id_attrs("ada@example.org"),
    );
    assert_eq!(recreated.identifier(), "ada@example.org");
    assert!(manager.lookup_contact_by_handle(Handle(1)).is_some());
}

#[tokio::test]
async fn test_upgrade_preserves_feature_data() -> Result<()> {
    let mut deps = TestDeps::default();
    connection_ready(
        &mut deps.connection,
        &[interface::ALIASING, interface::SIMPLE_PRESENCE],
    );
    deps.notifications.expect_subscribe().returning(|_| Ok(()));

    deps.contact_attributes
        .expect_contact_attributes()
        .times(2)
        .returning(|handles, interfaces| {
            let handles = handles.to_vec();
            let interfaces = interfaces.to_vec();
            Box::pin(async move {
                let mut attrs = contact_id_attrs("ada@example.org");
                if interfaces.iter().any(|name| name == interface::ALIASING) {
                    attrs.insert(attr::ALIAS.to_string(), json!("Ada"));
                }
                if interfaces
                    .iter()
                    .any(|name| name == interface::SIMPLE_PRESENCE)
                {
                    attrs.insert(
                        attr::PRESENCE.to_string(),
                        json!({ "kind": "Available", "status": "available" }),
                    );
                }
                Ok(handles
                    .into_iter()
                    .map(|handle| (handle, attrs.clone()))
                    .collect::<HashMap<_, _>>())
            })
        });

    let manager = deps.into_manager(FeatureSet::new());

    let resolved = manager
        .contacts_for_handles(&[Handle(7)], &FeatureSet::from([Feature::Alias]))
        .await?;
    let contact = resolved.contacts[0].clone();
    assert_eq!(
        contact.requested_features(),
        FeatureSet::from([Feature::Alias])
    );
    assert_eq!(contact.alias(), Some("Ada".to_string()));
    assert_eq!(contact.presence(), None);

    let upgraded = manager
        .upgrade_contacts(
            &[contact.clone()],
            &FeatureSet::from([Feature::Alias, Feature::SimplePresence]),
        )
        .await?;
    assert!(Arc::ptr_eq(&contact, &upgraded.contacts[0]));
    assert_eq!(
        contact.requested_features(),
        FeatureSet::from([Feature::Alias, Feature::SimplePresence])
    );
    assert_eq!(contact.alias(), Some("Ada".to_string()));
    assert_eq!(contact.presence(), Some(Presence::available("available")));
    Ok(())
}

#[tokio::test]
async fn test_satisfied_contacts_skip_the_fetch() -> Result<()> {
    let mut deps = TestDeps::default();
    connection_ready(&mut deps.connection, &[interface::ALIASING]);
    deps.notifications.expect_subscribe().returning(|_| Ok(()));
    deps.contact_attributes
        .expect_contact_attributes()
        .times(1)
        .returning(|handles, _| {
            let handles = handles.to_vec();
            Box::pin(async move {
                Ok(handles
                    .into_iter()
                    .map(|handle| (handle, contact_id_attrs("ada@example.org")))
                    .collect::<HashMap<_, _>>())
            })
        });

    let manager = deps.into_manager(FeatureSet::new());
    let features = FeatureSet::from([Feature::Alias]);

    let first = manager.contacts_for_handles(&[Handle(7)], &features).await?;
    // Second acquisition with a satisfied feature set issues no further call.
    let second = manager.contacts_for_handles(&[Handle(7)], &features).await?;

    assert!(Arc::ptr_eq(&first.contacts[0], &second.contacts[0]));
    Ok(())
}

#[tokio::test]
async fn test_acquisition_fails_when_connection_is_invalid() {
    let mut deps = TestDeps::default();
    deps.connection.expect_is_valid().return_const(false);

    let manager = deps.into_manager(FeatureSet::new());
    let err = manager
        .contacts_for_handles(&[Handle(1)], &FeatureSet::new())
        .await
        .unwrap_err();

    assert!(err.is_not_available());
    assert_eq!(err.to_string(), "Not available: Connection is invalid");
}

#[tokio::test]
async fn test_acquisition_fails_before_core_is_ready() {
    let mut deps = TestDeps::default();
    deps.connection.expect_is_valid().return_const(true);
    deps.connection.expect_is_ready().returning(|_| false);

    let manager = deps.into_manager(FeatureSet::new());
    let err = manager
        .contacts_for_identifiers(&["ada@example.org".to_string()], &FeatureSet::new())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Not available: Connection feature Core is not ready"
    );
}

#[tokio::test]
async fn test_roster_operations_gate_on_readiness() {
    let mut deps = TestDeps::default();
    deps.connection.expect_is_valid().return_const(true);
    deps.connection.expect_is_ready().returning(|_| false);
    // No expectations on the roster: a delegated call would panic.

    let manager = deps.into_manager(FeatureSet::new());

    let err = manager.add_group("Friends").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Not available: Connection feature RosterGroups is not ready"
    );

    let err = manager
        .request_presence_subscription(&[], None)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Not available: Connection feature Roster is not ready"
    );

    assert!(!manager.can_request_presence_subscription());
    assert!(!manager.can_block_contacts());
    assert!(!manager.publication_removal_has_message());
    assert!(manager.all_known_contacts().is_empty());
    assert!(manager.all_known_groups().is_empty());
    assert!(manager.group_contacts("Friends").is_empty());
}

#[tokio::test]
async fn test_roster_operations_delegate_when_ready() -> Result<()> {
    let mut deps = TestDeps::default();
    connection_ready(&mut deps.connection, &[]);

    deps.roster
        .expect_add_group()
        .times(1)
        .withf(|group| group == "Friends")
        .returning(|_| Box::pin(async { Ok(()) }));
    deps.roster
        .expect_block_contacts()
        .times(1)
        .withf(|contacts, block| contacts.is_empty() && *block)
        .returning(|_, _| Box::pin(async { Ok(()) }));
    deps.roster
        .expect_remove_contacts()
        .times(1)
        .withf(|contacts, message| {
            contacts.is_empty() && message.as_deref() == Some("goodbye")
        })
        .returning(|_, _| Box::pin(async { Ok(()) }));
    deps.roster.expect_can_block_contacts().return_const(true);

    let manager = deps.into_manager(FeatureSet::new());
    manager.add_group("Friends").await?;
    manager.block_contacts(&[], true).await?;
    manager
        .remove_contacts(&[], Some("goodbye".to_string()))
        .await?;
    assert!(manager.can_block_contacts());
    Ok(())
}

#[tokio::test]
async fn test_tracking_subscribes_once_per_feature() -> Result<()> {
    let mut deps = TestDeps::default();
    connection_ready(&mut deps.connection, &[interface::SIMPLE_PRESENCE]);
    echo_attributes(&mut deps.contact_attributes);

    deps.notifications
        .expect_subscribe()
        .withf(|stream| *stream == ChangeStream::PresencesChanged)
        .times(1)
        .returning(|_| Ok(()));

    let manager = deps.into_manager(FeatureSet::new());
    let features = FeatureSet::from([Feature::SimplePresence]);

    manager.contacts_for_handles(&[Handle(1)], &features).await?;
    manager.contacts_for_handles(&[Handle(2)], &features).await?;
    Ok(())
}

#[tokio::test]
async fn test_queries_only_supported_interfaces() -> Result<()> {
    let mut deps = TestDeps::default();
    connection_ready(&mut deps.connection, &[interface::SIMPLE_PRESENCE]);
    deps.notifications.expect_subscribe().returning(|_| Ok(()));

    deps.contact_attributes
        .expect_contact_attributes()
        .times(1)
        .withf(|handles, interfaces| {
            handles == &[Handle(42)] && interfaces == &[interface::SIMPLE_PRESENCE.to_string()]
        })
        .returning(|handles, _| {
            let handles = handles.to_vec();
            Box::pin(async move {
                Ok(handles
                    .into_iter()
                    .map(|handle| (handle, contact_id_attrs("ada@example.org")))
                    .collect::<HashMap<_, _>>())
            })
        });

    let manager = deps.into_manager(FeatureSet::new());
    assert_eq!(
        manager.supported_features(),
        FeatureSet::from([Feature::SimplePresence])
    );

    let resolved = manager
        .contacts_for_handles(
            &[Handle(42)],
            &FeatureSet::from([Feature::Alias, Feature::SimplePresence]),
        )
        .await?;

    assert_eq!(resolved.contacts.len(), 1);
    // Alias stays requested even though its interface cannot be queried.
    assert!(resolved.contacts[0]
        .requested_features()
        .contains(Feature::Alias));
    Ok(())
}

#[tokio::test]
async fn test_supported_features_stay_empty_without_contacts_interface() -> Result<()> {
    let mut deps = TestDeps::default();
    deps.connection.expect_is_valid().return_const(true);
    deps.connection.expect_is_ready().returning(|_| true);
    deps.connection
        .expect_interfaces()
        .times(1)
        .return_const(vec![interface::SIMPLE_PRESENCE.to_string()]);
    deps.notifications.expect_subscribe().returning(|_| Ok(()));

    deps.contact_attributes
        .expect_contact_attributes()
        .times(1)
        .withf(|_, interfaces| interfaces.is_empty())
        .returning(|handles, _| {
            let handles = handles.to_vec();
            Box::pin(async move {
                Ok(handles
                    .into_iter()
                    .map(|handle| (handle, contact_id_attrs("ada@example.org")))
                    .collect::<HashMap<_, _>>())
            })
        });

    let manager = deps.into_manager(FeatureSet::new());

    assert!(manager.supported_features().is_empty());
    // Memoized: the advertised interfaces are not consulted again.
    assert!(manager.supported_features().is_empty());

    // The fetch still proceeds, through the non-interface fallback.
    let resolved = manager
        .contacts_for_handles(&[Handle(1)], &FeatureSet::from([Feature::Alias]))
        .await?;
    assert_eq!(resolved.contacts.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_contacts_for_identifiers_reports_invalid_ones() -> Result<()> {
    let mut deps = TestDeps::default();
    connection_ready(&mut deps.connection, &[]);
    echo_attributes(&mut deps.contact_attributes);

    deps.contact_attributes
        .expect_resolve_identifiers()
        .times(1)
        .withf(|identifiers| {
            identifiers == &["ada@example.org".to_string(), "bogus".to_string()]
        })
        .returning(|_| {
            Box::pin(async {
                Ok(IdentifierResolution {
                    handles: vec![("ada@example.org".to_string(), Handle(7))],
                    invalid_identifiers: vec!["bogus".to_string()],
                })
            })
        });

    let manager = deps.into_manager(FeatureSet::new());
    let resolved = manager
        .contacts_for_identifiers(
            &["ada@example.org".to_string(), "bogus".to_string()],
            &FeatureSet::new(),
        )
        .await?;

    assert_eq!(resolved.contacts.len(), 1);
    assert_eq!(resolved.contacts[0].handle(), Handle(7));
    assert_eq!(resolved.invalid_identifiers, vec!["bogus".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_unknown_handles_are_reported() -> Result<()> {
    let mut deps = TestDeps::default();
    connection_ready(&mut deps.connection, &[]);

    deps.contact_attributes
        .expect_contact_attributes()
        .times(1)
        .returning(|_, _| {
            Box::pin(async {
                Ok(HashMap::from([(
                    Handle(1),
                    contact_id_attrs("ada@example.org"),
                )]))
            })
        });

    let manager = deps.into_manager(FeatureSet::new());
    let resolved = manager
        .contacts_for_handles(&[Handle(1), Handle(9)], &FeatureSet::new())
        .await?;

    assert_eq!(resolved.contacts.len(), 1);
    assert_eq!(resolved.contacts[0].handle(), Handle(1));
    assert_eq!(resolved.invalid_handles, vec![Handle(9)]);
    Ok(())
}

#[tokio::test]
async fn test_default_features_widen_every_request() -> Result<()> {
    let mut deps = TestDeps::default();
    connection_ready(&mut deps.connection, &[interface::ALIASING]);

    deps.notifications
        .expect_subscribe()
        .withf(|stream| *stream == ChangeStream::AliasesChanged)
        .times(1)
        .returning(|_| Ok(()));

    deps.contact_attributes
        .expect_contact_attributes()
        .times(1)
        .withf(|_, interfaces| interfaces == &[interface::ALIASING.to_string()])
        .returning(|handles, _| {
            let handles = handles.to_vec();
            Box::pin(async move {
                Ok(handles
                    .into_iter()
                    .map(|handle| (handle, contact_id_attrs("ada@example.org")))
                    .collect::<HashMap<_, _>>())
            })
        });

    let manager = deps.into_manager(FeatureSet::from([Feature::Alias]));
    let resolved = manager
        .contacts_for_handles(&[Handle(3)], &FeatureSet::new())
        .await?;

    assert!(resolved.contacts[0]
        .requested_features()
        .contains(Feature::Alias));
    Ok(())
}

#[test]
fn test_events_reach_live_contacts_only() {
    let manager = TestDeps::default().into_manager(FeatureSet::new());
    let contact = manager.ensure_contact(
        Handle(1),
        &FeatureSet::new(),
        &contact_id_attrs("ada@example.org"),
    );
    let dropped = manager.ensure_contact(
        Handle(2),
        &FeatureSet::new(),
        &contact_id_attrs("bob@example.org"),
    );
    drop(dropped);

    manager.handle_event(ContactEvent::PresencesChanged(HashMap::from([
        (Handle(1), Presence::available("available")),
        // No live contact for this handle; the update is dropped.
        (Handle(2), Presence::available("away")),
    ])));
    manager.handle_event(ContactEvent::AliasesChanged(vec![(
        Handle(1),
        "Ada".to_string(),
    )]));
    manager.handle_event(ContactEvent::AvatarUpdated {
        handle: Handle(1),
        token: "token-a".to_string(),
    });
    manager.handle_event(ContactEvent::LocationUpdated {
        handle: Handle(1),
        location: Location(
            [("country".to_string(), json!("DE"))]
                .into_iter()
                .collect(),
        ),
    });
    manager.handle_event(ContactEvent::ContactInfoChanged {
        handle: Handle(1),
        info: vec![ContactInfoField {
            field_name: "tel".to_string(),
            parameters: vec![],
            field_value: vec!["+491234567".to_string()],
        }],
    });
    manager.handle_event(ContactEvent::CapabilitiesChanged(HashMap::from([(
        Handle(1),
        ContactCapabilities::default(),
    )])));

    assert_eq!(contact.presence(), Some(Presence::available("available")));
    assert_eq!(contact.alias(), Some("Ada".to_string()));
    assert_eq!(contact.avatar_token(), Some("token-a".to_string()));
    assert_eq!(
        contact.location().and_then(|l| l.get("country").cloned()),
        Some(json!("DE"))
    );
    assert_eq!(contact.info().map(|info| info.len()), Some(1));
    assert_eq!(contact.capabilities(), Some(ContactCapabilities::default()));
    assert!(manager.lookup_contact_by_handle(Handle(2)).is_none());
}
