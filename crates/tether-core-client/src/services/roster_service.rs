// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;
use async_trait::async_trait;

use crate::contact::ContactRef;

/// Roster collaborator owning group membership, subscription, publication
/// and block-list state. The manager only gates access on connection
/// readiness before delegating here.
#[async_trait]
#[cfg_attr(feature = "test", mockall::automock)]
pub trait RosterService: Send + Sync {
    fn all_known_contacts(&self) -> Vec<ContactRef>;
    fn all_known_groups(&self) -> Vec<String>;
    fn group_contacts(&self, group: &str) -> Vec<ContactRef>;

    fn can_request_presence_subscription(&self) -> bool;
    fn subscription_request_has_message(&self) -> bool;
    fn can_remove_presence_subscription(&self) -> bool;
    fn subscription_removal_has_message(&self) -> bool;
    fn can_rescind_presence_subscription_request(&self) -> bool;
    fn subscription_rescinding_has_message(&self) -> bool;
    fn can_authorize_presence_publication(&self) -> bool;
    fn publication_authorization_has_message(&self) -> bool;
    fn publication_rejection_has_message(&self) -> bool;
    fn can_remove_presence_publication(&self) -> bool;
    fn publication_removal_has_message(&self) -> bool;
    fn can_block_contacts(&self) -> bool;

    async fn add_group(&self, group: &str) -> Result<()>;
    async fn remove_group(&self, group: &str) -> Result<()>;
    async fn add_contacts_to_group(&self, group: &str, contacts: &[ContactRef]) -> Result<()>;
    async fn remove_contacts_from_group(&self, group: &str, contacts: &[ContactRef])
        -> Result<()>;

    async fn request_presence_subscription(
        &self,
        contacts: &[ContactRef],
        message: Option<String>,
    ) -> Result<()>;
    async fn remove_presence_subscription(
        &self,
        contacts: &[ContactRef],
        message: Option<String>,
    ) -> Result<()>;
    async fn authorize_presence_publication(
        &self,
        contacts: &[ContactRef],
        message: Option<String>,
    ) -> Result<()>;
    async fn remove_presence_publication(
        &self,
        contacts: &[ContactRef],
        message: Option<String>,
    ) -> Result<()>;
    async fn remove_contacts(
        &self,
        contacts: &[ContactRef],
        message: Option<String>,
    ) -> Result<()>;
    async fn block_contacts(&self, contacts: &[ContactRef], block: bool) -> Result<()>;
}
