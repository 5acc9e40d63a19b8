// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;
use async_trait::async_trait;

use crate::types::Handle;

#[async_trait]
#[cfg_attr(feature = "test", mockall::automock)]
pub trait AvatarService: Send + Sync {
    /// Issues one batched avatar request. The payloads arrive individually
    /// through `ContactEvent::AvatarRetrieved`, not through this call's
    /// result. Duplicate handles are tolerated.
    async fn request_avatars(&self, handles: Vec<Handle>) -> Result<()>;
}
