// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;

use crate::types::AvatarData;

/// Persistent store for avatar payloads, keyed by avatar token.
///
/// This is policy-facing storage: the manager consults it before issuing any
/// avatar request and writes retrieved payloads back through it. Failures on
/// either side degrade to a cache miss, never to a failed delivery.
#[cfg_attr(feature = "test", mockall::automock)]
pub trait AvatarCache: Send + Sync {
    /// Returns the cached avatar for `token`, or `None` on a miss. A cached
    /// blob whose MIME type record is missing counts as a miss.
    fn cached_avatar(&self, token: &str) -> Result<Option<AvatarData>>;

    /// Persists `avatar` under `token`.
    fn cache_avatar(&self, token: &str, avatar: &AvatarData) -> Result<()>;
}
