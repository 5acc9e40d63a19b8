// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;

use crate::avatar_cache::AvatarCache;
use crate::types::AvatarData;

/// Cache that never hits and never stores. Useful for protocols without
/// avatars and for tests.
#[derive(Default)]
pub struct NoopAvatarCache {}

impl AvatarCache for NoopAvatarCache {
    fn cached_avatar(&self, _token: &str) -> Result<Option<AvatarData>> {
        Ok(None)
    }

    fn cache_avatar(&self, _token: &str, _avatar: &AvatarData) -> Result<()> {
        Ok(())
    }
}
