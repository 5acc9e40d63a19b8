// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use avatar_cache::AvatarCache;
pub use fs_avatar_cache::FsAvatarCache;
pub use noop_avatar_cache::NoopAvatarCache;

mod avatar_cache;
mod fs_avatar_cache;
mod noop_avatar_cache;

use std::sync::Arc;

pub type DynAvatarCache = Arc<dyn AvatarCache>;

#[cfg(feature = "test")]
pub mod mocks {
    pub use super::avatar_cache::MockAvatarCache;
}
