// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::avatar_cache::AvatarCache;
use crate::services::ConnectionService;
use crate::types::AvatarData;

/// Filesystem-backed avatar cache. Each avatar is stored as a blob file
/// named after its escaped token, with a sibling `<name>.mime` file holding
/// the MIME type.
pub struct FsAvatarCache {
    path: PathBuf,
}

impl FsAvatarCache {
    /// Cache rooted at `<cache_root>/tether/avatars/<manager>/<protocol>`.
    /// Without an explicit root the platform cache directory is used
    /// (`$XDG_CACHE_HOME`, falling back to `~/.cache`).
    pub fn new(cache_root: Option<PathBuf>, manager_name: &str, protocol_name: &str) -> Self {
        let root = cache_root
            .or_else(dirs::cache_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        FsAvatarCache {
            path: root
                .join("tether")
                .join("avatars")
                .join(manager_name)
                .join(protocol_name),
        }
    }

    pub fn for_connection(cache_root: Option<PathBuf>, connection: &dyn ConnectionService) -> Self {
        Self::new(
            cache_root,
            &connection.manager_name(),
            &connection.protocol_name(),
        )
    }

    fn avatar_path(&self, token: &str) -> PathBuf {
        self.path.join(escape_token(token))
    }

    fn mime_path(avatar_path: &Path) -> PathBuf {
        let mut name = avatar_path.as_os_str().to_os_string();
        name.push(".mime");
        PathBuf::from(name)
    }
}

impl AvatarCache for FsAvatarCache {
    fn cached_avatar(&self, token: &str) -> Result<Option<AvatarData>> {
        let avatar_path = self.avatar_path(token);
        let mime_path = Self::mime_path(&avatar_path);

        if !avatar_path.is_file() || !mime_path.is_file() {
            return Ok(None);
        }

        let bytes = fs::read(&avatar_path)?;
        let mime_type = fs::read_to_string(&mime_path)?;
        debug!("Avatar for token {} found at {:?}", token, avatar_path);
        Ok(Some(AvatarData::with_mime_str(bytes, mime_type.trim())))
    }

    fn cache_avatar(&self, token: &str, avatar: &AvatarData) -> Result<()> {
        fs::create_dir_all(&self.path)?;

        let avatar_path = self.avatar_path(token);
        let mime_path = Self::mime_path(&avatar_path);

        fs::write(&mime_path, avatar.mime_type.as_ref())?;
        fs::write(&avatar_path, &avatar.bytes)?;
        debug!("Avatar for token {} written to {:?}", token, avatar_path);
        Ok(())
    }
}

/// Escapes an avatar token for use as a filename. Alphanumeric characters
/// are kept (except a leading digit), everything else becomes `_` followed
/// by the byte's hex value. An empty token escapes to `_`.
fn escape_token(token: &str) -> String {
    if token.is_empty() {
        return "_".to_string();
    }

    let mut escaped = String::with_capacity(token.len());
    for (idx, byte) in token.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric() && !(idx == 0 && byte.is_ascii_digit());
        if keep {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("_{byte:02x}"));
        }
    }
    escaped
}
