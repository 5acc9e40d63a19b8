// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use mime::Mime;

/// In-memory avatar payload with its MIME type.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarData {
    pub bytes: Vec<u8>,
    pub mime_type: Mime,
}

impl AvatarData {
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: Mime) -> Self {
        AvatarData {
            bytes: bytes.into(),
            mime_type,
        }
    }

    /// Parses `mime_type`, falling back to `application/octet-stream` when
    /// the connection hands us something unparseable.
    pub fn with_mime_str(bytes: impl Into<Vec<u8>>, mime_type: &str) -> Self {
        AvatarData {
            bytes: bytes.into(),
            mime_type: mime_type
                .parse()
                .unwrap_or(mime::APPLICATION_OCTET_STREAM),
        }
    }
}
