// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::types::ConnectionFeature;

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    /// The connection cannot serve the request right now. Checked before any
    /// call leaves this process.
    #[error("Not available: {reason}")]
    NotAvailable { reason: String },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ContactError {
    pub fn invalid_connection() -> Self {
        ContactError::NotAvailable {
            reason: "Connection is invalid".to_string(),
        }
    }

    pub fn feature_not_ready(feature: ConnectionFeature) -> Self {
        ContactError::NotAvailable {
            reason: format!("Connection feature {feature} is not ready"),
        }
    }

    pub fn is_not_available(&self) -> bool {
        matches!(self, ContactError::NotAvailable { .. })
    }
}
