// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{AttributeMap, Handle};

/// Outcome of resolving string identifiers to handles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IdentifierResolution {
    /// Successfully resolved identifiers with their handles, in request
    /// order.
    pub handles: Vec<(String, Handle)>,
    /// Identifiers the connection did not recognize.
    pub invalid_identifiers: Vec<String>,
}

#[async_trait]
#[cfg_attr(feature = "test", mockall::automock)]
pub trait ContactAttributesService: Send + Sync {
    /// Fetches attributes for `handles` through the given interfaces in one
    /// batched call. Handles unknown to the connection are absent from the
    /// returned map. An empty interface list still yields the baseline
    /// attributes (at least the contact identifier).
    async fn contact_attributes(
        &self,
        handles: &[Handle],
        interfaces: &[String],
    ) -> Result<HashMap<Handle, AttributeMap>>;

    /// Resolves string identifiers to handles.
    async fn resolve_identifiers(&self, identifiers: &[String]) -> Result<IdentifierResolution>;
}
