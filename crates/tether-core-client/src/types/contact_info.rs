// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use serde::{Deserialize, Serialize};

/// One structured contact info field, vCard-style: a field name such as
/// `tel`, optional type parameters, and the field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfoField {
    pub field_name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub field_value: Vec<String>,
}
