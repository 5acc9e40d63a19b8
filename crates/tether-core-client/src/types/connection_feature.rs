// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use strum_macros::Display;

/// Introspection stages the connection must have completed before parts of
/// the contact API become usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ConnectionFeature {
    Core,
    Roster,
    RosterGroups,
}
