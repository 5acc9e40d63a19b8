// tether-core-client/tether-core-client
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::BTreeSet;

use strum_macros::{Display, EnumIter};

use crate::types::interface;

/// Optional per-contact data that can be requested when acquiring contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum Feature {
    Alias,
    AvatarToken,
    AvatarData,
    SimplePresence,
    Capabilities,
    Location,
    Info,
    RosterGroups,
}

impl Feature {
    /// The connection interface that backs this feature.
    pub fn interface(&self) -> &'static str {
        match self {
            Feature::Alias => interface::ALIASING,
            Feature::AvatarToken | Feature::AvatarData => interface::AVATARS,
            Feature::SimplePresence => interface::SIMPLE_PRESENCE,
            Feature::Capabilities => interface::CONTACT_CAPABILITIES,
            Feature::Location => interface::LOCATION,
            Feature::Info => interface::CONTACT_INFO,
            Feature::RosterGroups => interface::CONTACT_GROUPS,
        }
    }
}

/// A set of requested or supported contact features.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureSet(BTreeSet<Feature>);

impl FeatureSet {
    pub fn new() -> Self {
        FeatureSet::default()
    }

    pub fn insert(&mut self, feature: Feature) -> bool {
        self.0.insert(feature)
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.0.contains(&feature)
    }

    pub fn unite(&mut self, other: &FeatureSet) {
        self.0.extend(other.iter())
    }

    /// Features in `self` that `other` does not contain.
    pub fn difference(&self, other: &FeatureSet) -> FeatureSet {
        FeatureSet(self.0.difference(&other.0).copied().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<T: IntoIterator<Item = Feature>>(iter: T) -> Self {
        FeatureSet(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Feature; N]> for FeatureSet {
    fn from(features: [Feature; N]) -> Self {
        features.into_iter().collect()
    }
}
