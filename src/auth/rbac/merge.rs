//! Effective permission computation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::matrix::PermissionMatrix;
use super::types::{AccessLevel, Capability, Role};

/// Capability levels a user effectively holds
///
/// Capabilities without an entry resolve to `denied`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectivePermissions {
    levels: BTreeMap<Capability, AccessLevel>,
}

/// Server-computed permission snapshot read from the datastore
pub type PermissionSnapshot = BTreeMap<Capability, AccessLevel>;

impl EffectivePermissions {
    /// No permissions at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Take a snapshot as-is
    pub fn from_snapshot(snapshot: PermissionSnapshot) -> Self {
        Self { levels: snapshot }
    }

    pub fn level(&self, capability: Capability) -> AccessLevel {
        self.levels
            .get(&capability)
            .copied()
            .unwrap_or(AccessLevel::Denied)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Capability, AccessLevel)> + '_ {
        self.levels.iter().map(|(cap, level)| (*cap, *level))
    }

    /// Capabilities with any non-denied level
    pub fn granted(&self) -> Vec<Capability> {
        self.levels
            .iter()
            .filter(|(_, level)| level.is_granted())
            .map(|(cap, _)| *cap)
            .collect()
    }

    fn raise(&mut self, capability: Capability, level: AccessLevel) {
        let current = self.levels.entry(capability).or_insert(AccessLevel::Denied);
        if level > *current {
            *current = level;
        }
    }
}

/// Merge the grants of every held role, keeping the highest-precedence
/// level per capability. Role order does not matter and equal levels never
/// overwrite.
pub fn merge_roles<'a, I>(matrix: &PermissionMatrix, roles: I) -> EffectivePermissions
where
    I: IntoIterator<Item = &'a Role>,
{
    let mut effective = EffectivePermissions::empty();

    for role in roles {
        for capability in Capability::ALL {
            effective.raise(capability, matrix.level(*role, capability));
        }
    }

    effective
}
