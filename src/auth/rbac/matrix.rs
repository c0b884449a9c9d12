//! Role to capability permission matrix

use crate::utils::error::{GatewayError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::types::{AccessLevel, Capability, Role};

use AccessLevel::{AllAccess as A, Denied as D, Granted as G, OwnOnly as O};

/// Standard grants, one row per role, columns in [`Capability::ALL`] order:
/// dashboard, view tx, create tx, edit tx, stock, RO, users, reports, settings
const STANDARD_GRANTS: [(Role, [AccessLevel; 9]); 5] = [
    (Role::Admin, [G, A, G, A, G, G, G, G, G]),
    (Role::GeneralManager, [G, A, G, A, G, G, D, G, D]),
    (Role::OpsManager, [G, A, G, A, G, G, D, G, D]),
    (Role::Supervisor, [G, A, G, G, G, G, D, G, D]),
    (Role::Staff, [G, O, G, D, G, D, D, D, D]),
];

/// Explicit access level for every (role, capability) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionMatrix {
    grants: BTreeMap<Role, BTreeMap<Capability, AccessLevel>>,
}

impl PermissionMatrix {
    /// The built-in matrix
    pub fn standard() -> Self {
        let grants = STANDARD_GRANTS
            .iter()
            .map(|(role, levels)| {
                let row = Capability::ALL
                    .iter()
                    .copied()
                    .zip(levels.iter().copied())
                    .collect();
                (*role, row)
            })
            .collect();

        Self { grants }
    }

    /// Build a matrix from configuration, rejecting incomplete definitions
    pub fn from_grants(grants: BTreeMap<Role, BTreeMap<Capability, AccessLevel>>) -> Result<Self> {
        let matrix = Self { grants };
        matrix.validate()?;
        debug!("Loaded permission matrix for {} roles", matrix.grants.len());
        Ok(matrix)
    }

    /// Every role must carry an explicit entry for every capability
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();

        for role in Role::ALL {
            match self.grants.get(&role) {
                None => missing.push(format!("{} (all capabilities)", role)),
                Some(row) => {
                    for cap in Capability::ALL {
                        if !row.contains_key(&cap) {
                            missing.push(format!("{}.{}", role, cap));
                        }
                    }
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::config(format!(
                "Permission matrix is missing entries: {}",
                missing.join(", ")
            )))
        }
    }

    /// Access level a single role holds for a capability.
    ///
    /// An absent entry is `denied`; omission never grants.
    pub fn level(&self, role: Role, capability: Capability) -> AccessLevel {
        self.grants
            .get(&role)
            .and_then(|row| row.get(&capability))
            .copied()
            .unwrap_or(AccessLevel::Denied)
    }

    /// Full capability row for a role
    pub fn row(&self, role: Role) -> Option<&BTreeMap<Capability, AccessLevel>> {
        self.grants.get(&role)
    }

    /// Iterate over (role, capability, level) triples in a stable order
    pub fn entries(&self) -> impl Iterator<Item = (Role, Capability, AccessLevel)> + '_ {
        self.grants
            .iter()
            .flat_map(|(role, row)| row.iter().map(move |(cap, level)| (*role, *cap, *level)))
    }
}

impl Default for PermissionMatrix {
    fn default() -> Self {
        Self::standard()
    }
}
