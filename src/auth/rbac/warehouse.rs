//! Warehouse isolation

use sea_orm::{ColumnTrait, Condition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::types::{Role, Warehouse};

/// Warehouses a user may touch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WarehouseAccess {
    /// Accessible warehouse codes
    pub warehouses: BTreeSet<Warehouse>,
    /// Granted through a global-access role rather than assignments
    pub has_global_access: bool,
}

impl WarehouseAccess {
    /// Zero accessible warehouses
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, warehouse: Warehouse) -> bool {
        self.warehouses.contains(&warehouse)
    }

    pub fn is_empty(&self) -> bool {
        self.warehouses.is_empty()
    }

    /// Codes in stable order, for query filters and responses
    pub fn codes(&self) -> Vec<&'static str> {
        self.warehouses.iter().map(|w| w.code()).collect()
    }
}

/// Resolves accessible warehouses from roles and explicit assignments
#[derive(Debug, Clone)]
pub struct WarehouseResolver {
    global_roles: BTreeSet<Role>,
}

impl WarehouseResolver {
    pub fn new<I: IntoIterator<Item = Role>>(global_roles: I) -> Self {
        Self {
            global_roles: global_roles.into_iter().collect(),
        }
    }

    pub fn global_roles(&self) -> &BTreeSet<Role> {
        &self.global_roles
    }

    /// Whether any held role carries global warehouse access
    pub fn grants_global(&self, roles: &BTreeSet<Role>) -> bool {
        roles.iter().any(|role| self.global_roles.contains(role))
    }

    /// Global-access roles win outright; otherwise exactly the assigned set
    pub fn resolve(&self, roles: &BTreeSet<Role>, assigned: &[Warehouse]) -> WarehouseAccess {
        if self.grants_global(roles) {
            return WarehouseAccess {
                warehouses: Warehouse::ALL.into_iter().collect(),
                has_global_access: true,
            };
        }

        WarehouseAccess {
            warehouses: assigned.iter().copied().collect(),
            has_global_access: false,
        }
    }
}

/// Query filter restricting a warehouse column to the accessible set.
///
/// Global access yields an unrestricted condition. An empty set yields an
/// empty `IN` list, which renders as an always-false predicate, so a user
/// with no assignments sees no rows.
pub fn warehouse_condition<C: ColumnTrait>(access: &WarehouseAccess, column: C) -> Condition {
    if access.has_global_access {
        return Condition::all();
    }

    Condition::all().add(column.is_in(access.codes()))
}
