//! RBAC type definitions
//!
//! Roles, capabilities, access levels and warehouse codes are closed sets.
//! The same definitions back the API guards, the context handed to the UI
//! and the generated database policies.

use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Role a user can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System administrator
    Admin,
    /// General manager
    GeneralManager,
    /// Operations manager
    OpsManager,
    /// Shift supervisor
    Supervisor,
    /// Warehouse staff
    Staff,
}

impl Role {
    /// Every defined role
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::GeneralManager,
        Role::OpsManager,
        Role::Supervisor,
        Role::Staff,
    ];

    /// Stable identifier used in storage and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::GeneralManager => "general_manager",
            Role::OpsManager => "ops_manager",
            Role::Supervisor => "supervisor",
            Role::Staff => "staff",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::GeneralManager => "General Manager",
            Role::OpsManager => "Operations Manager",
            Role::Supervisor => "Supervisor",
            Role::Staff => "Staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| GatewayError::validation(format!("Unknown role: {}", s)))
    }
}

/// Protected operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewDashboard,
    ViewTransactions,
    CreateTransactions,
    EditTransactions,
    ViewStock,
    ManageReplenishmentOrders,
    ManageUsers,
    ViewReports,
    SystemSettings,
}

impl Capability {
    /// Every defined capability, in matrix column order
    pub const ALL: [Capability; 9] = [
        Capability::ViewDashboard,
        Capability::ViewTransactions,
        Capability::CreateTransactions,
        Capability::EditTransactions,
        Capability::ViewStock,
        Capability::ManageReplenishmentOrders,
        Capability::ManageUsers,
        Capability::ViewReports,
        Capability::SystemSettings,
    ];

    /// Stable identifier used in storage and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewDashboard => "view_dashboard",
            Capability::ViewTransactions => "view_transactions",
            Capability::CreateTransactions => "create_transactions",
            Capability::EditTransactions => "edit_transactions",
            Capability::ViewStock => "view_stock",
            Capability::ManageReplenishmentOrders => "manage_replenishment_orders",
            Capability::ManageUsers => "manage_users",
            Capability::ViewReports => "view_reports",
            Capability::SystemSettings => "system_settings",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        Capability::ALL
            .into_iter()
            .find(|cap| cap.as_str() == s)
            .ok_or_else(|| GatewayError::validation(format!("Unknown capability: {}", s)))
    }
}

/// Granularity of a capability grant
///
/// Merge precedence is `all_access > own_only > granted > denied`. The
/// ordering is defined by [`AccessLevel::precedence`], not by declaration
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// No access
    #[default]
    Denied,
    /// Basic access
    Granted,
    /// Access restricted to records the acting user owns
    OwnOnly,
    /// Access to every record
    AllAccess,
}

impl AccessLevel {
    /// Every access level, lowest precedence first
    pub const ALL: [AccessLevel; 4] = [
        AccessLevel::Denied,
        AccessLevel::Granted,
        AccessLevel::OwnOnly,
        AccessLevel::AllAccess,
    ];

    /// Merge precedence. Also stored in the database policy tables.
    pub fn precedence(&self) -> u8 {
        match self {
            AccessLevel::Denied => 0,
            AccessLevel::Granted => 1,
            AccessLevel::OwnOnly => 2,
            AccessLevel::AllAccess => 3,
        }
    }

    /// Stable identifier used in storage and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Denied => "denied",
            AccessLevel::Granted => "granted",
            AccessLevel::OwnOnly => "own_only",
            AccessLevel::AllAccess => "all_access",
        }
    }

    /// Whether any access is granted at all
    pub fn is_granted(&self) -> bool {
        !matches!(self, AccessLevel::Denied)
    }

    /// Whether this level meets a guard requirement
    pub fn satisfies(&self, requirement: AccessRequirement) -> bool {
        match requirement {
            AccessRequirement::Basic => self.is_granted(),
            AccessRequirement::AllAccess => matches!(self, AccessLevel::AllAccess),
        }
    }
}

impl Ord for AccessLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence().cmp(&other.precedence())
    }
}

impl PartialOrd for AccessLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        AccessLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| GatewayError::validation(format!("Unknown access level: {}", s)))
    }
}

/// Minimum level a capability guard asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessRequirement {
    /// Any non-denied level
    #[default]
    Basic,
    /// Only `all_access`; `own_only` does not qualify
    AllAccess,
}

impl fmt::Display for AccessRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessRequirement::Basic => f.write_str("basic"),
            AccessRequirement::AllAccess => f.write_str("all_access"),
        }
    }
}

/// Warehouse partition code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Warehouse {
    #[serde(rename = "UBB")]
    Ubb,
    #[serde(rename = "MMA")]
    Mma,
    #[serde(rename = "KKB")]
    Kkb,
    #[serde(rename = "SRG")]
    Srg,
}

impl Warehouse {
    /// Every warehouse code
    pub const ALL: [Warehouse; 4] = [Warehouse::Ubb, Warehouse::Mma, Warehouse::Kkb, Warehouse::Srg];

    /// Warehouse code as stored in data tables
    pub fn code(&self) -> &'static str {
        match self {
            Warehouse::Ubb => "UBB",
            Warehouse::Mma => "MMA",
            Warehouse::Kkb => "KKB",
            Warehouse::Srg => "SRG",
        }
    }
}

impl fmt::Display for Warehouse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Warehouse {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_ascii_uppercase();
        Warehouse::ALL
            .into_iter()
            .find(|warehouse| warehouse.code() == code)
            .ok_or_else(|| GatewayError::validation(format!("Unknown warehouse code: {}", s)))
    }
}
