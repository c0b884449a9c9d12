//! Guard evaluators
//!
//! Pure decision functions over an [`AuthorizationContext`]. They never
//! touch the datastore, never log denials and never audit; the API layer
//! wraps them for that. UI code calls them directly to decide what to
//! render.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::context::AuthorizationContext;
use super::types::{AccessLevel, AccessRequirement, Capability, Role, Warehouse};

/// Roles allowed by the `admin_only` preset
pub const ADMIN_ONLY: [Role; 1] = [Role::Admin];

/// Roles allowed by the `manager_tier` preset
pub const MANAGER_TIER: [Role; 3] = [Role::Admin, Role::GeneralManager, Role::OpsManager];

/// Roles allowed by the `supervisor_tier` preset
pub const SUPERVISOR_TIER: [Role; 4] = [
    Role::Admin,
    Role::GeneralManager,
    Role::OpsManager,
    Role::Supervisor,
];

/// How a role set is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoleMatch {
    #[default]
    AnyOf,
    AllOf,
}

/// One authorization requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    Capability {
        capability: Capability,
        #[serde(default)]
        level: AccessRequirement,
    },
    Roles {
        roles: Vec<Role>,
        #[serde(default)]
        mode: RoleMatch,
    },
    Warehouse {
        warehouse: Warehouse,
    },
}

impl Requirement {
    /// Capability at basic level
    pub fn capability(capability: Capability) -> Self {
        Self::Capability {
            capability,
            level: AccessRequirement::Basic,
        }
    }

    /// Capability at `all_access` level
    pub fn all_access(capability: Capability) -> Self {
        Self::Capability {
            capability,
            level: AccessRequirement::AllAccess,
        }
    }

    pub fn any_role<I: IntoIterator<Item = Role>>(roles: I) -> Self {
        Self::Roles {
            roles: roles.into_iter().collect(),
            mode: RoleMatch::AnyOf,
        }
    }

    pub fn all_roles<I: IntoIterator<Item = Role>>(roles: I) -> Self {
        Self::Roles {
            roles: roles.into_iter().collect(),
            mode: RoleMatch::AllOf,
        }
    }

    pub fn warehouse(warehouse: Warehouse) -> Self {
        Self::Warehouse { warehouse }
    }

    pub fn admin_only() -> Self {
        Self::any_role(ADMIN_ONLY)
    }

    pub fn manager_tier() -> Self {
        Self::any_role(MANAGER_TIER)
    }

    pub fn supervisor_tier() -> Self {
        Self::any_role(SUPERVISOR_TIER)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Capability { capability, level } => {
                write!(f, "capability:{}:{}", capability, level)
            }
            Requirement::Roles { roles, mode } => {
                let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
                let mode = match mode {
                    RoleMatch::AnyOf => "any",
                    RoleMatch::AllOf => "all",
                };
                write!(f, "roles:{}:{}", mode, names.join(","))
            }
            Requirement::Warehouse { warehouse } => write!(f, "warehouse:{}", warehouse),
        }
    }
}

/// Why a guard denied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    AuthenticationRequired,
    PermissionDenied {
        capability: Capability,
        required: AccessRequirement,
        actual: AccessLevel,
    },
    RoleDenied {
        required: Vec<Role>,
        mode: RoleMatch,
    },
    WarehouseAccessDenied {
        warehouse: Warehouse,
    },
    DatastoreUnavailable,
}

impl DenyReason {
    /// Machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            DenyReason::PermissionDenied { .. } => "PERMISSION_DENIED",
            DenyReason::RoleDenied { .. } => "ROLE_DENIED",
            DenyReason::WarehouseAccessDenied { .. } => "WAREHOUSE_ACCESS_DENIED",
            DenyReason::DatastoreUnavailable => "DATASTORE_UNAVAILABLE",
        }
    }

    /// HTTP-equivalent status
    pub fn http_status(&self) -> u16 {
        match self {
            DenyReason::AuthenticationRequired => 401,
            DenyReason::DatastoreUnavailable => 503,
            _ => 403,
        }
    }

    /// Human readable message, safe to show to end users
    pub fn message(&self) -> String {
        match self {
            DenyReason::AuthenticationRequired => "Authentication required".to_string(),
            DenyReason::PermissionDenied {
                capability,
                required,
                ..
            } => format!("Missing permission: {} ({})", capability, required),
            DenyReason::RoleDenied { required, mode } => {
                let names: Vec<&str> = required.iter().map(|r| r.as_str()).collect();
                match mode {
                    RoleMatch::AnyOf => format!("Requires one of roles: {}", names.join(", ")),
                    RoleMatch::AllOf => format!("Requires all of roles: {}", names.join(", ")),
                }
            }
            DenyReason::WarehouseAccessDenied { warehouse } => {
                format!("No access to warehouse {}", warehouse)
            }
            DenyReason::DatastoreUnavailable => {
                "Authorization data is temporarily unavailable".to_string()
            }
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Guard outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn reason(&self) -> Option<&DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Checks shared by every guard: identity present, context not degraded
fn precheck(ctx: &AuthorizationContext) -> Option<DenyReason> {
    if ctx.is_anonymous() {
        Some(DenyReason::AuthenticationRequired)
    } else if ctx.is_degraded() {
        Some(DenyReason::DatastoreUnavailable)
    } else {
        None
    }
}

/// Capability guard
pub fn check_capability(
    ctx: &AuthorizationContext,
    capability: Capability,
    required: AccessRequirement,
) -> Decision {
    if let Some(reason) = precheck(ctx) {
        return Decision::Deny(reason);
    }

    let actual = ctx.permissions.level(capability);
    if actual.satisfies(required) {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::PermissionDenied {
            capability,
            required,
            actual,
        })
    }
}

/// Role guard. An empty role set never allows.
pub fn check_roles(ctx: &AuthorizationContext, roles: &[Role], mode: RoleMatch) -> Decision {
    if let Some(reason) = precheck(ctx) {
        return Decision::Deny(reason);
    }

    let held = |role: &Role| ctx.has_role(*role);
    let allowed = !roles.is_empty()
        && match mode {
            RoleMatch::AnyOf => roles.iter().any(held),
            RoleMatch::AllOf => roles.iter().all(held),
        };

    if allowed {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::RoleDenied {
            required: roles.to_vec(),
            mode,
        })
    }
}

/// Warehouse guard
pub fn check_warehouse(ctx: &AuthorizationContext, warehouse: Warehouse) -> Decision {
    if let Some(reason) = precheck(ctx) {
        return Decision::Deny(reason);
    }

    if ctx.can_access_warehouse(warehouse) {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::WarehouseAccessDenied { warehouse })
    }
}

pub fn admin_only(ctx: &AuthorizationContext) -> Decision {
    check_roles(ctx, &ADMIN_ONLY, RoleMatch::AnyOf)
}

pub fn manager_tier(ctx: &AuthorizationContext) -> Decision {
    check_roles(ctx, &MANAGER_TIER, RoleMatch::AnyOf)
}

pub fn supervisor_tier(ctx: &AuthorizationContext) -> Decision {
    check_roles(ctx, &SUPERVISOR_TIER, RoleMatch::AnyOf)
}

/// Dispatch a requirement to its guard
pub fn evaluate(ctx: &AuthorizationContext, requirement: &Requirement) -> Decision {
    match requirement {
        Requirement::Capability { capability, level } => check_capability(ctx, *capability, *level),
        Requirement::Roles { roles, mode } => check_roles(ctx, roles, *mode),
        Requirement::Warehouse { warehouse } => check_warehouse(ctx, *warehouse),
    }
}

/// Every requirement must allow; the first denial wins
pub fn evaluate_all<'a, I>(ctx: &AuthorizationContext, requirements: I) -> Decision
where
    I: IntoIterator<Item = &'a Requirement>,
{
    for requirement in requirements {
        let decision = evaluate(ctx, requirement);
        if !decision.is_allowed() {
            return decision;
        }
    }
    match precheck(ctx) {
        Some(reason) => Decision::Deny(reason),
        None => Decision::Allow,
    }
}

impl AuthorizationContext {
    /// Synchronous check, for render decisions
    pub fn check(&self, requirement: &Requirement) -> Decision {
        evaluate(self, requirement)
    }

    /// Shorthand for a basic capability check
    pub fn can(&self, capability: Capability) -> bool {
        check_capability(self, capability, AccessRequirement::Basic).is_allowed()
    }
}
