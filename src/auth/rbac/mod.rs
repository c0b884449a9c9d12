//! Role-Based Access Control (RBAC) system
//!
//! Permission matrix, merge engine, warehouse isolation, context building
//! and guard evaluation.

mod context;
pub mod guards;
mod matrix;
mod merge;
mod policy;
mod system;
mod types;
mod warehouse;

pub use context::{AuthorizationContext, ContextBuilder, ContextResolution, PermissionSource};
pub use guards::{Decision, DenyReason, Requirement, RoleMatch};
pub use matrix::PermissionMatrix;
pub use merge::{EffectivePermissions, PermissionSnapshot, merge_roles};
pub use policy::{PolicySet, is_sql_identifier};
pub use system::RbacSystem;
pub use types::{AccessLevel, AccessRequirement, Capability, Role, Warehouse};
pub use warehouse::{WarehouseAccess, WarehouseResolver, warehouse_condition};
