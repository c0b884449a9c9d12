/// Denial audit entity module
pub mod authz_denial;
/// Permission snapshot entity module
pub mod permission_snapshot;
/// Role assignment entity module
pub mod user_role;
/// Warehouse assignment entity module
pub mod user_warehouse;

pub use authz_denial::Entity as AuthzDenial;
pub use permission_snapshot::Entity as PermissionSnapshot;
pub use user_role::Entity as UserRole;
pub use user_warehouse::Entity as UserWarehouse;
