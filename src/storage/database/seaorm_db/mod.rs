// Module declarations
mod assignment_ops;
mod audit_ops;
mod authz_ops;
mod connection;
mod types;

// Re-export public types
pub use types::{DatabaseBackendType, SeaOrmDatabase};
