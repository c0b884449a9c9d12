//! HTTP middleware implementations
//!
//! - Request ID tracking
//! - Identity resolution from bearer tokens

mod identity;
mod request_id;


pub use identity::{IdentityMiddleware, IdentityMiddlewareService, request_identity};
pub use request_id::{
    REQUEST_ID_HEADER, RequestId, RequestIdMiddleware, RequestIdMiddlewareService, request_id,
};
