//! Common test utilities for warehouse-gate
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::common::{TestDatabase, fixtures};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let db = TestDatabase::new().await;
//!     let user = fixtures::TestUser::new(&[Role::Staff]);
//!     // ...
//! }
//! ```

pub mod database;
pub mod fixtures;

pub use database::TestDatabase;
pub use fixtures::{TestApp, TestUser};
