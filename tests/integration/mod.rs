//! Integration tests for warehouse-gate
//!
//! These tests exercise the authorization core through real storage
//! backends and the HTTP surface.

pub mod api_tests;
pub mod config_tests;
pub mod database_tests;
pub mod policy_tests;
pub mod scenario_tests;
