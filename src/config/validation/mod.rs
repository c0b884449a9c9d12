//! Configuration validation
//!
//! This module provides validation logic for all configuration structures.
//!
//! The validation is organized into several submodules:
//! - `trait_def`: Core Validate trait definition
//! - `config_validators`: Gateway, server and CORS validators
//! - `storage_validators`: Database validators
//! - `auth_validators`: Identity token and RBAC validators
//! - `monitoring_validators`: Audit and logging validators
//! - `tests`: Test suite for all validators

mod auth_validators;
mod config_validators;
mod monitoring_validators;
mod storage_validators;
mod trait_def;

pub use trait_def::Validate;
