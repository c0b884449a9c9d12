//! Storage-level policy generation
//!
//! The permission matrix and the warehouse isolation rule are defined once,
//! in this crate. This module renders them as PostgreSQL seed data, helper
//! functions and row-level security policies, so the database enforces the
//! same rules the API guards do.
//!
//! The helper functions mirror the merge engine: the effective level of a
//! capability is the maximum precedence over the user's roles, and global
//! access is a role attribute checked before warehouse assignments.

use crate::config::{PolicyConfig, ProtectedTable};
use crate::utils::error::{GatewayError, Result};
use std::collections::BTreeSet;
use std::fmt::Write;
use std::sync::Arc;

use super::matrix::PermissionMatrix;
use super::types::{AccessLevel, Role};

/// Generated policy set
#[derive(Debug, Clone)]
pub struct PolicySet {
    matrix: Arc<PermissionMatrix>,
    global_roles: BTreeSet<Role>,
    config: PolicyConfig,
}

/// Whether a name is safe to splice into DDL unquoted
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl PolicySet {
    pub fn new(
        matrix: Arc<PermissionMatrix>,
        global_roles: BTreeSet<Role>,
        config: PolicyConfig,
    ) -> Result<Self> {
        for table in &config.protected_tables {
            validate_table(table)?;
        }
        if config.user_expression.trim().is_empty() {
            return Err(GatewayError::config("rbac.policy.user_expression cannot be empty"));
        }

        Ok(Self {
            matrix,
            global_roles,
            config,
        })
    }

    /// Full script: seed tables, helper functions, then table policies
    pub fn render(&self) -> String {
        let mut sql = String::new();
        sql.push_str(&self.render_role_capabilities());
        sql.push('\n');
        sql.push_str(&self.render_global_access_roles());
        sql.push('\n');
        sql.push_str(&self.render_functions());
        for table in &self.config.protected_tables {
            sql.push('\n');
            sql.push_str(&self.render_table_policy(table));
        }
        sql
    }

    /// `role_capabilities` table and its rows, one per matrix entry
    pub fn render_role_capabilities(&self) -> String {
        let mut sql = String::from(
            "CREATE TABLE IF NOT EXISTS role_capabilities (\n    \
             role text NOT NULL,\n    \
             capability text NOT NULL,\n    \
             access_level text NOT NULL,\n    \
             precedence smallint NOT NULL,\n    \
             PRIMARY KEY (role, capability)\n);\n\
             DELETE FROM role_capabilities;\n\
             INSERT INTO role_capabilities (role, capability, access_level, precedence) VALUES\n",
        );

        let rows: Vec<String> = self
            .matrix
            .entries()
            .map(|(role, cap, level)| {
                format!(
                    "    ('{}', '{}', '{}', {})",
                    role,
                    cap,
                    level,
                    level.precedence()
                )
            })
            .collect();
        sql.push_str(&rows.join(",\n"));
        sql.push_str(";\n");
        sql
    }

    /// `global_access_roles` table and its rows
    pub fn render_global_access_roles(&self) -> String {
        let mut sql = String::from(
            "CREATE TABLE IF NOT EXISTS global_access_roles (\n    \
             role text PRIMARY KEY\n);\n\
             DELETE FROM global_access_roles;\n",
        );

        if !self.global_roles.is_empty() {
            let rows: Vec<String> = self
                .global_roles
                .iter()
                .map(|role| format!("('{}')", role))
                .collect();
            let _ = writeln!(
                sql,
                "INSERT INTO global_access_roles (role) VALUES {};",
                rows.join(", ")
            );
        }
        sql
    }

    /// Helper functions used by every table policy
    pub fn render_functions(&self) -> String {
        "CREATE OR REPLACE FUNCTION authz_effective_precedence(uid uuid, cap text)\n\
         RETURNS smallint LANGUAGE sql STABLE AS $$\n    \
         SELECT COALESCE(MAX(rc.precedence), 0)::smallint\n    \
         FROM user_roles ur\n    \
         JOIN role_capabilities rc ON rc.role = ur.role\n    \
         WHERE ur.user_id = uid AND rc.capability = cap\n\
         $$;\n\
         \n\
         CREATE OR REPLACE FUNCTION authz_can_access_warehouse(uid uuid, code text)\n\
         RETURNS boolean LANGUAGE sql STABLE AS $$\n    \
         SELECT EXISTS (\n        \
         SELECT 1 FROM user_roles ur\n        \
         JOIN global_access_roles g ON g.role = ur.role\n        \
         WHERE ur.user_id = uid\n    \
         ) OR EXISTS (\n        \
         SELECT 1 FROM user_warehouses uw\n        \
         WHERE uw.user_id = uid AND uw.warehouse_code = code\n    \
         )\n\
         $$;\n"
            .to_string()
    }

    /// Row-level security policy for one protected table
    pub fn render_table_policy(&self, table: &ProtectedTable) -> String {
        let uid = self.config.user_expression.trim();
        let name = &table.table;
        let precedence = format!(
            "authz_effective_precedence({}, '{}')",
            uid, table.capability
        );

        // own_only narrows to owned rows only when the table records an owner
        let capability_clause = match &table.owner_column {
            Some(owner) => format!(
                "({precedence} IN ({granted}, {all}) OR ({precedence} = {own} AND {owner} = {uid}))",
                granted = AccessLevel::Granted.precedence(),
                all = AccessLevel::AllAccess.precedence(),
                own = AccessLevel::OwnOnly.precedence(),
            ),
            None => format!("{} > {}", precedence, AccessLevel::Denied.precedence()),
        };

        format!(
            "ALTER TABLE {name} ENABLE ROW LEVEL SECURITY;\n\
             DROP POLICY IF EXISTS {name}_authz ON {name};\n\
             CREATE POLICY {name}_authz ON {name} FOR SELECT USING (\n    \
             authz_can_access_warehouse({uid}, {warehouse})\n    \
             AND {capability_clause}\n\
             );\n",
            warehouse = table.warehouse_column,
        )
    }
}

fn validate_table(table: &ProtectedTable) -> Result<()> {
    let mut names = vec![table.table.as_str(), table.warehouse_column.as_str()];
    if let Some(owner) = &table.owner_column {
        names.push(owner.as_str());
    }

    match names.into_iter().find(|name| !is_sql_identifier(name)) {
        Some(bad) => Err(GatewayError::config(format!(
            "Invalid SQL identifier in protected table {}: {:?}",
            table.table, bad
        ))),
        None => Ok(()),
    }
}
