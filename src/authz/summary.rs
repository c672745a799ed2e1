//! Flat, display-oriented projection of an actor's merged statements, used by
//! access-control viewers. Everything is copied out as plain values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{PolicyStatement, Role};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSummary {
    pub subject: String,
    pub action: String,
    pub access_level: String,
    pub conditions: BTreeMap<String, Value>,
    pub fields: Vec<String>,
    pub path: String,
    pub granted_by: String,
}

impl From<&PolicyStatement> for PermissionSummary {
    fn from(statement: &PolicyStatement) -> Self {
        Self {
            subject: statement.subject.to_string(),
            action: statement.action.to_string(),
            access_level: statement.access_level.to_string(),
            conditions: statement
                .conditions
                .iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
            fields: statement.fields.clone().unwrap_or_default(),
            path: statement.path.clone(),
            granted_by: statement.role_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub id: String,
    pub role_name: String,
    pub domain: String,
    pub department: String,
    pub grant_count: usize,
}

impl From<&Role> for RoleSummary {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id.to_string(),
            role_name: role.role_name.clone(),
            domain: role.domain.clone(),
            department: role.department.clone(),
            grant_count: role.permission_tree.leaf_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessSummary {
    pub total_roles: usize,
    pub total_permissions: usize,
    pub permissions: Vec<PermissionSummary>,
    pub roles: Vec<RoleSummary>,
    pub generated_at: DateTime<Utc>,
}

impl AccessSummary {
    pub fn empty() -> Self {
        Self::build(&[], &[])
    }

    pub fn build(roles: &[Role], merged: &[PolicyStatement]) -> Self {
        Self {
            total_roles: roles.len(),
            total_permissions: merged.len(),
            permissions: merged.iter().map(PermissionSummary::from).collect(),
            roles: roles.iter().map(RoleSummary::from).collect(),
            generated_at: Utc::now(),
        }
    }
}
