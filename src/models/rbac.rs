use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission_tree::PermissionNode;

// =============================================================================
// ROLE
// =============================================================================

/// A named bundle of grants scoped to one domain and department.
///
/// Roles are owned by the administration subsystem; this crate only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    pub domain: String,
    pub department: String,
    pub role_name: String,
    #[serde(default)]
    pub permission_tree: PermissionNode,
    #[serde(default)]
    pub user_ids: Vec<Uuid>,
    #[serde(default)]
    pub group_ids: Vec<Uuid>,
}

impl Role {
    pub fn new(
        domain: impl Into<String>,
        department: impl Into<String>,
        role_name: impl Into<String>,
        permission_tree: PermissionNode,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            domain: domain.into(),
            department: department.into(),
            role_name: role_name.into(),
            permission_tree,
            user_ids: Vec::new(),
            group_ids: Vec::new(),
        }
    }
}

// =============================================================================
// GROUP
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
    #[serde(default)]
    pub user_ids: Vec<Uuid>,
}

impl Group {
    pub fn new(role_ids: Vec<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role_ids,
            user_ids: Vec::new(),
        }
    }
}

// =============================================================================
// ACTOR
// =============================================================================

/// The authenticated user on whose behalf a query is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: Uuid,
    pub email: String,
    pub domain: String,
    pub department: String,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
    #[serde(default)]
    pub group_ids: Vec<Uuid>,
}

impl Actor {
    pub fn new(
        email: impl Into<String>,
        domain: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            domain: domain.into(),
            department: department.into(),
            role_ids: Vec::new(),
            group_ids: Vec::new(),
        }
    }

    pub fn with_roles(mut self, role_ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.role_ids = role_ids.into_iter().collect();
        self
    }

    pub fn with_groups(mut self, group_ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.group_ids = group_ids.into_iter().collect();
        self
    }
}
