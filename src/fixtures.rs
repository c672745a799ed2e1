//! JSON fixtures describing roles, groups and users.
//!
//! ```json
//! {
//!   "roles":  [{ "id": "...", "domain": "acme", "department": "legal",
//!                "roleName": "reviewer", "permissionTree": { ... } }],
//!   "groups": [{ "id": "...", "roleIds": ["..."], "userIds": ["..."] }],
//!   "users":  [{ "id": "...", "email": "a@acme.test", "domain": "acme",
//!                "department": "legal", "roleIds": [], "groupIds": [] }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{AuthzError, AuthzResult};
use crate::models::{Actor, Group, Role};
use crate::store::InMemoryStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub users: Vec<Actor>,
}

impl Fixture {
    pub fn into_store(self) -> InMemoryStore {
        let mut store = InMemoryStore::new();
        for role in self.roles {
            store.insert_role(role);
        }
        for group in self.groups {
            store.insert_group(group);
        }
        for user in self.users {
            store.insert_actor(user);
        }
        store
    }
}

pub fn parse_fixture(raw: &str) -> AuthzResult<Fixture> {
    let de = &mut serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(de)
        .map_err(|err| AuthzError::fixture(format!("{} at `{}`", err.inner(), err.path())))
}

pub fn load_fixture(path: impl AsRef<Path>) -> AuthzResult<Fixture> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AuthzError::fixture(format!("failed to read {}: {}", path.display(), e)))?;
    parse_fixture(&raw)
}
