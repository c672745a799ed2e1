//! Read accessors over the administration data store.
//!
//! The authorization core never writes roles, groups or users; it only reads
//! them through [`AccessStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AuthzResult;
use crate::models::{Actor, Group, Role};

/// Collaborator supplying role, group and actor records.
///
/// Lookups return only the records that exist; unknown ids are skipped rather
/// than reported. Transport or storage failures are errors and abort resolution.
#[async_trait]
pub trait AccessStore: Send + Sync {
    async fn fetch_roles_by_ids(&self, ids: &[Uuid]) -> AuthzResult<Vec<Role>>;

    async fn fetch_groups_by_ids(&self, ids: &[Uuid]) -> AuthzResult<Vec<Group>>;

    async fn fetch_actor(&self, id: Uuid) -> AuthzResult<Option<Actor>>;
}

/// Store backed by plain maps. Used by fixtures and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    roles: HashMap<Uuid, Role>,
    groups: HashMap<Uuid, Group>,
    actors: HashMap<Uuid, Actor>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.insert_role(role);
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.insert_group(group);
        self
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.insert_actor(actor);
        self
    }

    pub fn insert_role(&mut self, role: Role) {
        self.roles.insert(role.id, role);
    }

    pub fn insert_group(&mut self, group: Group) {
        self.groups.insert(group.id, group);
    }

    pub fn insert_actor(&mut self, actor: Actor) {
        self.actors.insert(actor.id, actor);
    }
}

#[async_trait]
impl AccessStore for InMemoryStore {
    async fn fetch_roles_by_ids(&self, ids: &[Uuid]) -> AuthzResult<Vec<Role>> {
        Ok(ids.iter().filter_map(|id| self.roles.get(id).cloned()).collect())
    }

    async fn fetch_groups_by_ids(&self, ids: &[Uuid]) -> AuthzResult<Vec<Group>> {
        Ok(ids.iter().filter_map(|id| self.groups.get(id).cloned()).collect())
    }

    async fn fetch_actor(&self, id: Uuid) -> AuthzResult<Option<Actor>> {
        Ok(self.actors.get(&id).cloned())
    }
}
