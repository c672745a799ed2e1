//! Role Aggregator
//!
//! Collects every role effective for an actor: direct assignments first, then
//! the roles of each group the actor belongs to. Duplicate role ids collapse to
//! the first occurrence.

use std::collections::HashSet;

use uuid::Uuid;

use crate::errors::AuthzResult;
use crate::models::{Actor, Role};
use crate::store::AccessStore;

pub async fn effective_roles<S>(store: &S, actor: &Actor) -> AuthzResult<Vec<Role>>
where
    S: AccessStore + ?Sized,
{
    if actor.role_ids.is_empty() && actor.group_ids.is_empty() {
        return Ok(Vec::new());
    }

    let direct = if actor.role_ids.is_empty() {
        Vec::new()
    } else {
        store.fetch_roles_by_ids(&actor.role_ids).await?
    };

    let group_role_ids: Vec<Uuid> = if actor.group_ids.is_empty() {
        Vec::new()
    } else {
        store
            .fetch_groups_by_ids(&actor.group_ids)
            .await?
            .into_iter()
            .flat_map(|g| g.role_ids)
            .collect()
    };

    let via_groups = if group_role_ids.is_empty() {
        Vec::new()
    } else {
        store.fetch_roles_by_ids(&group_role_ids).await?
    };

    tracing::debug!(
        actor_id = %actor.id,
        direct = direct.len(),
        via_groups = via_groups.len(),
        "fetched actor roles"
    );

    Ok(dedupe_roles(direct.into_iter().chain(via_groups)))
}

/// Keeps the first role seen for each id.
pub fn dedupe_roles(roles: impl IntoIterator<Item = Role>) -> Vec<Role> {
    let mut seen = HashSet::new();
    roles.into_iter().filter(|r| seen.insert(r.id)).collect()
}
