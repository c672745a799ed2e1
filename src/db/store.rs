use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::errors::AuthzResult;
use crate::models::{Actor, Group, Role};
use crate::store::AccessStore;

use super::placeholders;
use super::row_parsers::{actor_from_row, group_from_row, role_from_row, uuid_from_row};

/// [`AccessStore`] over the SQLite read model created by the bundled migration.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

/// Distinct ids in first-seen order, as strings ready for binding.
fn distinct_ids(ids: &[Uuid]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(**id))
        .map(|id| id.to_string())
        .collect()
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs `SELECT <key>, <value> FROM <table> WHERE <key> IN (...)` and groups
    /// values by key, preserving insertion order.
    async fn links(
        &self,
        table: &str,
        key: &str,
        value: &str,
        keys: &[String],
    ) -> AuthzResult<HashMap<Uuid, Vec<Uuid>>> {
        let sql = format!(
            "SELECT {k}, {v} FROM {t} WHERE {k} IN ({p}) ORDER BY rowid",
            k = key,
            v = value,
            t = table,
            p = placeholders(keys.len())
        );
        let mut query = sqlx::query(&sql);
        for k in keys {
            query = query.bind(k.as_str());
        }

        let mut out: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in query.fetch_all(&self.pool).await? {
            out.entry(uuid_from_row(&row, key)?)
                .or_default()
                .push(uuid_from_row(&row, value)?);
        }
        Ok(out)
    }
}

#[async_trait]
impl AccessStore for SqliteStore {
    async fn fetch_roles_by_ids(&self, ids: &[Uuid]) -> AuthzResult<Vec<Role>> {
        let keys = distinct_ids(ids);
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, domain, department, role_name, permission_tree FROM roles WHERE id IN ({})",
            placeholders(keys.len())
        );
        let mut query = sqlx::query(&sql);
        for k in &keys {
            query = query.bind(k.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut users = self.links("user_roles", "role_id", "user_id", &keys).await?;
        let mut groups = self.links("group_roles", "role_id", "group_id", &keys).await?;

        let mut by_id = HashMap::new();
        for row in &rows {
            let mut role = role_from_row(row)?;
            role.user_ids = users.remove(&role.id).unwrap_or_default();
            role.group_ids = groups.remove(&role.id).unwrap_or_default();
            by_id.insert(role.id, role);
        }

        tracing::debug!(requested = keys.len(), found = by_id.len(), "fetched roles");

        // Callers rely on request order for first-seen deduplication.
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn fetch_groups_by_ids(&self, ids: &[Uuid]) -> AuthzResult<Vec<Group>> {
        let keys = distinct_ids(ids);
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("SELECT id FROM user_groups WHERE id IN ({})", placeholders(keys.len()));
        let mut query = sqlx::query(&sql);
        for k in &keys {
            query = query.bind(k.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut roles = self.links("group_roles", "group_id", "role_id", &keys).await?;
        let mut members = self.links("group_members", "group_id", "user_id", &keys).await?;

        let mut by_id = HashMap::new();
        for row in &rows {
            let mut group = group_from_row(row)?;
            group.role_ids = roles.remove(&group.id).unwrap_or_default();
            group.user_ids = members.remove(&group.id).unwrap_or_default();
            by_id.insert(group.id, group);
        }

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn fetch_actor(&self, id: Uuid) -> AuthzResult<Option<Actor>> {
        let row = sqlx::query("SELECT id, email, domain, department FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut actor = actor_from_row(&row)?;
        let key = [id.to_string()];
        actor.role_ids = self
            .links("user_roles", "user_id", "role_id", &key)
            .await?
            .remove(&id)
            .unwrap_or_default();
        actor.group_ids = self
            .links("group_members", "user_id", "group_id", &key)
            .await?
            .remove(&id)
            .unwrap_or_default();

        Ok(Some(actor))
    }
}
