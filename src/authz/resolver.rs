use uuid::Uuid;

use crate::config::AuthzConfig;
use crate::errors::AuthzResult;
use crate::models::{Actor, PolicyStatement, Role};
use crate::store::AccessStore;

use super::aggregator::effective_roles;
use super::compiler::{compile, CompiledPolicy};
use super::context::ActorContext;
use super::field_map::FieldMapper;
use super::merger::merge_statements;
use super::summary::AccessSummary;

/// Entry point tying the pipeline together:
/// roles -> flattened statements -> merged statements -> compiled rules.
///
/// Holds no per-actor state; concurrent resolutions for different actors are
/// independent.
#[derive(Debug, Clone)]
pub struct Authorizer<S> {
    store: S,
    mapper: FieldMapper,
}

impl<S: AccessStore> Authorizer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            mapper: FieldMapper::default(),
        }
    }

    pub fn with_config(store: S, config: &AuthzConfig) -> Self {
        Self {
            store,
            mapper: FieldMapper::new(config.strict_levels),
        }
    }

    pub fn strict_levels(mut self, strict: bool) -> Self {
        self.mapper = FieldMapper::new(strict);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Effective roles and the merged statements they produce.
    pub async fn merged_statements(&self, actor: &Actor) -> AuthzResult<(Vec<Role>, Vec<PolicyStatement>)> {
        let roles = effective_roles(&self.store, actor).await?;

        let mut statements = Vec::new();
        for role in &roles {
            statements.extend(self.mapper.map_role(role)?);
        }
        let flattened = statements.len();
        let merged = merge_statements(statements);

        tracing::debug!(
            actor_id = %actor.id,
            roles = roles.len(),
            flattened,
            merged = merged.len(),
            "merged actor statements"
        );
        Ok((roles, merged))
    }

    pub async fn resolve(&self, actor: &Actor) -> AuthzResult<CompiledPolicy> {
        let (_, merged) = self.merged_statements(actor).await?;
        Ok(compile(&merged, Some(ActorContext::from(actor))))
    }

    /// Resolves by actor id. An unknown actor gets an empty, deny-all policy.
    pub async fn resolve_by_id(&self, actor_id: Uuid) -> AuthzResult<CompiledPolicy> {
        match self.store.fetch_actor(actor_id).await? {
            Some(actor) => self.resolve(&actor).await,
            None => {
                tracing::debug!(actor_id = %actor_id, "no actor record; resolving to deny-all");
                Ok(CompiledPolicy::empty())
            }
        }
    }

    pub async fn summarize(&self, actor: &Actor) -> AuthzResult<AccessSummary> {
        let (roles, merged) = self.merged_statements(actor).await?;
        Ok(AccessSummary::build(&roles, &merged))
    }

    pub async fn summarize_by_id(&self, actor_id: Uuid) -> AuthzResult<AccessSummary> {
        match self.store.fetch_actor(actor_id).await? {
            Some(actor) => self.summarize(&actor).await,
            None => Ok(AccessSummary::empty()),
        }
    }
}
