use crate::errors::{AuthzError, AuthzResult};
use crate::models::{Action, Authorizable, ConditionValue, Placeholder, Subject};

use super::compiler::{CompiledPolicy, CompiledRule};
use super::context::{ActorContext, RuntimeContext};
use super::AuthzMode;

/// Policy evaluator trait for pluggable authorization logic
pub trait PolicyEvaluator: Send + Sync {
    /// Check if the compiled policy permits `action` on `subject` in `ctx`
    fn can(&self, policy: &CompiledPolicy, action: &Action, subject: &Subject, ctx: &RuntimeContext) -> bool;
}

/// Default evaluator with deny-overrides semantics
///
/// Evaluation order:
/// 1. keep rules whose subject and action cover the request
/// 2. drop rules whose fields or conditions do not match the context
/// 3. any remaining deny -> deny
/// 4. any remaining allow -> allow
/// 5. deny
#[derive(Debug, Clone, Default)]
pub struct DefaultPolicyEvaluator;

enum ConditionMatch {
    Matched,
    Mismatched,
    Unresolved(Placeholder),
}

impl DefaultPolicyEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// An allow rule restricted to fields still answers a field-less query;
    /// a deny rule restricted to fields only blocks those fields.
    fn field_matches(rule: &CompiledRule, field: Option<&str>) -> bool {
        match (&rule.fields, field) {
            (None, _) => true,
            (Some(_), None) => rule.decision.is_allow(),
            (Some(fields), Some(field)) => fields.iter().any(|f| f == field),
        }
    }

    fn conditions_match(
        rule: &CompiledRule,
        ctx: &RuntimeContext,
        actor: Option<&ActorContext>,
    ) -> ConditionMatch {
        for (key, expected) in &rule.conditions {
            let expected = match expected {
                ConditionValue::Literal(value) => value.clone(),
                ConditionValue::Placeholder(placeholder) => {
                    match actor.and_then(|a| a.resolve(*placeholder)) {
                        Some(value) => value,
                        None => return ConditionMatch::Unresolved(*placeholder),
                    }
                }
            };

            match ctx.lookup(key, actor) {
                Some(actual) if actual == expected => {}
                _ => return ConditionMatch::Mismatched,
            }
        }
        ConditionMatch::Matched
    }
}

impl PolicyEvaluator for DefaultPolicyEvaluator {
    fn can(&self, policy: &CompiledPolicy, action: &Action, subject: &Subject, ctx: &RuntimeContext) -> bool {
        let actor = ctx.actor.as_ref().or(policy.actor.as_ref());
        let actor_id = actor.and_then(|a| a.id);
        let mut allowed = false;

        for rule in &policy.rules {
            if !rule.subject.matches(subject) || !rule.covers(action) {
                continue;
            }
            if !Self::field_matches(rule, ctx.field.as_deref()) {
                continue;
            }

            match Self::conditions_match(rule, ctx, actor) {
                ConditionMatch::Matched => {}
                ConditionMatch::Mismatched => continue,
                ConditionMatch::Unresolved(placeholder) => {
                    tracing::warn!(
                        actor_id = ?actor_id,
                        origin = %rule.origin,
                        placeholder = %placeholder,
                        "unresolved condition placeholder; rule skipped"
                    );
                    continue;
                }
            }

            if rule.decision.is_deny() {
                tracing::debug!(
                    actor_id = ?actor_id,
                    action = %action,
                    subject = %subject,
                    origin = %rule.origin,
                    "explicit deny"
                );
                return false;
            }
            allowed = true;
        }

        tracing::debug!(
            actor_id = ?actor_id,
            action = %action,
            subject = %subject,
            allowed,
            "permission evaluated"
        );
        allowed
    }
}

/// Point query with the default evaluator.
pub fn can(
    policy: &CompiledPolicy,
    action: impl Into<Action>,
    subject: impl Into<Subject>,
    ctx: &RuntimeContext,
) -> bool {
    DefaultPolicyEvaluator.can(policy, &action.into(), &subject.into(), ctx)
}

/// Point query against a concrete entity; its subject tag and attributes are used.
pub fn can_on(policy: &CompiledPolicy, action: impl Into<Action>, resource: &impl Authorizable) -> bool {
    let ctx = RuntimeContext::for_resource(resource);
    DefaultPolicyEvaluator.can(policy, &action.into(), &resource.subject(), &ctx)
}

/// Request-handler guard honoring the configured enforcement mode.
pub fn enforce(
    policy: &CompiledPolicy,
    mode: AuthzMode,
    action: impl Into<Action>,
    subject: impl Into<Subject>,
    ctx: &RuntimeContext,
) -> AuthzResult<()> {
    if mode == AuthzMode::Off {
        return Ok(());
    }

    let action = action.into();
    let subject = subject.into();
    if DefaultPolicyEvaluator.can(policy, &action, &subject, ctx) {
        return Ok(());
    }

    match mode {
        AuthzMode::Advisory => {
            tracing::warn!(
                actor_id = ?policy.actor.as_ref().and_then(|a| a.id),
                action = %action,
                subject = %subject,
                "advisory mode: request would be denied"
            );
            Ok(())
        }
        _ => Err(AuthzError::forbidden(&action, &subject)),
    }
}
