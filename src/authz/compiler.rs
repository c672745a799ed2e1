//! Policy Compiler
//!
//! Expands merged statements into allow/deny rules. Conditions keep their
//! placeholders; they are resolved per query so one compiled policy can answer
//! for several request contexts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AccessLevel, Action, Conditions, PolicyStatement, Subject};

use super::context::ActorContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, Decision::Deny)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledRule {
    pub decision: Decision,
    pub actions: Vec<Action>,
    pub subject: Subject,
    #[serde(default, skip_serializing_if = "Conditions::is_empty")]
    pub conditions: Conditions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Tree path of the statement this rule came from.
    pub origin: String,
}

impl CompiledRule {
    fn new(decision: Decision, actions: Vec<Action>, statement: &PolicyStatement) -> Self {
        Self {
            decision,
            actions,
            subject: statement.subject.clone(),
            conditions: statement.conditions.clone(),
            fields: None,
            origin: statement.path.clone(),
        }
    }

    fn with_fields(mut self, fields: Option<Vec<String>>) -> Self {
        self.fields = fields;
        self
    }

    /// `manage` covers every action on the rule's subject.
    pub fn covers(&self, action: &Action) -> bool {
        self.actions
            .iter()
            .any(|a| matches!(a, Action::Manage) || a == action)
    }
}

/// Immutable rule set for one actor, built fresh per resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledPolicy {
    /// Actor snapshot used to fill placeholders when a query brings none.
    pub actor: Option<ActorContext>,
    pub rules: Vec<CompiledRule>,
    pub compiled_at: DateTime<Utc>,
}

impl CompiledPolicy {
    /// Policy without rules: every query is denied.
    pub fn empty() -> Self {
        Self {
            actor: None,
            rules: Vec::new(),
            compiled_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Auxiliary actions granted with `admin_access` on specific subjects.
fn admin_extras(subject: &Subject) -> &'static [Action] {
    match subject {
        Subject::Task => &[Action::Assign, Action::Escalate],
        Subject::Notification => &[Action::Notify],
        _ => &[],
    }
}

pub fn compile_statement(statement: &PolicyStatement) -> Vec<CompiledRule> {
    match statement.access_level {
        AccessLevel::NoAccess => {
            vec![CompiledRule::new(Decision::Deny, vec![statement.action.clone()], statement)]
        }
        AccessLevel::ViewAccess => vec![
            CompiledRule::new(Decision::Allow, vec![Action::Read], statement)
                .with_fields(statement.fields.clone()),
            CompiledRule::new(
                Decision::Deny,
                vec![Action::Create, Action::Update, Action::Delete],
                statement,
            ),
        ],
        AccessLevel::WriteAccess => {
            let mut actions = vec![Action::Read, Action::Create, Action::Update];
            if statement.subject == Subject::Document {
                actions.push(Action::Upload);
            }
            if !statement.action.is_crud() && !actions.contains(&statement.action) {
                actions.push(statement.action.clone());
            }
            vec![
                CompiledRule::new(Decision::Allow, actions, statement)
                    .with_fields(statement.fields.clone()),
                CompiledRule::new(Decision::Deny, vec![Action::Delete], statement),
            ]
        }
        AccessLevel::AdminAccess => {
            let mut rules = vec![CompiledRule::new(Decision::Allow, vec![Action::Manage], statement)
                .with_fields(statement.fields.clone())];
            let extras = admin_extras(&statement.subject);
            if !extras.is_empty() {
                rules.push(CompiledRule::new(Decision::Allow, extras.to_vec(), statement));
            }
            rules
        }
    }
}

pub fn compile(statements: &[PolicyStatement], actor: Option<ActorContext>) -> CompiledPolicy {
    let rules: Vec<CompiledRule> = statements.iter().flat_map(compile_statement).collect();
    tracing::debug!(
        statements = statements.len(),
        rules = rules.len(),
        "compiled policy"
    );
    CompiledPolicy {
        actor,
        rules,
        compiled_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConditionValue, Placeholder};
    use uuid::Uuid;

    fn stmt(subject: Subject, action: Action, level: AccessLevel) -> PolicyStatement {
        let mut conditions = Conditions::new();
        conditions.insert("owner".into(), ConditionValue::Placeholder(Placeholder::ActorId));
        PolicyStatement {
            subject,
            action,
            access_level: level,
            conditions,
            fields: Some(vec!["title".into()]),
            path: "p".into(),
            role_id: Uuid::new_v4(),
            role_name: "r".into(),
        }
    }

    #[test]
    fn test_no_access_denies_the_statement_action() {
        let rules = compile_statement(&stmt(Subject::Notification, Action::Notify, AccessLevel::NoAccess));
        assert_eq!(rules.len(), 1);
        assert!(rules[0].decision.is_deny());
        assert_eq!(rules[0].actions, vec![Action::Notify]);
    }

    #[test]
    fn test_view_access_allows_read_and_denies_writes() {
        let rules = compile_statement(&stmt(Subject::Document, Action::Read, AccessLevel::ViewAccess));
        assert_eq!(rules.len(), 2);
        assert!(rules[0].decision.is_allow());
        assert_eq!(rules[0].actions, vec![Action::Read]);
        assert_eq!(rules[0].fields, Some(vec!["title".to_string()]));
        assert!(rules[1].decision.is_deny());
        assert_eq!(rules[1].actions, vec![Action::Create, Action::Update, Action::Delete]);
        assert_eq!(rules[1].fields, None);
    }

    #[test]
    fn test_write_access_adds_upload_for_documents() {
        let rules = compile_statement(&stmt(Subject::Document, Action::Read, AccessLevel::WriteAccess));
        assert!(rules[0].covers(&Action::Upload));
        assert!(!rules[0].covers(&Action::Delete));
        assert_eq!(rules[1].actions, vec![Action::Delete]);
        assert!(rules[1].decision.is_deny());

        let rules = compile_statement(&stmt(Subject::Task, Action::Read, AccessLevel::WriteAccess));
        assert!(!rules[0].covers(&Action::Upload));
    }

    #[test]
    fn test_write_access_keeps_workflow_verb() {
        let rules = compile_statement(&stmt(Subject::Document, Action::Approve, AccessLevel::WriteAccess));
        assert!(rules[0].covers(&Action::Approve));
    }

    #[test]
    fn test_admin_access_manages_with_extras() {
        let rules = compile_statement(&stmt(Subject::Task, Action::Read, AccessLevel::AdminAccess));
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].actions, vec![Action::Manage]);
        assert_eq!(rules[1].actions, vec![Action::Assign, Action::Escalate]);

        let rules = compile_statement(&stmt(Subject::Document, Action::Read, AccessLevel::AdminAccess));
        assert_eq!(rules.len(), 1);
        assert!(rules[0].covers(&Action::Delete));
    }

    #[test]
    fn test_placeholders_survive_compilation() {
        let rules = compile_statement(&stmt(Subject::Task, Action::Read, AccessLevel::ViewAccess));
        assert!(rules.iter().all(|r| r.conditions["owner"]
            == ConditionValue::Placeholder(Placeholder::ActorId)));
    }
}
