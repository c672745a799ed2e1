use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::access_level::AccessLevel;
use super::subject::{Action, Subject};

/// Actor attribute referenced from a condition and filled in at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    ActorId,
    ActorEmail,
    ActorDomain,
    ActorDepartment,
}

impl Placeholder {
    pub const ALL: [Placeholder; 4] = [
        Placeholder::ActorId,
        Placeholder::ActorEmail,
        Placeholder::ActorDomain,
        Placeholder::ActorDepartment,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::ActorId => "${user.id}",
            Placeholder::ActorEmail => "${user.email}",
            Placeholder::ActorDomain => "${user.domain}",
            Placeholder::ActorDepartment => "${user.department}",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.token() == token)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Right-hand side of a condition entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ConditionValue {
    Literal(Value),
    Placeholder(Placeholder),
}

impl ConditionValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        ConditionValue::Literal(value.into())
    }

    /// Display form; placeholders render as their `${...}` token.
    pub fn to_value(&self) -> Value {
        match self {
            ConditionValue::Literal(v) => v.clone(),
            ConditionValue::Placeholder(p) => Value::String(p.token().to_string()),
        }
    }
}

impl From<Value> for ConditionValue {
    fn from(value: Value) -> Self {
        match value.as_str().and_then(Placeholder::from_token) {
            Some(placeholder) => ConditionValue::Placeholder(placeholder),
            None => ConditionValue::Literal(value),
        }
    }
}

impl From<ConditionValue> for Value {
    fn from(value: ConditionValue) -> Self {
        value.to_value()
    }
}

impl From<Placeholder> for ConditionValue {
    fn from(placeholder: Placeholder) -> Self {
        ConditionValue::Placeholder(placeholder)
    }
}

pub type Conditions = BTreeMap<String, ConditionValue>;

/// Canonical JSON text for a condition map. Keys are ordered, so equal maps
/// always serialize identically.
pub fn conditions_to_json(conditions: &Conditions) -> Value {
    Value::Object(
        conditions
            .iter()
            .map(|(k, v)| (k.clone(), v.to_value()))
            .collect::<Map<String, Value>>(),
    )
}

/// One flattened grant derived from one path of one role's tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyStatement {
    pub subject: Subject,
    pub action: Action,
    pub access_level: AccessLevel,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conditions: Conditions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Tree path the statement was produced from.
    pub path: String,
    pub role_id: Uuid,
    pub role_name: String,
}

impl PolicyStatement {
    pub fn merge_key(&self) -> MergeKey {
        MergeKey::new(&self.subject, &self.action, &self.conditions)
    }
}

/// Identity under which statements from different roles are reconciled:
/// subject, action and the canonical serialization of the conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MergeKey(String);

impl MergeKey {
    pub fn new(subject: &Subject, action: &Action, conditions: &Conditions) -> Self {
        MergeKey(format!(
            "{}|{}|{}",
            subject,
            action,
            conditions_to_json(conditions)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MergeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
