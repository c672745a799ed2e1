use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of resource a rule applies to.
///
/// Entities declare their kind explicitly through [`Authorizable`]; nothing is
/// derived from Rust type names at runtime.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Subject {
    /// Wildcard matching every subject.
    All,
    Document,
    Task,
    User,
    Notification,
    Role,
    Group,
    Review,
    AuditLog,
    Other(String),
}

impl Subject {
    pub fn as_str(&self) -> &str {
        match self {
            Subject::All => "all",
            Subject::Document => "Document",
            Subject::Task => "Task",
            Subject::User => "User",
            Subject::Notification => "Notification",
            Subject::Role => "Role",
            Subject::Group => "Group",
            Subject::Review => "Review",
            Subject::AuditLog => "AuditLog",
            Subject::Other(name) => name,
        }
    }

    pub fn matches(&self, requested: &Subject) -> bool {
        matches!(self, Subject::All) || self == requested
    }
}

impl From<&str> for Subject {
    fn from(name: &str) -> Self {
        match name {
            "all" => Subject::All,
            "Document" => Subject::Document,
            "Task" => Subject::Task,
            "User" => Subject::User,
            "Notification" => Subject::Notification,
            "Role" => Subject::Role,
            "Group" => Subject::Group,
            "Review" => Subject::Review,
            "AuditLog" => Subject::AuditLog,
            other => Subject::Other(other.to_string()),
        }
    }
}

impl From<String> for Subject {
    fn from(name: String) -> Self {
        Subject::from(name.as_str())
    }
}

impl From<Subject> for String {
    fn from(subject: Subject) -> Self {
        subject.as_str().to_string()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verb requested against a subject. `Manage` stands for every action.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Manage,
    Read,
    Create,
    Update,
    Delete,
    Upload,
    Notify,
    Approve,
    Reject,
    Assign,
    Escalate,
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Manage => "manage",
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Upload => "upload",
            Action::Notify => "notify",
            Action::Approve => "approve",
            Action::Reject => "reject",
            Action::Assign => "assign",
            Action::Escalate => "escalate",
            Action::Other(name) => name,
        }
    }

    /// Plain CRUD verbs plus `manage`; everything else is a workflow verb.
    pub fn is_crud(&self) -> bool {
        matches!(
            self,
            Action::Manage | Action::Read | Action::Create | Action::Update | Action::Delete
        )
    }
}

impl From<&str> for Action {
    fn from(name: &str) -> Self {
        match name {
            "manage" => Action::Manage,
            "read" => Action::Read,
            "create" => Action::Create,
            "update" => Action::Update,
            "delete" => Action::Delete,
            "upload" => Action::Upload,
            "notify" => Action::Notify,
            "approve" => Action::Approve,
            "reject" => Action::Reject,
            "assign" => Action::Assign,
            "escalate" => Action::Escalate,
            other => Action::Other(other.to_string()),
        }
    }
}

impl From<String> for Action {
    fn from(name: String) -> Self {
        Action::from(name.as_str())
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.as_str().to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute bag describing one concrete resource.
pub type Attributes = BTreeMap<String, Value>;

/// Domain entities that can be the target of an authorization query.
pub trait Authorizable {
    fn subject(&self) -> Subject;

    /// Attributes matched against rule conditions (e.g. `status`, `assignedTo`).
    fn attributes(&self) -> Attributes {
        Attributes::new()
    }
}
