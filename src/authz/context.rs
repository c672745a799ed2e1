use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{Actor, Attributes, Authorizable, Placeholder};

/// Actor attributes available to condition placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub id: Option<Uuid>,
    pub email: Option<String>,
    pub domain: Option<String>,
    pub department: Option<String>,
}

impl ActorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_org(mut self, domain: impl Into<String>, department: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self.department = Some(department.into());
        self
    }

    pub fn resolve(&self, placeholder: Placeholder) -> Option<Value> {
        match placeholder {
            Placeholder::ActorId => self.id.map(|id| Value::String(id.to_string())),
            Placeholder::ActorEmail => self.email.clone().map(Value::String),
            Placeholder::ActorDomain => self.domain.clone().map(Value::String),
            Placeholder::ActorDepartment => self.department.clone().map(Value::String),
        }
    }

    /// Organization keys fall back to the actor when the resource does not
    /// carry them. Identity keys (`id`, `email`) never do.
    fn attribute(&self, key: &str) -> Option<Value> {
        match key {
            "domain" => self.resolve(Placeholder::ActorDomain),
            "department" => self.resolve(Placeholder::ActorDepartment),
            _ => None,
        }
    }
}

impl From<&Actor> for ActorContext {
    fn from(actor: &Actor) -> Self {
        Self {
            id: Some(actor.id),
            email: Some(actor.email.clone()),
            domain: Some(actor.domain.clone()),
            department: Some(actor.department.clone()),
        }
    }
}

/// Per-query context: resource attributes, an optional field and, optionally,
/// an actor overriding the one captured when the policy was compiled.
#[derive(Debug, Clone, Default)]
pub struct RuntimeContext {
    pub actor: Option<ActorContext>,
    pub attributes: Attributes,
    pub field: Option<String>,
}

impl RuntimeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_resource(resource: &impl Authorizable) -> Self {
        Self {
            attributes: resource.attributes(),
            ..Self::default()
        }
    }

    pub fn with_actor(mut self, actor: ActorContext) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Resource attributes first, then the actor's domain and department.
    pub fn lookup(&self, key: &str, actor: Option<&ActorContext>) -> Option<Value> {
        self.attributes
            .get(key)
            .cloned()
            .or_else(|| actor.and_then(|a| a.attribute(key)))
    }
}
