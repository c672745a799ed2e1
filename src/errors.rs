use uuid::Uuid;

pub type AuthzResult<T> = Result<T, AuthzError>;

#[derive(thiserror::Error, Debug)]
pub enum AuthzError {
    #[error("unknown access level `{value}` at `{path}`")]
    UnknownAccessLevel { path: String, value: String },
    #[error("forbidden: {action} on {subject}")]
    Forbidden { action: String, subject: String },
    #[error("store error: {0}")]
    Store(String),
    #[error("invalid record {id}: {message}")]
    InvalidRecord { id: Uuid, message: String },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("fixture error: {0}")]
    Fixture(String),
    #[error("database error")]
    Database(#[from] sqlx::Error),
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("serialization error")]
    Serialization(#[from] serde_json::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthzError {
    pub fn unknown_access_level(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnknownAccessLevel {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn forbidden(action: impl ToString, subject: impl ToString) -> Self {
        Self::Forbidden {
            action: action.to_string(),
            subject: subject.to_string(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    pub fn invalid_record(id: Uuid, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            id,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn fixture(message: impl Into<String>) -> Self {
        Self::Fixture(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Denials are expected outcomes; everything else is a defect or an outage.
    pub fn is_denial(&self) -> bool {
        matches!(self, AuthzError::Forbidden { .. })
    }
}
