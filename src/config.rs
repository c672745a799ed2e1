use crate::authz::AuthzMode;
use crate::errors::{AuthzError, AuthzResult};

/// Runtime configuration read from the environment (optionally via `.env`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthzConfig {
    /// `AUTHZ_MODE`: off | advisory | strict
    pub mode: AuthzMode,
    /// `AUTHZ_STRICT_LEVELS`: fail resolution on leaves that are not access levels
    pub strict_levels: bool,
    /// `DATABASE_URL`: SQLite store backing role/group/user lookups
    pub database_url: Option<String>,
}

impl AuthzConfig {
    pub fn from_env() -> AuthzResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AuthzResult<Self> {
        let mode = match lookup("AUTHZ_MODE") {
            Some(raw) => AuthzMode::parse(&raw).ok_or_else(|| {
                AuthzError::configuration(format!("AUTHZ_MODE must be off, advisory or strict, got `{}`", raw))
            })?,
            None => AuthzMode::Off,
        };

        let strict_levels = match lookup("AUTHZ_STRICT_LEVELS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                AuthzError::configuration(format!("AUTHZ_STRICT_LEVELS must be a boolean, got `{}`", raw))
            })?,
            None => false,
        };

        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());

        Ok(Self {
            mode,
            strict_levels,
            database_url,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Loads `.env` from the working directory, falling back to the crate-local file.
pub fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> AuthzResult<AuthzConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AuthzConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, AuthzConfig::default());
    }

    #[test]
    fn test_values_are_parsed() {
        let cfg = config(&[
            ("AUTHZ_MODE", "strict"),
            ("AUTHZ_STRICT_LEVELS", "yes"),
            ("DATABASE_URL", "sqlite://authz.db"),
        ])
        .unwrap();
        assert_eq!(cfg.mode, AuthzMode::Strict);
        assert!(cfg.strict_levels);
        assert_eq!(cfg.database_url.as_deref(), Some("sqlite://authz.db"));
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        assert!(matches!(
            config(&[("AUTHZ_MODE", "lax")]),
            Err(AuthzError::Configuration(_))
        ));
        assert!(matches!(
            config(&[("AUTHZ_STRICT_LEVELS", "maybe")]),
            Err(AuthzError::Configuration(_))
        ));
    }
}
