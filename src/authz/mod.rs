//! Authorization module - permission-tree compiler and evaluator
//!
//! Pipeline for one actor:
//! - aggregate direct and group roles
//! - flatten each role's permission tree into `(path, level)` pairs
//! - map paths to policy statements
//! - merge overlapping statements, highest access level wins
//! - compile statements into allow/deny rules
//! - answer point queries with deny-overrides semantics

pub mod aggregator;
pub mod compiler;
pub mod context;
pub mod evaluator;
pub mod field_map;
pub mod flatten;
pub mod merger;
pub mod resolver;
pub mod summary;

pub use compiler::{CompiledPolicy, CompiledRule, Decision};
pub use context::{ActorContext, RuntimeContext};
pub use evaluator::{can, can_on, enforce, DefaultPolicyEvaluator, PolicyEvaluator};
pub use resolver::Authorizer;
pub use summary::{AccessSummary, PermissionSummary, RoleSummary};

/// Authorization enforcement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthzMode {
    /// No permission checks (development mode)
    #[default]
    Off,
    /// Log denials but allow requests (testing mode)
    Advisory,
    /// Reject denied requests (production mode)
    Strict,
}

impl AuthzMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "off" => Some(AuthzMode::Off),
            "advisory" => Some(AuthzMode::Advisory),
            "strict" => Some(AuthzMode::Strict),
            _ => None,
        }
    }
}
