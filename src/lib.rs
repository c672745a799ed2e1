pub mod authz;
pub mod config;
pub mod db;
pub mod errors;
pub mod fixtures;
pub mod models;
pub mod store;

// Re-export commonly used items for tests and the CLI
pub use authz::{can, can_on, enforce, Authorizer, AuthzMode, CompiledPolicy, RuntimeContext};
pub use config::AuthzConfig;
pub use errors::{AuthzError, AuthzResult};
pub use store::{AccessStore, InMemoryStore};
