pub mod access_level;
pub mod permission_tree;
pub mod rbac;
pub mod statement;
pub mod subject;

pub use access_level::AccessLevel;
pub use permission_tree::{LeafValue, PermissionNode};
pub use rbac::{Actor, Group, Role};
pub use statement::{ConditionValue, Conditions, MergeKey, Placeholder, PolicyStatement};
pub use subject::{Action, Attributes, Authorizable, Subject};
