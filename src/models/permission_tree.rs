use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::access_level::AccessLevel;

pub const PERMISSION_KEY: &str = "permission";
pub const ACTIONS_KEY: &str = "actions";

/// Value found at a leaf position of a permission tree.
///
/// Trees come from administrators, so a leaf may hold something that is not an
/// access level at all. It is kept verbatim and rejected later, when the
/// statement for that path is built.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
    Level(AccessLevel),
    Unrecognized(Value),
}

impl LeafValue {
    pub fn parse(value: &Value) -> Self {
        match value.as_str().and_then(|s| s.parse::<AccessLevel>().ok()) {
            Some(level) => LeafValue::Level(level),
            None => LeafValue::Unrecognized(value.clone()),
        }
    }

    pub fn level(&self) -> Option<AccessLevel> {
        match self {
            LeafValue::Level(level) => Some(*level),
            LeafValue::Unrecognized(_) => None,
        }
    }

    /// Text used when reporting an unrecognized leaf.
    pub fn raw_text(&self) -> String {
        match self {
            LeafValue::Level(level) => level.as_str().to_string(),
            LeafValue::Unrecognized(Value::String(s)) => s.clone(),
            LeafValue::Unrecognized(other) => other.to_string(),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            LeafValue::Level(level) => Value::String(level.as_str().to_string()),
            LeafValue::Unrecognized(raw) => raw.clone(),
        }
    }
}

impl From<AccessLevel> for LeafValue {
    fn from(level: AccessLevel) -> Self {
        LeafValue::Level(level)
    }
}

/// One position in a role's permission tree.
///
/// The stored form is schema-free JSON; this enum is the closed reading of it:
/// - a bare access level,
/// - an object carrying `permission` (plus optional `actions` and arbitrary siblings),
/// - a plain grouping object,
/// - an array of nodes addressed by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum PermissionNode {
    Leaf(LeafValue),
    Node {
        permission: LeafValue,
        actions: Option<BTreeMap<String, PermissionNode>>,
        children: BTreeMap<String, PermissionNode>,
    },
    Group(BTreeMap<String, PermissionNode>),
    List(Vec<PermissionNode>),
}

impl PermissionNode {
    pub fn empty() -> Self {
        PermissionNode::Group(BTreeMap::new())
    }

    pub fn group<K: Into<String>>(entries: impl IntoIterator<Item = (K, PermissionNode)>) -> Self {
        PermissionNode::Group(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn leaf(level: AccessLevel) -> Self {
        PermissionNode::Leaf(LeafValue::Level(level))
    }

    /// Number of leaf values in the tree, counting each `permission` slot once.
    pub fn leaf_count(&self) -> usize {
        match self {
            PermissionNode::Leaf(_) => 1,
            PermissionNode::Node {
                actions, children, ..
            } => {
                1 + actions
                    .iter()
                    .flat_map(|a| a.values())
                    .chain(children.values())
                    .map(PermissionNode::leaf_count)
                    .sum::<usize>()
            }
            PermissionNode::Group(map) => map.values().map(PermissionNode::leaf_count).sum(),
            PermissionNode::List(items) => items.iter().map(PermissionNode::leaf_count).sum(),
        }
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let permission = map
            .get(PERMISSION_KEY)
            .filter(|v| !v.is_object() && !v.is_array());

        let Some(permission) = permission else {
            return PermissionNode::Group(
                map.iter()
                    .map(|(k, v)| (k.clone(), PermissionNode::from(v.clone())))
                    .collect(),
            );
        };

        let mut actions = None;
        let mut children = BTreeMap::new();
        for (key, value) in map {
            match key.as_str() {
                PERMISSION_KEY => {}
                ACTIONS_KEY => match value {
                    Value::Object(inner) => {
                        actions = Some(
                            inner
                                .iter()
                                .map(|(k, v)| (k.clone(), PermissionNode::from(v.clone())))
                                .collect(),
                        );
                    }
                    // Non-map `actions` still lives under the same path prefix.
                    other => {
                        children.insert(key.clone(), PermissionNode::from(other.clone()));
                    }
                },
                _ => {
                    children.insert(key.clone(), PermissionNode::from(value.clone()));
                }
            }
        }

        PermissionNode::Node {
            permission: LeafValue::parse(permission),
            actions,
            children,
        }
    }
}

impl Default for PermissionNode {
    fn default() -> Self {
        PermissionNode::empty()
    }
}

impl From<AccessLevel> for PermissionNode {
    fn from(level: AccessLevel) -> Self {
        PermissionNode::leaf(level)
    }
}

impl From<Value> for PermissionNode {
    fn from(value: Value) -> Self {
        match &value {
            Value::Object(map) => PermissionNode::from_object(map),
            Value::Array(items) => {
                PermissionNode::List(items.iter().cloned().map(PermissionNode::from).collect())
            }
            scalar => PermissionNode::Leaf(LeafValue::parse(scalar)),
        }
    }
}

fn map_to_value(map: BTreeMap<String, PermissionNode>) -> Map<String, Value> {
    map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

impl From<PermissionNode> for Value {
    fn from(node: PermissionNode) -> Self {
        match node {
            PermissionNode::Leaf(leaf) => leaf.to_value(),
            PermissionNode::Node {
                permission,
                actions,
                children,
            } => {
                let mut map = map_to_value(children);
                map.insert(PERMISSION_KEY.to_string(), permission.to_value());
                if let Some(actions) = actions {
                    map.insert(ACTIONS_KEY.to_string(), Value::Object(map_to_value(actions)));
                }
                Value::Object(map)
            }
            PermissionNode::Group(map) => Value::Object(map_to_value(map)),
            PermissionNode::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
        }
    }
}
