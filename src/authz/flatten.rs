//! Tree Flattener
//!
//! Walks a permission tree depth-first and yields one `(path, leaf)` pair per
//! leaf value. The walk is lazy and driven by an explicit stack, so arbitrarily
//! deep trees never grow the call stack.
//!
//! Path rules:
//! - bare level under key `k`              -> `prefix.k`
//! - `permission` node under key `k`       -> `prefix.k.permission`, then
//!   `prefix.k.actions.*` for its actions and `prefix.k.*` for its other children
//! - array element `i` under key `k`       -> `prefix.k.i.*`

use crate::models::permission_tree::{ACTIONS_KEY, PERMISSION_KEY};
use crate::models::{LeafValue, PermissionNode};

/// One leaf reached by the flattener.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatGrant<'a> {
    pub path: String,
    pub value: &'a LeafValue,
}

/// Lazy depth-first iterator over the leaves of a tree.
///
/// Cloning the iterator (or calling [`flatten`] again) restarts the walk.
#[derive(Debug, Clone)]
pub struct Flatten<'a> {
    stack: Vec<(String, &'a PermissionNode)>,
}

pub fn flatten(tree: &PermissionNode) -> Flatten<'_> {
    flatten_with_prefix(tree, "")
}

pub fn flatten_with_prefix<'a>(tree: &'a PermissionNode, prefix: &str) -> Flatten<'a> {
    Flatten {
        stack: vec![(prefix.to_string(), tree)],
    }
}

pub(crate) fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

impl<'a> Flatten<'a> {
    fn push_map(
        &mut self,
        prefix: &str,
        entries: impl DoubleEndedIterator<Item = (&'a String, &'a PermissionNode)>,
    ) {
        // Reversed so the smallest key is popped first.
        for (key, child) in entries.rev() {
            self.stack.push((join_path(prefix, key), child));
        }
    }
}

impl<'a> Iterator for Flatten<'a> {
    type Item = FlatGrant<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((path, node)) = self.stack.pop() {
            match node {
                PermissionNode::Leaf(value) => return Some(FlatGrant { path, value }),
                PermissionNode::Node {
                    permission,
                    actions,
                    children,
                } => {
                    self.push_map(&path, children.iter());
                    if let Some(actions) = actions {
                        let actions_prefix = join_path(&path, ACTIONS_KEY);
                        self.push_map(&actions_prefix, actions.iter());
                    }
                    return Some(FlatGrant {
                        path: join_path(&path, PERMISSION_KEY),
                        value: permission,
                    });
                }
                PermissionNode::Group(map) => self.push_map(&path, map.iter()),
                PermissionNode::List(items) => {
                    for (index, child) in items.iter().enumerate().rev() {
                        self.stack.push((join_path(&path, &index.to_string()), child));
                    }
                }
            }
        }
        None
    }
}
