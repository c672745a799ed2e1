//! Permission Merger
//!
//! Reconciles statements from different roles that share a [`MergeKey`]. The
//! higher access level wins; on a tie the first statement seen is kept. A user
//! picking up a weaker role through a group therefore never loses rights that a
//! stronger role already granted.

use std::collections::HashMap;

use crate::models::{MergeKey, PolicyStatement};

pub fn merge_statements(statements: impl IntoIterator<Item = PolicyStatement>) -> Vec<PolicyStatement> {
    let mut index: HashMap<MergeKey, usize> = HashMap::new();
    let mut merged: Vec<PolicyStatement> = Vec::new();

    for statement in statements {
        match index.get(&statement.merge_key()) {
            Some(&slot) => {
                if statement.access_level > merged[slot].access_level {
                    tracing::debug!(
                        key = %statement.merge_key(),
                        from = %merged[slot].access_level,
                        to = %statement.access_level,
                        role = %statement.role_name,
                        "statement overridden by higher access level"
                    );
                    merged[slot] = statement;
                }
            }
            None => {
                index.insert(statement.merge_key(), merged.len());
                merged.push(statement);
            }
        }
    }

    merged
}
