use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::errors::AuthzError;
use crate::models::{Actor, Group, PermissionNode, Role};

fn parse_uuid(s: &str) -> Result<Uuid, AuthzError> {
    Uuid::parse_str(s.trim()).map_err(|e| AuthzError::internal(format!("invalid uuid `{}`: {}", s, e)))
}

fn get_string(row: &SqliteRow, column: &str) -> Result<String, AuthzError> {
    row.try_get(column)
        .map_err(|e| AuthzError::internal(format!("missing {}: {}", column, e)))
}

fn parse_tree(id: Uuid, raw: &str) -> Result<PermissionNode, AuthzError> {
    if raw.trim().is_empty() {
        return Ok(PermissionNode::empty());
    }
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AuthzError::invalid_record(id, format!("permission_tree is not valid JSON: {}", e)))?;
    Ok(PermissionNode::from(value))
}

/// Parses the `id` column of a link-table row (`user_id`, `role_id`, ...).
pub fn uuid_from_row(row: &SqliteRow, column: &str) -> Result<Uuid, AuthzError> {
    parse_uuid(&get_string(row, column)?)
}

/// Role columns only; link ids are filled in by the store.
pub fn role_from_row(row: &SqliteRow) -> Result<Role, AuthzError> {
    let id = parse_uuid(&get_string(row, "id")?)?;
    let domain = get_string(row, "domain")?;
    let department = get_string(row, "department")?;
    let role_name = get_string(row, "role_name")?;
    let tree_s = get_string(row, "permission_tree")?;

    let permission_tree = parse_tree(id, &tree_s)?;

    Ok(Role { id, domain, department, role_name, permission_tree, user_ids: Vec::new(), group_ids: Vec::new() })
}

pub fn group_from_row(row: &SqliteRow) -> Result<Group, AuthzError> {
    let id = parse_uuid(&get_string(row, "id")?)?;
    Ok(Group { id, role_ids: Vec::new(), user_ids: Vec::new() })
}

pub fn actor_from_row(row: &SqliteRow) -> Result<Actor, AuthzError> {
    let id = parse_uuid(&get_string(row, "id")?)?;
    let email = get_string(row, "email")?;
    let domain = get_string(row, "domain")?;
    let department = get_string(row, "department")?;

    Ok(Actor { id, email, domain, department, role_ids: Vec::new(), group_ids: Vec::new() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree_accepts_empty_text() {
        assert_eq!(parse_tree(Uuid::new_v4(), "  ").unwrap(), PermissionNode::empty());
    }

    #[test]
    fn test_parse_tree_rejects_bad_json() {
        let id = Uuid::new_v4();
        let err = parse_tree(id, "{not json").unwrap_err();
        assert!(matches!(err, AuthzError::InvalidRecord { id: bad, .. } if bad == id));
    }

    #[test]
    fn test_parse_uuid_trims() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&format!(" {} ", id)).unwrap(), id);
        assert!(parse_uuid("nope").is_err());
    }
}
