//! Field Mapper
//!
//! Turns a flattened `(path, level)` pair into a [`PolicyStatement`]. Known paths
//! come from [`FIELD_TABLE`]; anything else is inferred from the words in the path.

use serde_json::Value;

use crate::errors::{AuthzError, AuthzResult};
use crate::models::permission_tree::{ACTIONS_KEY, PERMISSION_KEY};
use crate::models::{
    Action, ConditionValue, Conditions, LeafValue, Placeholder, PolicyStatement, Role, Subject,
};

use super::flatten::flatten;

/// Condition value as it can be written in a `static` table.
#[derive(Debug, Clone, Copy)]
pub enum TableValue {
    Str(&'static str),
    Bool(bool),
    Actor(Placeholder),
}

impl TableValue {
    fn to_condition(self) -> ConditionValue {
        match self {
            TableValue::Str(s) => ConditionValue::Literal(Value::String(s.to_string())),
            TableValue::Bool(b) => ConditionValue::Literal(Value::Bool(b)),
            TableValue::Actor(p) => ConditionValue::Placeholder(p),
        }
    }
}

#[derive(Debug)]
pub struct FieldEntry {
    pub path: &'static str,
    pub subject: &'static str,
    pub action: &'static str,
    pub conditions: &'static [(&'static str, TableValue)],
    pub fields: &'static [&'static str],
}

macro_rules! entry {
    ($path:literal => $subject:literal, $action:literal) => {
        entry!($path => $subject, $action, [], [])
    };
    ($path:literal => $subject:literal, $action:literal, [$($k:literal: $v:expr),* $(,)?]) => {
        entry!($path => $subject, $action, [$($k: $v),*], [])
    };
    ($path:literal => $subject:literal, $action:literal, [$($k:literal: $v:expr),* $(,)?], [$($f:literal),* $(,)?]) => {
        FieldEntry {
            path: $path,
            subject: $subject,
            action: $action,
            conditions: &[$(($k, $v)),*],
            fields: &[$($f),*],
        }
    };
}

use TableValue::{Actor, Bool, Str};

pub static FIELD_TABLE: &[FieldEntry] = &[
    // Document repository
    entry!("documentRepoAccess.approved" => "Document", "read", ["status": Str("approved")]),
    entry!("documentRepoAccess.pending" => "Document", "read", ["status": Str("pending")]),
    entry!("documentRepoAccess.rejected" => "Document", "read", ["status": Str("rejected")]),
    entry!("documentRepoAccess.draft" => "Document", "read",
        ["status": Str("draft"), "uploadedBy": Actor(Placeholder::ActorId)]),
    entry!("documentRepoAccess.upload" => "Document", "upload"),
    // Review workflow
    entry!("reviewWorkflow.permission" => "Review", "read"),
    entry!("reviewWorkflow.actions.approve" => "Document", "approve", ["status": Str("pending")]),
    entry!("reviewWorkflow.actions.reject" => "Document", "reject", ["status": Str("pending")]),
    entry!("reviewWorkflow.actions.comment" => "Review", "update", [], ["comments"]),
    // Tasks
    entry!("taskAccess.assigned" => "Task", "read", ["assignedTo": Actor(Placeholder::ActorId)]),
    entry!("taskAccess.all" => "Task", "read"),
    entry!("escalatedTasksAccess.view" => "Task", "read", ["escalated": Bool(true)]),
    entry!("escalatedTasksAccess.reassign" => "Task", "assign", ["escalated": Bool(true)]),
    entry!("escalatedTasksAccess.notify" => "Notification", "notify"),
    // Administration
    entry!("userManagement.users" => "User", "read"),
    entry!("userManagement.profile" => "User", "read",
        ["id": Actor(Placeholder::ActorId)], ["name", "email", "avatar"]),
    entry!("userManagement.roles" => "Role", "read"),
    entry!("userManagement.groups" => "Group", "read"),
    entry!("auditLogAccess" => "AuditLog", "read"),
];

/// Table entry for `path`. Array indices are ignored, so `taskAccess.0.assigned`
/// resolves like `taskAccess.assigned`.
pub fn lookup(path: &str) -> Option<&'static FieldEntry> {
    FIELD_TABLE
        .iter()
        .find(|e| e.path == path)
        .or_else(|| {
            let without_indices = path
                .split('.')
                .filter(|s| !is_index(s))
                .collect::<Vec<_>>()
                .join(".");
            FIELD_TABLE.iter().find(|e| e.path == without_indices)
        })
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}

static SUBJECT_KEYWORDS: &[(&str, Subject)] = &[
    ("document", Subject::Document),
    ("notification", Subject::Notification),
    ("task", Subject::Task),
    ("user", Subject::User),
    ("role", Subject::Role),
    ("group", Subject::Group),
    ("review", Subject::Review),
    ("audit", Subject::AuditLog),
];

static ACTION_KEYWORDS: &[(&str, Action)] = &[
    ("manage", Action::Manage),
    ("create", Action::Create),
    ("update", Action::Update),
    ("delete", Action::Delete),
    ("upload", Action::Upload),
    ("notify", Action::Notify),
];

/// Path segments that carry meaning, tail first. Array indices and the
/// structural `permission`/`actions` keys are skipped.
fn meaningful_segments(path: &str) -> impl Iterator<Item = &str> {
    path.rsplit('.').filter(|s| {
        !s.is_empty()
            && *s != PERMISSION_KEY
            && *s != ACTIONS_KEY
            && !is_index(s)
    })
}

pub fn infer_subject(path: &str) -> Subject {
    for segment in meaningful_segments(path) {
        let lower = segment.to_ascii_lowercase();
        if let Some((_, subject)) = SUBJECT_KEYWORDS.iter().find(|(kw, _)| lower.contains(kw)) {
            return subject.clone();
        }
    }

    match meaningful_segments(path).next() {
        Some(tail) => Subject::from(capitalize(tail)),
        None => Subject::Other("Unknown".to_string()),
    }
}

/// Verbs only count as whole words, so `userManagement` does not read as `manage`.
pub fn infer_action(path: &str) -> Action {
    meaningful_segments(path)
        .find_map(|segment| {
            words(segment).into_iter().find_map(|word| {
                ACTION_KEYWORDS
                    .iter()
                    .find(|(kw, _)| *kw == word)
                    .map(|(_, action)| action.clone())
            })
        })
        .unwrap_or(Action::Read)
}

/// Lowercased camelCase / snake_case words of one segment.
fn words(segment: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for c in segment.chars() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Maps flattened grants of one role into statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMapper {
    /// Fail on leaves that are not access levels instead of dropping them.
    pub strict_levels: bool,
}

impl FieldMapper {
    pub fn new(strict_levels: bool) -> Self {
        Self { strict_levels }
    }

    /// `Ok(None)` means the leaf was not an access level and the grant was dropped.
    pub fn map(&self, role: &Role, path: &str, value: &LeafValue) -> AuthzResult<Option<PolicyStatement>> {
        let Some(access_level) = value.level() else {
            if self.strict_levels {
                return Err(AuthzError::unknown_access_level(path, value.raw_text()));
            }
            tracing::warn!(
                role_id = %role.id,
                role = %role.role_name,
                path = %path,
                value = %value.raw_text(),
                "dropping grant with unrecognized access level"
            );
            return Ok(None);
        };

        let (subject, action, mut conditions, fields) = match lookup(path) {
            Some(entry) => (
                Subject::from(entry.subject),
                Action::from(entry.action),
                entry
                    .conditions
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_condition()))
                    .collect::<Conditions>(),
                (!entry.fields.is_empty())
                    .then(|| entry.fields.iter().map(|f| f.to_string()).collect::<Vec<String>>()),
            ),
            None => (infer_subject(path), infer_action(path), Conditions::new(), None),
        };

        conditions.insert("domain".to_string(), ConditionValue::literal(role.domain.as_str()));
        conditions.insert(
            "department".to_string(),
            ConditionValue::literal(role.department.as_str()),
        );

        Ok(Some(PolicyStatement {
            subject,
            action,
            access_level,
            conditions,
            fields,
            path: path.to_string(),
            role_id: role.id,
            role_name: role.role_name.clone(),
        }))
    }

    /// Flattens a role's tree and maps every leaf.
    pub fn map_role(&self, role: &Role) -> AuthzResult<Vec<PolicyStatement>> {
        let mut statements = Vec::new();
        for grant in flatten(&role.permission_tree) {
            if let Some(statement) = self.map(role, &grant.path, grant.value)? {
                statements.push(statement);
            }
        }
        tracing::debug!(
            role_id = %role.id,
            role = %role.role_name,
            statements = statements.len(),
            "mapped role permission tree"
        );
        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccessLevel, PermissionNode};
    use serde_json::json;

    fn role(tree: serde_json::Value) -> Role {
        Role::new("acme", "legal", "reviewer", PermissionNode::from(tree))
    }

    #[test]
    fn test_table_paths_are_unique() {
        for (i, a) in FIELD_TABLE.iter().enumerate() {
            for b in &FIELD_TABLE[i + 1..] {
                assert_ne!(a.path, b.path);
            }
        }
    }

    #[test]
    fn test_known_path_uses_table_entry() {
        let r = role(json!({}));
        let stmt = FieldMapper::default()
            .map(&r, "documentRepoAccess.approved", &AccessLevel::ViewAccess.into())
            .unwrap()
            .unwrap();

        assert_eq!(stmt.subject, Subject::Document);
        assert_eq!(stmt.action, Action::Read);
        assert_eq!(stmt.access_level, AccessLevel::ViewAccess);
        assert_eq!(stmt.conditions["status"], ConditionValue::literal("approved"));
        assert_eq!(stmt.conditions["domain"], ConditionValue::literal("acme"));
        assert_eq!(stmt.conditions["department"], ConditionValue::literal("legal"));
        assert_eq!(stmt.role_id, r.id);
    }

    #[test]
    fn test_table_fields_and_placeholders_survive() {
        let r = role(json!({}));
        let stmt = FieldMapper::default()
            .map(&r, "userManagement.profile", &AccessLevel::WriteAccess.into())
            .unwrap()
            .unwrap();
        assert_eq!(
            stmt.fields,
            Some(vec!["name".to_string(), "email".to_string(), "avatar".to_string()])
        );
        assert_eq!(stmt.conditions["id"], ConditionValue::Placeholder(Placeholder::ActorId));
    }

    #[test]
    fn test_unmapped_paths_are_inferred() {
        assert_eq!(infer_subject("archive.documentsOld"), Subject::Document);
        assert_eq!(infer_subject("escalatedTasksAccess.delete"), Subject::Task);
        assert_eq!(infer_subject("finance.reports"), Subject::Other("Reports".into()));
        assert_eq!(infer_subject("budget.0.permission"), Subject::Other("Budget".into()));

        assert_eq!(infer_action("taskAccess.deleteArchived"), Action::Delete);
        assert_eq!(infer_action("documentRepoAccess.uploadBulk"), Action::Upload);
        assert_eq!(infer_action("finance.reports"), Action::Read);
        assert_eq!(infer_action("reports.manage_all"), Action::Manage);
    }

    #[test]
    fn test_verbs_match_whole_words_only() {
        assert_eq!(words("userManagement"), vec!["user", "management"]);
        assert_eq!(infer_action("userManagement.sessions"), Action::Read);
        assert_eq!(infer_action("userManagement.deleteSessions"), Action::Delete);
        assert_eq!(infer_action("notificationsCenter.updates"), Action::Read);
    }

    #[test]
    fn test_array_wrapped_table_paths_keep_conditions() {
        let r = role(json!({ "taskAccess": [{ "assigned": "view_access" }] }));
        let statements = FieldMapper::default().map_role(&r).unwrap();
        assert_eq!(statements.len(), 1);

        let stmt = &statements[0];
        assert_eq!(stmt.path, "taskAccess.0.assigned");
        assert_eq!(stmt.subject, Subject::Task);
        assert_eq!(stmt.conditions["assignedTo"], ConditionValue::Placeholder(Placeholder::ActorId));

        let draft = lookup("documentRepoAccess.2.draft").map(|e| e.path);
        assert_eq!(draft, Some("documentRepoAccess.draft"));
        assert!(lookup("taskAccess.0.unknown").is_none());
    }

    #[test]
    fn test_unrecognized_level_is_dropped_leniently() {
        let r = role(json!({}));
        let value = LeafValue::Unrecognized(json!("edit"));
        assert!(FieldMapper::default().map(&r, "a.b", &value).unwrap().is_none());
    }

    #[test]
    fn test_unrecognized_level_fails_in_strict_mode() {
        let r = role(json!({}));
        let value = LeafValue::Unrecognized(json!("edit"));
        let err = FieldMapper::new(true).map(&r, "a.b", &value).unwrap_err();
        assert!(matches!(err, AuthzError::UnknownAccessLevel { ref path, .. } if path == "a.b"));
    }

    #[test]
    fn test_map_role_skips_bad_leaves_only() {
        let r = role(json!({
            "documentRepoAccess": { "approved": "view_access", "pending": "edit" },
            "taskAccess": { "all": "admin_access" }
        }));
        let statements = FieldMapper::default().map_role(&r).unwrap();
        let paths: Vec<_> = statements.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["documentRepoAccess.approved", "taskAccess.all"]);
    }
}
