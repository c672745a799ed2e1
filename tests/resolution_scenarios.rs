use serde_json::json;
use uuid::Uuid;

use review_authz::authz::{ActorContext, AuthzMode, RuntimeContext};
use review_authz::models::{AccessLevel, Action, Actor, ConditionValue, Group, PermissionNode, Role, Subject};
use review_authz::{can, enforce, AuthzError, Authorizer, InMemoryStore};

fn role(name: &str, tree: serde_json::Value) -> Role {
    Role::new("acme", "legal", name, PermissionNode::from(tree))
}

fn actor() -> Actor {
    Actor::new("reviewer@acme.test", "acme", "legal")
}

#[tokio::test]
async fn group_role_upgrades_direct_view_grant_to_write() {
    let reader = role("reader", json!({ "documentRepoAccess": { "approved": "view_access" } }));
    let editor = role("editor", json!({ "documentRepoAccess": { "approved": "write_access" } }));
    let group = Group::new(vec![editor.id]);
    let actor = actor().with_roles([reader.id]).with_groups([group.id]);

    let store = InMemoryStore::new()
        .with_role(reader)
        .with_role(editor)
        .with_group(group)
        .with_actor(actor.clone());
    let authz = Authorizer::new(store);

    let (roles, merged) = authz.merged_statements(&actor).await.unwrap();
    assert_eq!(roles.len(), 2);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].subject, Subject::Document);
    assert_eq!(merged[0].action, Action::Read);
    assert_eq!(merged[0].access_level, AccessLevel::WriteAccess);
    assert_eq!(merged[0].role_name, "editor");
    assert_eq!(merged[0].conditions.get("status"), Some(&ConditionValue::literal("approved")));

    let policy = authz.resolve(&actor).await.unwrap();
    let approved = RuntimeContext::new().with_attribute("status", "approved");
    assert!(can(&policy, "read", "Document", &approved));
    assert!(can(&policy, "update", "Document", &approved));
    assert!(!can(&policy, "delete", "Document", &approved));

    let draft = RuntimeContext::new().with_attribute("status", "draft");
    assert!(!can(&policy, "update", "Document", &draft));
}

#[tokio::test]
async fn no_access_notify_denies_notification() {
    let escalation = role("escalation", json!({ "escalatedTasksAccess": { "notify": "no_access" } }));
    let actor = actor().with_roles([escalation.id]);
    let authz = Authorizer::new(InMemoryStore::new().with_role(escalation).with_actor(actor.clone()));

    let policy = authz.resolve(&actor).await.unwrap();
    assert!(!policy.is_empty());
    assert!(!can(&policy, "notify", "Notification", &RuntimeContext::new()));
}

#[tokio::test]
async fn actor_without_assignments_summarizes_to_nothing() {
    let actor = actor();
    let authz = Authorizer::new(InMemoryStore::new().with_actor(actor.clone()));

    let summary = authz.summarize(&actor).await.unwrap();
    assert_eq!(summary.total_roles, 0);
    assert_eq!(summary.total_permissions, 0);
    assert!(summary.permissions.is_empty());

    let policy = authz.resolve(&actor).await.unwrap();
    assert!(policy.is_empty());
    assert!(!can(&policy, "read", "Document", &RuntimeContext::new()));
}

#[tokio::test]
async fn unknown_actor_resolves_to_deny_all() {
    let authz = Authorizer::new(InMemoryStore::new());
    let policy = authz.resolve_by_id(Uuid::new_v4()).await.unwrap();
    assert!(policy.is_empty());
    assert!(!can(&policy, "manage", "all", &RuntimeContext::new()));

    let summary = authz.summarize_by_id(Uuid::new_v4()).await.unwrap();
    assert_eq!(summary.total_roles, 0);
}

#[tokio::test]
async fn draft_documents_are_scoped_to_their_uploader() {
    let author = role("author", json!({ "documentRepoAccess": { "draft": "write_access" } }));
    let actor = actor().with_roles([author.id]);
    let authz = Authorizer::new(InMemoryStore::new().with_role(author).with_actor(actor.clone()));
    let policy = authz.resolve(&actor).await.unwrap();

    let own = RuntimeContext::new()
        .with_attribute("status", "draft")
        .with_attribute("uploadedBy", actor.id.to_string());
    let foreign = RuntimeContext::new()
        .with_attribute("status", "draft")
        .with_attribute("uploadedBy", Uuid::new_v4().to_string());

    assert!(can(&policy, "update", "Document", &own));
    assert!(!can(&policy, "update", "Document", &foreign));

    // An override actor without an id cannot satisfy `${user.id}`.
    let anonymous = own.clone().with_actor(ActorContext::new().with_org("acme", "legal"));
    assert!(!can(&policy, "read", "Document", &anonymous));
}

#[tokio::test]
async fn grants_are_scoped_to_the_role_organization() {
    let tasks = Role::new("acme", "finance", "tasks", PermissionNode::from(json!({ "taskAccess": { "all": "view_access" } })));
    let actor = actor().with_roles([tasks.id]);
    let authz = Authorizer::new(InMemoryStore::new().with_role(tasks).with_actor(actor.clone()));
    let policy = authz.resolve(&actor).await.unwrap();

    // The actor sits in `legal`; the role only covers `finance` resources.
    assert!(!can(&policy, "read", "Task", &RuntimeContext::new()));
    let finance_task = RuntimeContext::new().with_attribute("department", "finance");
    assert!(can(&policy, "read", "Task", &finance_task));
}

#[tokio::test]
async fn workflow_verbs_and_admin_extras() {
    let lead = role(
        "lead",
        json!({
            "reviewWorkflow": {
                "permission": "view_access",
                "actions": { "approve": "write_access", "reject": "no_access" }
            },
            "taskAccess": { "all": "admin_access" }
        }),
    );
    let actor = actor().with_roles([lead.id]);
    let authz = Authorizer::new(InMemoryStore::new().with_role(lead).with_actor(actor.clone()));
    let policy = authz.resolve(&actor).await.unwrap();

    let pending = RuntimeContext::new().with_attribute("status", "pending");
    assert!(can(&policy, "approve", "Document", &pending));
    assert!(!can(&policy, "reject", "Document", &pending));
    assert!(can(&policy, "read", "Review", &RuntimeContext::new()));
    assert!(!can(&policy, "update", "Review", &RuntimeContext::new()));

    let ctx = RuntimeContext::new();
    assert!(can(&policy, "delete", "Task", &ctx));
    assert!(can(&policy, "assign", "Task", &ctx));
    assert!(can(&policy, "escalate", "Task", &ctx));
}

#[tokio::test]
async fn profile_fields_restrict_allow_rules() {
    let member = role("member", json!({ "userManagement": { "profile": "view_access" } }));
    let actor = actor().with_roles([member.id]);
    let authz = Authorizer::new(InMemoryStore::new().with_role(member).with_actor(actor.clone()));
    let policy = authz.resolve(&actor).await.unwrap();

    let own = RuntimeContext::new().with_attribute("id", actor.id.to_string());
    assert!(can(&policy, "read", "User", &own));
    assert!(can(&policy, "read", "User", &own.clone().with_field("email")));
    assert!(!can(&policy, "read", "User", &own.clone().with_field("passwordHash")));

    let other = RuntimeContext::new().with_attribute("id", Uuid::new_v4().to_string());
    assert!(!can(&policy, "read", "User", &other));
}

#[tokio::test]
async fn unrecognized_levels_are_dropped_or_rejected() {
    let legacy = role(
        "legacy",
        json!({ "documentRepoAccess": { "approved": "edit", "pending": "view_access" } }),
    );
    let actor = actor().with_roles([legacy.id]);
    let store = InMemoryStore::new().with_role(legacy).with_actor(actor.clone());

    let (_, merged) = Authorizer::new(store.clone()).merged_statements(&actor).await.unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].path, "documentRepoAccess.pending");

    let err = Authorizer::new(store).strict_levels(true).resolve(&actor).await.unwrap_err();
    assert!(matches!(err, AuthzError::UnknownAccessLevel { ref path, .. } if path == "documentRepoAccess.approved"));
}

#[tokio::test]
async fn enforce_follows_mode() {
    let reader = role("reader", json!({ "auditLogAccess": "view_access" }));
    let actor = actor().with_roles([reader.id]);
    let authz = Authorizer::new(InMemoryStore::new().with_role(reader).with_actor(actor.clone()));
    let policy = authz.resolve(&actor).await.unwrap();
    let ctx = RuntimeContext::new();

    assert!(enforce(&policy, AuthzMode::Strict, "read", "AuditLog", &ctx).is_ok());

    let err = enforce(&policy, AuthzMode::Strict, "delete", "AuditLog", &ctx).unwrap_err();
    assert!(err.is_denial());
    assert_eq!(err.to_string(), "forbidden: delete on AuditLog");

    assert!(enforce(&policy, AuthzMode::Advisory, "delete", "AuditLog", &ctx).is_ok());
    assert!(enforce(&policy, AuthzMode::Off, "delete", "AuditLog", &ctx).is_ok());
}

#[tokio::test]
async fn profile_grant_does_not_reach_other_users() {
    let member = role("member", json!({ "userManagement": { "profile": "write_access" } }));
    let actor = actor().with_roles([member.id]);
    let authz = Authorizer::new(InMemoryStore::new().with_role(member).with_actor(actor.clone()));
    let policy = authz.resolve(&actor).await.unwrap();

    let victim = RuntimeContext::new().with_attribute("email", "victim@acme.test");
    assert!(!can(&policy, "update", "User", &victim));
    assert!(!can(&policy, "update", "User", &RuntimeContext::new()));

    let own = RuntimeContext::new().with_attribute("id", actor.id.to_string());
    assert!(can(&policy, "update", "User", &own));
}

#[tokio::test]
async fn array_wrapped_assignment_grant_stays_scoped() {
    let assignee = role("assignee", json!({ "taskAccess": [{ "assigned": "view_access" }] }));
    let actor = actor().with_roles([assignee.id]);
    let authz = Authorizer::new(InMemoryStore::new().with_role(assignee).with_actor(actor.clone()));
    let policy = authz.resolve(&actor).await.unwrap();

    let theirs = RuntimeContext::new().with_attribute("assignedTo", Uuid::new_v4().to_string());
    assert!(!can(&policy, "read", "Task", &theirs));

    let mine = RuntimeContext::new().with_attribute("assignedTo", actor.id.to_string());
    assert!(can(&policy, "read", "Task", &mine));
}
