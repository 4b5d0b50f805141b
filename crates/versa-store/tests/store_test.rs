//! Integration tests for the in-memory store.

use uuid::Uuid;

use versa_core::error::CoreError;
use versa_core::models::context::{CreatePartnerClientContext, CreateUserContext, ResolvedContext};
use versa_core::models::enterprise::{CreateEnterprise, EnterpriseKind, SubscriptionTier};
use versa_core::models::permission::{roles, Permission};
use versa_core::models::relationship::{CreatePartnerRelationship, RelationshipStatus};
use versa_core::models::user::CreateUser;
use versa_core::repository::{
    AuditFilter, AuditLogRepository, ContextRepository, EnterpriseRepository, Pagination,
    RelationshipRepository, UserRepository,
};
use versa_store::MemoryStore;

fn create_enterprise_input(slug: &str, kind: EnterpriseKind) -> CreateEnterprise {
    CreateEnterprise {
        name: slug.to_uppercase(),
        slug: slug.into(),
        kind,
        subscription_tier: Some(SubscriptionTier::Standard),
        settings: None,
    }
}

async fn setup_user(store: &MemoryStore, email: &str) -> Uuid {
    UserRepository::create(
        store,
        CreateUser {
            email: email.into(),
            name: email.split('@').next().unwrap().into(),
        },
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn enterprise_create_includes_owner_default_context() {
    let store = MemoryStore::new();
    let user_id = setup_user(&store, "alice@example.com").await;

    let enterprise = EnterpriseRepository::create(
        &store,
        create_enterprise_input("globalmed", EnterpriseKind::Pharma),
        user_id,
    )
    .await
    .unwrap();

    let default = store.get_default_context(user_id).await.unwrap();
    match default {
        ResolvedContext::Enterprise { context, .. } => {
            assert_eq!(context.enterprise_id, enterprise.id);
            assert_eq!(context.role, roles::ENTERPRISE_OWNER);
            assert!(context.is_default);
            assert_eq!(context.permissions, vec![Permission::all()]);
        }
        other => panic!("expected enterprise context, got {other:?}"),
    }
}

#[tokio::test]
async fn default_context_not_found_when_user_has_none() {
    let store = MemoryStore::new();
    let user_id = setup_user(&store, "bob@example.com").await;

    let err = store.get_default_context(user_id).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn new_default_demotes_previous_default() {
    let store = MemoryStore::new();
    let user_id = setup_user(&store, "alice@example.com").await;

    let first = EnterpriseRepository::create(
        &store,
        create_enterprise_input("first", EnterpriseKind::Pharma),
        user_id,
    )
    .await
    .unwrap();
    let second = EnterpriseRepository::create(
        &store,
        create_enterprise_input("second", EnterpriseKind::Agency),
        user_id,
    )
    .await
    .unwrap();

    // Owner contexts for both; the second claimed the default.
    let contexts = store.list_enterprise_contexts(user_id).await.unwrap();
    assert_eq!(contexts.len(), 2);
    let defaults: Vec<_> = contexts.iter().filter(|c| c.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].enterprise_id, second.id);
    assert!(contexts
        .iter()
        .any(|c| c.enterprise_id == first.id && !c.is_default));
}

#[tokio::test]
async fn partner_context_requires_active_relationship() {
    let store = MemoryStore::new();
    let user_id = setup_user(&store, "carol@example.com").await;

    let partner = EnterpriseRepository::create(
        &store,
        create_enterprise_input("partner-co", EnterpriseKind::Partner),
        user_id,
    )
    .await
    .unwrap();
    let owner = setup_user(&store, "owner@example.com").await;
    let client = EnterpriseRepository::create(
        &store,
        create_enterprise_input("client-co", EnterpriseKind::Pharma),
        owner,
    )
    .await
    .unwrap();

    let input = CreatePartnerClientContext {
        user_id,
        partner_enterprise_id: partner.id,
        client_enterprise_id: client.id,
        role: roles::PARTNER_ADMIN.into(),
        permissions: vec![],
        is_default: false,
    };

    // No relationship row at all.
    let err = store.create_partner_context(input.clone()).await.unwrap_err();
    assert!(matches!(err, CoreError::AccessDenied { .. }));

    // Pending relationship is still not enough.
    let relationship = RelationshipRepository::create(
        &store,
        CreatePartnerRelationship {
            partner_enterprise_id: partner.id,
            client_enterprise_id: client.id,
            status: Some(RelationshipStatus::Pending),
            relationship_kind: None,
            compliance_score: None,
            risk_level: None,
            settings: None,
            created_by: user_id,
        },
    )
    .await
    .unwrap();
    let err = store.create_partner_context(input.clone()).await.unwrap_err();
    assert!(matches!(err, CoreError::AccessDenied { .. }));

    // Active relationship unlocks creation.
    store
        .set_status(relationship.id, RelationshipStatus::Active)
        .await
        .unwrap();
    let context = store.create_partner_context(input).await.unwrap();
    assert!(context.is_active);
}

#[tokio::test]
async fn partner_context_requires_partner_membership() {
    let store = MemoryStore::new();
    let insider = setup_user(&store, "insider@example.com").await;
    let outsider = setup_user(&store, "outsider@example.com").await;

    let partner = EnterpriseRepository::create(
        &store,
        create_enterprise_input("partner-co", EnterpriseKind::Partner),
        insider,
    )
    .await
    .unwrap();
    let client = EnterpriseRepository::create(
        &store,
        create_enterprise_input("client-co", EnterpriseKind::Pharma),
        insider,
    )
    .await
    .unwrap();
    RelationshipRepository::create(
        &store,
        CreatePartnerRelationship {
            partner_enterprise_id: partner.id,
            client_enterprise_id: client.id,
            status: Some(RelationshipStatus::Active),
            relationship_kind: None,
            compliance_score: None,
            risk_level: None,
            settings: None,
            created_by: insider,
        },
    )
    .await
    .unwrap();

    // Outsider holds no context in the partner enterprise, so even an
    // active relationship must not let the binding through.
    let err = store
        .create_partner_context(CreatePartnerClientContext {
            user_id: outsider,
            partner_enterprise_id: partner.id,
            client_enterprise_id: client.id,
            role: roles::PARTNER_USER.into(),
            permissions: vec![],
            is_default: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AccessDenied { .. }));
}

#[tokio::test]
async fn relationship_rejects_self_edge_and_duplicates() {
    let store = MemoryStore::new();
    let user_id = setup_user(&store, "dave@example.com").await;
    let partner = EnterpriseRepository::create(
        &store,
        create_enterprise_input("p", EnterpriseKind::Partner),
        user_id,
    )
    .await
    .unwrap();
    let client = EnterpriseRepository::create(
        &store,
        create_enterprise_input("c", EnterpriseKind::Pharma),
        user_id,
    )
    .await
    .unwrap();

    let err = RelationshipRepository::create(
        &store,
        CreatePartnerRelationship {
            partner_enterprise_id: partner.id,
            client_enterprise_id: partner.id,
            status: None,
            relationship_kind: None,
            compliance_score: None,
            risk_level: None,
            settings: None,
            created_by: user_id,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidRelationship { .. }));

    let input = CreatePartnerRelationship {
        partner_enterprise_id: partner.id,
        client_enterprise_id: client.id,
        status: Some(RelationshipStatus::Active),
        relationship_kind: None,
        compliance_score: None,
        risk_level: None,
        settings: None,
        created_by: user_id,
    };
    RelationshipRepository::create(&store, input.clone())
        .await
        .unwrap();
    let err = RelationshipRepository::create(&store, input)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AlreadyExists { .. }));
}

#[tokio::test]
async fn deactivate_partner_context_checks_ownership() {
    let store = MemoryStore::new();
    let user_id = setup_user(&store, "erin@example.com").await;
    let other = setup_user(&store, "mallory@example.com").await;

    let partner = EnterpriseRepository::create(
        &store,
        create_enterprise_input("p", EnterpriseKind::Partner),
        user_id,
    )
    .await
    .unwrap();
    let client = EnterpriseRepository::create(
        &store,
        create_enterprise_input("c", EnterpriseKind::Pharma),
        user_id,
    )
    .await
    .unwrap();
    RelationshipRepository::create(
        &store,
        CreatePartnerRelationship {
            partner_enterprise_id: partner.id,
            client_enterprise_id: client.id,
            status: Some(RelationshipStatus::Active),
            relationship_kind: None,
            compliance_score: None,
            risk_level: None,
            settings: None,
            created_by: user_id,
        },
    )
    .await
    .unwrap();

    let context = store
        .create_partner_context(CreatePartnerClientContext {
            user_id,
            partner_enterprise_id: partner.id,
            client_enterprise_id: client.id,
            role: roles::PARTNER_ADMIN.into(),
            permissions: vec![],
            is_default: false,
        })
        .await
        .unwrap();

    let err = store
        .deactivate_partner_context(other, context.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AccessDenied { .. }));

    store
        .deactivate_partner_context(user_id, context.id)
        .await
        .unwrap();

    // Soft-deleted: gone from listings and lookups, row preserved.
    assert!(store
        .find_context(user_id, context.id)
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        store.list_partner_contexts(user_id, None).await.unwrap().len(),
        0
    );
}

#[tokio::test]
async fn find_context_hides_foreign_contexts() {
    let store = MemoryStore::new();
    let alice = setup_user(&store, "alice@example.com").await;
    let bob = setup_user(&store, "bob@example.com").await;

    EnterpriseRepository::create(
        &store,
        create_enterprise_input("acme", EnterpriseKind::Pharma),
        alice,
    )
    .await
    .unwrap();
    let contexts = store.list_enterprise_contexts(alice).await.unwrap();
    let context_id = contexts[0].context_id;

    assert!(store.find_context(alice, context_id).await.unwrap().is_some());
    assert!(store.find_context(bob, context_id).await.unwrap().is_none());
    assert!(store
        .find_context(alice, Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn count_distinct_clients_ignores_inactive_bindings() {
    let store = MemoryStore::new();
    let user_id = setup_user(&store, "frank@example.com").await;

    let partner = EnterpriseRepository::create(
        &store,
        create_enterprise_input("p", EnterpriseKind::Partner),
        user_id,
    )
    .await
    .unwrap();

    let mut context_ids = Vec::new();
    for slug in ["c1", "c2"] {
        let owner = setup_user(&store, &format!("{slug}@example.com")).await;
        let client = EnterpriseRepository::create(
            &store,
            create_enterprise_input(slug, EnterpriseKind::Pharma),
            owner,
        )
        .await
        .unwrap();
        RelationshipRepository::create(
            &store,
            CreatePartnerRelationship {
                partner_enterprise_id: partner.id,
                client_enterprise_id: client.id,
                status: Some(RelationshipStatus::Active),
                relationship_kind: None,
                compliance_score: None,
                risk_level: None,
                settings: None,
                created_by: user_id,
            },
        )
        .await
        .unwrap();
        let context = store
            .create_partner_context(CreatePartnerClientContext {
                user_id,
                partner_enterprise_id: partner.id,
                client_enterprise_id: client.id,
                role: roles::PARTNER_ADMIN.into(),
                permissions: vec![],
                is_default: false,
            })
            .await
            .unwrap();
        context_ids.push(context.id);
    }

    assert_eq!(
        store.count_distinct_clients(user_id, partner.id).await.unwrap(),
        2
    );

    store
        .deactivate_partner_context(user_id, context_ids[0])
        .await
        .unwrap();
    assert_eq!(
        store.count_distinct_clients(user_id, partner.id).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn audit_log_lists_ascending_with_filters() {
    let store = MemoryStore::new();
    let alice = setup_user(&store, "alice@example.com").await;
    let bob = setup_user(&store, "bob@example.com").await;

    for (user_id, action) in [
        (alice, "context_switch_success"),
        (bob, "screen_access"),
        (alice, "screen_access"),
    ] {
        store
            .append(versa_core::models::audit::CreateAuditEntry {
                user_id,
                context_id: None,
                action: action.into(),
                resource_type: "context".into(),
                resource_id: None,
                details: serde_json::json!({}),
            })
            .await
            .unwrap();
    }

    let entries = store
        .list(
            AuditFilter {
                user_id: Some(alice),
                context_id: None,
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].timestamp <= entries[1].timestamp);
    assert_eq!(entries[0].action, "context_switch_success");
    assert_eq!(entries[1].action, "screen_access");
}

#[tokio::test]
async fn create_user_context_validates_references() {
    let store = MemoryStore::new();
    let user_id = setup_user(&store, "gina@example.com").await;

    let err = store
        .create_user_context(CreateUserContext {
            user_id,
            enterprise_id: Uuid::new_v4(),
            agency_seat_id: None,
            role: roles::ENTERPRISE_ADMIN.into(),
            permissions: vec![],
            is_default: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}
