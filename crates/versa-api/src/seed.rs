//! Demo data for local development.
//!
//! The in-memory store starts empty; setting `VERSA_SEED_DEMO=1` loads
//! a small tenant landscape so the API is immediately drivable.

use versa_core::error::CoreResult;
use versa_core::models::context::CreatePartnerClientContext;
use versa_core::models::enterprise::{
    CreateAgencySeat, CreateEnterprise, EnterpriseKind, SubscriptionTier,
};
use versa_core::models::permission::roles;
use versa_core::models::relationship::{CreatePartnerRelationship, RelationshipStatus};
use versa_core::models::user::CreateUser;
use versa_core::repository::{
    ContextRepository, EnterpriseRepository, RelationshipRepository, UserRepository,
};
use versa_store::MemoryStore;

pub async fn seed_demo_data(store: &MemoryStore) -> CoreResult<()> {
    let alice = UserRepository::create(
        store,
        CreateUser {
            email: "alice@globalmed.example".into(),
            name: "Alice Chen".into(),
        },
    )
    .await?;
    let bruno = UserRepository::create(
        store,
        CreateUser {
            email: "bruno@brightwave.example".into(),
            name: "Bruno Díaz".into(),
        },
    )
    .await?;

    let globalmed = EnterpriseRepository::create(
        store,
        CreateEnterprise {
            name: "GlobalMed Pharma".into(),
            slug: "globalmed".into(),
            kind: EnterpriseKind::Pharma,
            subscription_tier: Some(SubscriptionTier::Premium),
            settings: None,
        },
        alice.id,
    )
    .await?;

    let brightwave = EnterpriseRepository::create(
        store,
        CreateEnterprise {
            name: "Brightwave Partners".into(),
            slug: "brightwave".into(),
            kind: EnterpriseKind::Partner,
            subscription_tier: Some(SubscriptionTier::Standard),
            settings: None,
        },
        bruno.id,
    )
    .await?;

    store
        .create_seat(
            CreateAgencySeat {
                enterprise_id: globalmed.id,
                name: "Creative Team".into(),
                slug: "creative".into(),
                description: "In-house creative division".into(),
                seat_kind: Some("premium".into()),
                settings: None,
            },
            alice.id,
        )
        .await?;

    RelationshipRepository::create(
        store,
        CreatePartnerRelationship {
            partner_enterprise_id: brightwave.id,
            client_enterprise_id: globalmed.id,
            status: Some(RelationshipStatus::Active),
            relationship_kind: Some("agency".into()),
            compliance_score: Some(0.94),
            risk_level: None,
            settings: None,
            created_by: bruno.id,
        },
    )
    .await?;

    store
        .create_partner_context(CreatePartnerClientContext {
            user_id: bruno.id,
            partner_enterprise_id: brightwave.id,
            client_enterprise_id: globalmed.id,
            role: roles::PARTNER_ADMIN.into(),
            permissions: vec![],
            is_default: false,
        })
        .await?;

    tracing::info!(
        alice = %alice.email,
        bruno = %bruno.email,
        "demo data seeded; log in with either email"
    );
    Ok(())
}
