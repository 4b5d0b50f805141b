//! Integration tests for the rate limiter.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use versa_auth::config::{LimitSpec, RateLimitConfig};
use versa_auth::ratelimit::RateLimiter;
use versa_auth::token::Claims;
use versa_cache::{CacheBackend, CacheError, CacheResult, MemoryCache};
use versa_core::models::context::ContextType;
use versa_core::models::enterprise::{CreateEnterprise, EnterpriseKind, SubscriptionTier};
use versa_core::models::user::CreateUser;
use versa_core::repository::{EnterpriseRepository, UserRepository};
use versa_store::MemoryStore;

fn claims(
    context_type: ContextType,
    enterprise_id: Uuid,
    context_id: Uuid,
    user_id: Uuid,
) -> Claims {
    Claims {
        sub: user_id,
        context_id,
        context_type,
        enterprise_id,
        agency_seat_id: None,
        partner_enterprise_id: None,
        client_enterprise_id: None,
        role: "enterprise_admin".into(),
        permissions: vec![],
        iss: "versa-test".into(),
        iat: 0,
        exp: i64::MAX,
        jti: "test".into(),
    }
}

fn small_window_config(requests: u32) -> RateLimitConfig {
    let mut tiers = HashMap::new();
    tiers.insert(
        ("enterprise".to_string(), "standard".to_string()),
        LimitSpec {
            requests,
            window_secs: 3_600,
            burst: 0,
        },
    );
    RateLimitConfig {
        enabled: true,
        default: LimitSpec {
            requests,
            window_secs: 3_600,
            burst: 0,
        },
        tiers,
    }
}

async fn seed_enterprise(store: &MemoryStore, tier: SubscriptionTier) -> Uuid {
    let owner = UserRepository::create(
        store,
        CreateUser {
            email: format!("{}@example.com", Uuid::new_v4()),
            name: "Owner".into(),
        },
    )
    .await
    .unwrap()
    .id;
    EnterpriseRepository::create(
        store,
        CreateEnterprise {
            name: "Tenant".into(),
            slug: Uuid::new_v4().to_string(),
            kind: EnterpriseKind::Pharma,
            subscription_tier: Some(tier),
            settings: None,
        },
        owner,
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn window_walks_down_to_zero_then_denies() {
    let store = MemoryStore::new();
    let cache: Arc<dyn CacheBackend> = Arc::new(MemoryCache::new(Duration::from_secs(3600)));
    let enterprise_id = seed_enterprise(&store, SubscriptionTier::Standard).await;
    let limiter = RateLimiter::new(cache, store, small_window_config(10));

    let claims = claims(
        ContextType::Enterprise,
        enterprise_id,
        Uuid::new_v4(),
        Uuid::new_v4(),
    );

    for expected_remaining in (0..10).rev() {
        let decision = limiter.check_rate_limit(&claims, None).await;
        assert!(decision.allowed, "request should be within budget");
        assert_eq!(decision.remaining, expected_remaining);
        assert_eq!(decision.limit, 10);
        assert!(decision.reset_in <= Duration::from_secs(3_600));
    }

    let decision = limiter.check_rate_limit(&claims, None).await;
    assert!(!decision.allowed);
    assert_eq!(decision.remaining, 0);
}

#[tokio::test]
async fn user_budget_spans_contexts() {
    let store = MemoryStore::new();
    let cache: Arc<dyn CacheBackend> = Arc::new(MemoryCache::new(Duration::from_secs(3600)));
    let enterprise_id = seed_enterprise(&store, SubscriptionTier::Standard).await;
    let limiter = RateLimiter::new(cache, store, small_window_config(3));

    let user_id = Uuid::new_v4();
    let context_a = claims(
        ContextType::Enterprise,
        enterprise_id,
        Uuid::new_v4(),
        user_id,
    );
    let context_b = claims(
        ContextType::Enterprise,
        enterprise_id,
        Uuid::new_v4(),
        user_id,
    );

    for _ in 0..3 {
        let decision = limiter.check_rate_limit(&context_a, Some(user_id)).await;
        assert!(decision.allowed);
    }

    // Fresh tenant counter, but the user already spent their budget.
    let decision = limiter.check_rate_limit(&context_b, Some(user_id)).await;
    assert!(!decision.allowed);

    // Without the user dimension the new context is fine.
    let decision = limiter.check_rate_limit(&context_b, None).await;
    assert!(decision.allowed);
}

/// A cache that is permanently down.
struct FailingCache;

#[async_trait]
impl CacheBackend for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::Backend {
            reason: "down".into(),
        })
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> CacheResult<()> {
        Err(CacheError::Backend {
            reason: "down".into(),
        })
    }

    async fn del(&self, _key: &str) -> CacheResult<()> {
        Err(CacheError::Backend {
            reason: "down".into(),
        })
    }

    async fn exists(&self, _key: &str) -> CacheResult<bool> {
        Err(CacheError::Backend {
            reason: "down".into(),
        })
    }

    async fn incr(&self, _key: &str) -> CacheResult<i64> {
        Err(CacheError::Backend {
            reason: "down".into(),
        })
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::Backend {
            reason: "down".into(),
        })
    }

    async fn flush(&self) -> CacheResult<()> {
        Err(CacheError::Backend {
            reason: "down".into(),
        })
    }
}

#[tokio::test]
async fn fails_open_when_cache_is_down() {
    let store = MemoryStore::new();
    let enterprise_id = seed_enterprise(&store, SubscriptionTier::Standard).await;
    let limiter = RateLimiter::new(Arc::new(FailingCache), store, small_window_config(10));

    let claims = claims(
        ContextType::Enterprise,
        enterprise_id,
        Uuid::new_v4(),
        Uuid::new_v4(),
    );

    // Every counter operation errors; throughput wins.
    for _ in 0..25 {
        let decision = limiter.check_rate_limit(&claims, Some(claims.sub)).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, decision.limit);
    }
}

#[tokio::test]
async fn disabled_limiter_always_allows() {
    let store = MemoryStore::new();
    let mut config = small_window_config(1);
    config.enabled = false;
    let limiter = RateLimiter::new(Arc::new(FailingCache), store, config);

    let claims = claims(
        ContextType::Enterprise,
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
    );

    for _ in 0..5 {
        let decision = limiter.check_rate_limit(&claims, Some(claims.sub)).await;
        assert!(decision.allowed);
    }
}

#[tokio::test]
async fn tier_resolution_picks_the_premium_budget() {
    let store = MemoryStore::new();
    let cache: Arc<dyn CacheBackend> = Arc::new(MemoryCache::new(Duration::from_secs(3600)));
    let enterprise_id = seed_enterprise(&store, SubscriptionTier::Premium).await;
    let limiter = RateLimiter::new(cache.clone(), store, RateLimitConfig::default());

    let claims = claims(
        ContextType::Enterprise,
        enterprise_id,
        Uuid::new_v4(),
        Uuid::new_v4(),
    );

    let decision = limiter.check_rate_limit(&claims, None).await;
    assert_eq!(decision.limit, 5_000);

    // The tier lookup is cached for subsequent checks.
    let cached = cache
        .get(&versa_cache::keys::enterprise_tier(enterprise_id))
        .await
        .unwrap();
    assert_eq!(cached.as_deref(), Some("premium"));
}

#[tokio::test]
async fn partner_contexts_draw_from_the_partner_budget() {
    let store = MemoryStore::new();
    let cache: Arc<dyn CacheBackend> = Arc::new(MemoryCache::new(Duration::from_secs(3600)));
    let enterprise_id = seed_enterprise(&store, SubscriptionTier::Standard).await;
    let limiter = RateLimiter::new(cache, store, RateLimitConfig::default());

    let claims = claims(
        ContextType::Partner,
        enterprise_id,
        Uuid::new_v4(),
        Uuid::new_v4(),
    );

    let decision = limiter.check_rate_limit(&claims, None).await;
    assert_eq!(decision.limit, 500);
}
