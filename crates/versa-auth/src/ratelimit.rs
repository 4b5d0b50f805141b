//! Per-tenant rate limiting over the cache layer.
//!
//! Two independent fixed-window counters per check: one for the
//! `(enterprise, context)` pair, one for the user. The window start is
//! baked into the counter key, so reset times are arithmetic and stale
//! windows simply expire out of the cache.
//!
//! The limiter fails **open**: any infrastructure fault during a check
//! allows the request. A misconfigured cache must not take down a
//! tenant's traffic — throughput over strict enforcement.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use versa_cache::{keys, CacheBackend, CacheResult};
use versa_core::repository::EnterpriseRepository;

use crate::config::{LimitSpec, RateLimitConfig};
use crate::token::Claims;

/// Tier lookups are cached briefly; a tier change shows up within this
/// window.
const TIER_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
    pub reset_in: Duration,
}

pub struct RateLimiter<E: EnterpriseRepository> {
    cache: Arc<dyn CacheBackend>,
    enterprises: E,
    config: RateLimitConfig,
}

impl<E: EnterpriseRepository> RateLimiter<E> {
    pub fn new(cache: Arc<dyn CacheBackend>, enterprises: E, config: RateLimitConfig) -> Self {
        Self {
            cache,
            enterprises,
            config,
        }
    }

    /// Check and charge the budgets for one request. Infallible:
    /// faults log a warning and allow.
    pub async fn check_rate_limit(
        &self,
        claims: &Claims,
        user_id: Option<Uuid>,
    ) -> RateLimitDecision {
        if !self.config.enabled {
            let spec = self.config.resolve(claims.context_type, "standard");
            return RateLimitDecision {
                allowed: true,
                remaining: spec.requests,
                limit: spec.requests,
                reset_in: Duration::from_secs(spec.window_secs),
            };
        }

        let tier = self.subscription_tier(claims.enterprise_id).await;
        let spec = self.config.resolve(claims.context_type, &tier);

        match self.check_window(spec, claims, user_id).await {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!(error = %e, "rate limit check failed, failing open");
                RateLimitDecision {
                    allowed: true,
                    remaining: spec.requests,
                    limit: spec.requests,
                    reset_in: Duration::from_secs(spec.window_secs),
                }
            }
        }
    }

    async fn check_window(
        &self,
        spec: LimitSpec,
        claims: &Claims,
        user_id: Option<Uuid>,
    ) -> CacheResult<RateLimitDecision> {
        let window_secs = spec.window_secs.max(1);
        let now = Utc::now().timestamp();
        let window_start = now - now.rem_euclid(window_secs as i64);
        let reset_in =
            Duration::from_secs((window_start + window_secs as i64 - now).max(0) as u64);
        let ttl = Duration::from_secs(window_secs);

        let tenant_key =
            keys::rate_limit_context(claims.enterprise_id, claims.context_id, window_start);
        let mut worst = self.bump(&tenant_key, ttl).await?;

        if let Some(user_id) = user_id {
            let user_key = keys::rate_limit_user(user_id, window_start);
            worst = worst.max(self.bump(&user_key, ttl).await?);
        }

        let limit = spec.requests;
        Ok(RateLimitDecision {
            allowed: worst <= i64::from(limit),
            remaining: (i64::from(limit) - worst).max(0) as u32,
            limit,
            reset_in,
        })
    }

    /// Increment a window counter. The first increment of a window owns
    /// setting its expiry; later increments share it.
    async fn bump(&self, key: &str, ttl: Duration) -> CacheResult<i64> {
        let count = self.cache.incr(key).await?;
        if count == 1 {
            self.cache.expire(key, ttl).await?;
        }
        Ok(count)
    }

    /// Resolve the tenant's subscription tier through the cache. Any
    /// fault degrades to `standard` — part of the fail-open posture.
    async fn subscription_tier(&self, enterprise_id: Uuid) -> String {
        let key = keys::enterprise_tier(enterprise_id);
        match self.cache.get(&key).await {
            Ok(Some(tier)) => return tier,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "tier cache read failed");
            }
        }

        match self.enterprises.get_by_id(enterprise_id).await {
            Ok(enterprise) => {
                let tier = enterprise.subscription_tier.as_str().to_string();
                if let Err(e) = self.cache.set(&key, &tier, Some(TIER_TTL)).await {
                    tracing::warn!(error = %e, "tier cache write failed");
                }
                tier
            }
            Err(e) => {
                tracing::warn!(enterprise_id = %enterprise_id, error = %e, "tier lookup failed, assuming standard");
                "standard".into()
            }
        }
    }
}
