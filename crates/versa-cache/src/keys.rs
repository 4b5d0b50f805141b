//! Hierarchical cache key builders.
//!
//! Keys are colon-joined from caller-supplied parts
//! (`user:<id>:contexts`, `enterprise:<id>:tier`,
//! `ratelimit:<enterprise>:<context>:<window>`). Building them in one
//! place keeps the namespace prefix-consistent even though no caller
//! currently scans by prefix.

use uuid::Uuid;

/// `user:<id>:<suffix>`
pub fn user(user_id: Uuid, suffix: &str) -> String {
    format!("user:{user_id}:{suffix}")
}

/// `user:<id>:contexts` — the per-user context listing.
pub fn user_contexts(user_id: Uuid) -> String {
    user(user_id, "contexts")
}

/// `enterprise:<id>:<suffix>`
pub fn enterprise(enterprise_id: Uuid, suffix: &str) -> String {
    format!("enterprise:{enterprise_id}:{suffix}")
}

/// `enterprise:<id>:tier` — the subscription-tier lookup.
pub fn enterprise_tier(enterprise_id: Uuid) -> String {
    enterprise(enterprise_id, "tier")
}

/// `ratelimit:<enterprise>:<context>:<window_start>` — the per-tenant
/// fixed-window counter.
pub fn rate_limit_context(enterprise_id: Uuid, context_id: Uuid, window_start: i64) -> String {
    format!("ratelimit:{enterprise_id}:{context_id}:{window_start}")
}

/// `ratelimit:user:<user>:<window_start>` — the per-user counter.
pub fn rate_limit_user(user_id: Uuid, window_start: i64) -> String {
    format!("ratelimit:user:{user_id}:{window_start}")
}
