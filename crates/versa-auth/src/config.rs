//! Authentication and rate-limit configuration.

use std::collections::HashMap;

use versa_core::models::context::ContextType;

/// Configuration for token issuance and verification.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for JWT signing.
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for JWT verification.
    pub jwt_public_key_pem: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Token lifetime in seconds (default: 86_400 = 24 hours). Tokens
    /// are stateless and cannot be revoked before this elapses.
    pub token_lifetime_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            jwt_issuer: "versa".into(),
            token_lifetime_secs: 86_400,
        }
    }
}

impl AuthConfig {
    /// Read `VERSA_JWT_PRIVATE_KEY_PEM`, `VERSA_JWT_PUBLIC_KEY_PEM`,
    /// `VERSA_JWT_ISSUER`, and `VERSA_TOKEN_LIFETIME_SECS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(pem) = std::env::var("VERSA_JWT_PRIVATE_KEY_PEM") {
            config.jwt_private_key_pem = pem;
        }
        if let Ok(pem) = std::env::var("VERSA_JWT_PUBLIC_KEY_PEM") {
            config.jwt_public_key_pem = pem;
        }
        if let Ok(issuer) = std::env::var("VERSA_JWT_ISSUER") {
            config.jwt_issuer = issuer;
        }
        if let Ok(raw) = std::env::var("VERSA_TOKEN_LIFETIME_SECS") {
            match raw.parse() {
                Ok(secs) => config.token_lifetime_secs = secs,
                Err(_) => {
                    tracing::warn!(value = %raw, "invalid token lifetime, keeping default");
                }
            }
        }
        config
    }
}

/// One rate-limit budget.
#[derive(Debug, Clone, Copy)]
pub struct LimitSpec {
    /// Requests allowed per window.
    pub requests: u32,
    /// Fixed-window length in seconds.
    pub window_secs: u64,
    /// Declared burst headroom. Parsed from configuration for forward
    /// compatibility but NOT consumed by the window algorithm — callers
    /// must not assume burst capacity is enforced.
    // TODO: consume this via a token-bucket refill once burst
    // enforcement is wanted.
    pub burst: u32,
}

/// Per-tenant rate-limit configuration.
///
/// Lookup is three-level: exact `(scope, tier)` entry → the scope's
/// `standard` entry → the global default. Scope is the context type's
/// budget family (`enterprise` or `partner`); agency seats spend their
/// owning enterprise's budget.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub default: LimitSpec,
    /// Keyed by `(scope, tier)`, e.g. `("enterprise", "premium")`.
    pub tiers: HashMap<(String, String), LimitSpec>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let mut tiers = HashMap::new();
        let entries: [(&str, &str, LimitSpec); 5] = [
            ("enterprise", "standard", LimitSpec { requests: 1_000, window_secs: 3_600, burst: 100 }),
            ("enterprise", "premium", LimitSpec { requests: 5_000, window_secs: 3_600, burst: 500 }),
            ("enterprise", "enterprise", LimitSpec { requests: 10_000, window_secs: 3_600, burst: 1_000 }),
            ("partner", "standard", LimitSpec { requests: 500, window_secs: 3_600, burst: 50 }),
            ("partner", "premium", LimitSpec { requests: 2_000, window_secs: 3_600, burst: 200 }),
        ];
        for (scope, tier, spec) in entries {
            tiers.insert((scope.into(), tier.into()), spec);
        }
        Self {
            enabled: true,
            default: LimitSpec {
                requests: 100,
                window_secs: 3_600,
                burst: 10,
            },
            tiers,
        }
    }
}

impl RateLimitConfig {
    /// Resolve the budget for a context type and subscription tier.
    pub fn resolve(&self, context_type: ContextType, tier: &str) -> LimitSpec {
        let scope = context_type.rate_scope();
        self.tiers
            .get(&(scope.to_string(), tier.to_string()))
            .or_else(|| self.tiers.get(&(scope.to_string(), "standard".to_string())))
            .copied()
            .unwrap_or(self.default)
    }

    /// Read `VERSA_RATE_LIMIT_ENABLED` plus per-tier overrides of the
    /// form `VERSA_RATE_LIMIT_<SCOPE>_<TIER>=requests/window/burst`
    /// (e.g. `VERSA_RATE_LIMIT_ENTERPRISE_PREMIUM=5000/3600/500`) and
    /// `VERSA_RATE_LIMIT_DEFAULT`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("VERSA_RATE_LIMIT_ENABLED") {
            config.enabled = matches!(raw.as_str(), "1" | "true" | "yes");
        }
        if let Some(spec) = read_spec_env("VERSA_RATE_LIMIT_DEFAULT") {
            config.default = spec;
        }
        for scope in ["enterprise", "partner"] {
            for tier in ["standard", "premium", "enterprise"] {
                let var = format!(
                    "VERSA_RATE_LIMIT_{}_{}",
                    scope.to_uppercase(),
                    tier.to_uppercase()
                );
                if let Some(spec) = read_spec_env(&var) {
                    config.tiers.insert((scope.into(), tier.into()), spec);
                }
            }
        }
        config
    }
}

fn read_spec_env(var: &str) -> Option<LimitSpec> {
    let raw = std::env::var(var).ok()?;
    match parse_spec(&raw) {
        Some(spec) => Some(spec),
        None => {
            tracing::warn!(var = %var, value = %raw, "invalid rate limit spec, ignoring");
            None
        }
    }
}

fn parse_spec(raw: &str) -> Option<LimitSpec> {
    let mut parts = raw.split('/');
    let requests = parts.next()?.trim().parse().ok()?;
    let window_secs = parts.next()?.trim().parse().ok()?;
    let burst = match parts.next() {
        Some(part) => part.trim().parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(LimitSpec {
        requests,
        window_secs,
        burst,
    })
}
