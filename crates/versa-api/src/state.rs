//! Shared application state.

use std::sync::Arc;

use versa_auth::config::AuthConfig;
use versa_auth::context::ContextService;
use versa_auth::permissions::PermissionResolver;
use versa_auth::ratelimit::RateLimiter;
use versa_auth::screens::ScreenGuard;
use versa_store::MemoryStore;

pub struct AppState {
    pub store: MemoryStore,
    pub auth_config: AuthConfig,
    pub service: ContextService<MemoryStore, MemoryStore>,
    pub limiter: RateLimiter<MemoryStore>,
    pub guard: ScreenGuard<MemoryStore, MemoryStore>,
    pub resolver: PermissionResolver<MemoryStore>,
}

pub type SharedState = Arc<AppState>;
