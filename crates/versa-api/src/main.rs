//! VERSA API server — application entry point.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use versa_auth::config::{AuthConfig, RateLimitConfig};
use versa_auth::context::ContextService;
use versa_auth::permissions::PermissionResolver;
use versa_auth::ratelimit::RateLimiter;
use versa_auth::screens::{AllowAllFeatures, ScreenAccessPolicy, ScreenGuard};
use versa_auth::AuditRecorder;
use versa_cache::CacheConfig;
use versa_store::MemoryStore;

mod error;
mod middleware;
mod routes;
mod seed;
mod state;

use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("versa=info".parse().unwrap()))
        .json()
        .init();

    tracing::info!("Starting VERSA API server...");

    let auth_config = AuthConfig::from_env();
    if auth_config.jwt_private_key_pem.is_empty() || auth_config.jwt_public_key_pem.is_empty() {
        tracing::error!(
            "VERSA_JWT_PRIVATE_KEY_PEM / VERSA_JWT_PUBLIC_KEY_PEM must be set (Ed25519 PEM)"
        );
        std::process::exit(1);
    }

    let cache_config = CacheConfig::from_env();
    let cache = match versa_cache::connect(&cache_config).await {
        Ok(cache) => cache,
        Err(e) => {
            tracing::error!(error = %e, "cache backend unavailable");
            std::process::exit(1);
        }
    };

    let store = MemoryStore::new();
    if std::env::var("VERSA_SEED_DEMO").is_ok_and(|v| v == "1") {
        if let Err(e) = seed::seed_demo_data(&store).await {
            tracing::error!(error = %e, "demo seed failed");
        }
    }

    let audit = AuditRecorder::spawn(store.clone());
    let service = ContextService::new(
        store.clone(),
        store.clone(),
        cache.clone(),
        auth_config.clone(),
        audit.clone(),
    );
    let limiter = RateLimiter::new(cache.clone(), store.clone(), RateLimitConfig::from_env());
    let guard = ScreenGuard::new(
        ScreenAccessPolicy::builtin(),
        store.clone(),
        store.clone(),
        AllowAllFeatures,
        audit,
    );
    let resolver = PermissionResolver::new(store.clone());

    let state = Arc::new(AppState {
        store,
        auth_config,
        service,
        limiter,
        guard,
        resolver,
    });

    let app = Router::new()
        .route("/auth/contexts", get(routes::list_contexts))
        .route("/auth/context/switch", post(routes::switch_context))
        .route("/auth/screens/{screen}", get(routes::check_screen))
        .route("/auth/permissions/check", get(routes::check_permission))
        .route("/audit", get(routes::list_audit))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .route("/auth/login", post(routes::login))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = std::env::var("VERSA_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "bind failed");
            std::process::exit(1);
        }
    };
    tracing::info!(addr = %addr, "listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
    }
}
