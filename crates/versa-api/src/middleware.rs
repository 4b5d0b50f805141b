//! Request middleware: bearer authentication and rate limiting.

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use versa_auth::token::{self, Claims};
use versa_core::error::CoreError;

use crate::error::ApiError;
use crate::state::SharedState;

/// Verify the `Authorization: Bearer` token and stash the claims in
/// request extensions. Verification failure is a 401.
pub async fn require_auth(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(CoreError::InvalidToken)?;

    let claims = token::verify(token, &state.auth_config)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Charge the tenant budget and attach the quota headers every
/// rate-limited response carries. Exceeding the budget is a 429 with a
/// retry hint.
pub async fn rate_limit(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(claims) = request.extensions().get::<Claims>().cloned() else {
        // Unauthenticated routes are not rate limited at this layer.
        return next.run(request).await;
    };

    let decision = state.limiter.check_rate_limit(&claims, Some(claims.sub)).await;

    if !decision.allowed {
        let mut response = ApiError(CoreError::RateLimited {
            retry_after_secs: decision.reset_in.as_secs(),
        })
        .into_response();
        apply_quota_headers(&mut response, &decision);
        return response;
    }

    let mut response = next.run(request).await;
    apply_quota_headers(&mut response, &decision);
    response
}

fn apply_quota_headers(response: &mut Response, decision: &versa_auth::RateLimitDecision) {
    let headers = response.headers_mut();
    let pairs = [
        ("x-ratelimit-limit", decision.limit.to_string()),
        ("x-ratelimit-remaining", decision.remaining.to_string()),
        ("x-ratelimit-reset", decision.reset_in.as_secs().to_string()),
    ];
    for (name, value) in pairs {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(name, value);
        }
    }
}
