//! Web middleware.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use crate::state::AppState;

/// Name of the session cookie issued by the external auth service.
const SESSION_COOKIE: &str = "session";

/// Authentication middleware.
///
/// Resolves the session cookie (or a bearer token) to a user and
/// stores it in the request extensions. Anonymous requests pass
/// through untouched; login-required handlers reject via [`AuthUser`].
///
/// [`AuthUser`]: crate::extractors::AuthUser
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(ToString::to_string)
        });

    if let Some(token) = token
        && let Ok(Some(user)) = state.user_service.authenticate_by_token(&token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
