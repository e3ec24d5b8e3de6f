use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, middleware::Next};
use serde_json::json;

use crate::api::AppState;

/// Paths that don't require authentication.
const PUBLIC_PATHS: &[&str] = &[
    "/account/register",
    "/account/login",
    "/account/token/refresh",
    "/account/password/reset",
    "/account/email/verify/",
    "/health",
    "/version",
];

/// JWT authentication middleware.
///
/// Checks for a Bearer token in the Authorization header. Public paths
/// (register, login, refresh, reset, verify links) are excluded.
/// Valid claims are stored as an Extension for handlers to access via
/// `Extension<Claims>`.
pub async fn auth_middleware(
    State(svc): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    if is_public_path(&path) {
        return next.run(req).await;
    }

    let token = match extract_bearer(req.headers()) {
        Some(t) => t.to_string(),
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"code": "UNAUTHENTICATED", "message": "missing authorization header"})),
            )
                .into_response();
        }
    };

    match svc.verify_token(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"code": "UNAUTHENTICATED", "message": e.to_string()})),
        )
            .into_response(),
    }
}

/// Extract the Bearer token from the Authorization header.
fn extract_bearer(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Check if a path is public (no auth required).
fn is_public_path(path: &str) -> bool {
    for prefix in PUBLIC_PATHS {
        if path.starts_with(prefix) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_path_matching() {
        assert!(is_public_path("/account/login"));
        assert!(is_public_path("/account/password/reset/confirm"));
        assert!(is_public_path("/account/email/verify/u1/some-token"));
        assert!(is_public_path("/health"));

        // The send endpoint is not covered by the verify-link prefix.
        assert!(!is_public_path("/account/email/verification"));
        assert!(!is_public_path("/account/password/change"));
        assert!(!is_public_path("/showrooms"));
    }

    #[test]
    fn bearer_extraction() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));

        headers.insert("authorization", "Basic dXNlcg==".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);
    }
}
