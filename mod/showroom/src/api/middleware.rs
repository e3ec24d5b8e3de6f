use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{http::Request, middleware::Next};

use account::model::Claims;
use dealerdesk_core::ServiceError;

use crate::api::AppState;

/// Gate for the whole showroom subtree: the caller must be
/// authenticated (claims injected by the server-level JWT middleware),
/// active, and email-verified. The check reads the user's current
/// state, so revoking verification takes effect immediately, not at
/// token expiry.
pub async fn require_verified(
    State(state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(claims) = req.extensions().get::<Claims>().cloned() else {
        return ServiceError::Unauthorized("missing credentials".into()).into_response();
    };

    match state.account.require_verified(&claims.sub) {
        Ok(_) => next.run(req).await,
        Err(e) => ServiceError::from(e).into_response(),
    }
}
