use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde::Deserialize;

use dealerdesk_core::ServiceError;

use crate::api::AppState;
use crate::model::{Claims, CreateAccount, Credentials, TokenPair};
use crate::service::session::ClientInfo;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/token/refresh", post(refresh))
}

async fn register(
    State(svc): State<AppState>,
    Json(input): Json<CreateAccount>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let user = svc.register(input).map_err(ServiceError::from)?;
    Ok((StatusCode::CREATED, Json(user.sanitized())))
}

async fn login(
    State(svc): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<Credentials>,
) -> Result<Json<TokenPair>, ServiceError> {
    let tokens = svc
        .login(input, client_info(&headers))
        .map_err(ServiceError::from)?;
    Ok(Json(tokens))
}

async fn logout(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ServiceError> {
    svc.revoke_session(&claims.sid).map_err(ServiceError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

async fn refresh(
    State(svc): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ServiceError> {
    let tokens = svc
        .refresh_tokens(&input.refresh_token)
        .map_err(ServiceError::from)?;
    Ok(Json(tokens))
}

/// Client details for the session record and the sign-in notification.
///
/// The forwarded-for chain may be spoofed up to the last hop, so only
/// the final entry is trusted.
fn client_info(headers: &HeaderMap) -> ClientInfo {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next_back())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    ClientInfo {
        ip_address,
        user_agent,
    }
}
