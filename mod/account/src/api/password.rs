use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Extension, Json, Router};

use dealerdesk_core::ServiceError;

use crate::api::AppState;
use crate::model::{ChangePassword, Claims, ResetConfirm, ResetRequest};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/password/change", post(change_password))
        .route("/password/reset", post(request_reset))
        .route("/password/reset/confirm", post(confirm_reset))
}

async fn change_password(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<ChangePassword>,
) -> Result<StatusCode, ServiceError> {
    svc.change_password(&claims.sub, input)
        .map_err(ServiceError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn request_reset(
    State(svc): State<AppState>,
    Json(input): Json<ResetRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    svc.request_password_reset(&input.email)
        .map_err(ServiceError::from)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({"status": "ok"})),
    ))
}

async fn confirm_reset(
    State(svc): State<AppState>,
    Json(input): Json<ResetConfirm>,
) -> Result<StatusCode, ServiceError> {
    svc.confirm_password_reset(input)
        .map_err(ServiceError::from)?;
    Ok(StatusCode::NO_CONTENT)
}
