use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};

use dealerdesk_core::ServiceError;

use crate::api::AppState;
use crate::model::Claims;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/email/verification", post(send_verification))
        // Public: reached from the emailed link, possibly before login.
        .route("/email/verify/{uid}/{token}", get(check_verification))
}

async fn send_verification(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    svc.send_verification_email(&claims.sub)
        .map_err(ServiceError::from)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({"status": "sent"})),
    ))
}

async fn check_verification(
    State(svc): State<AppState>,
    Path((uid, token)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let outcome = svc.verify_email(&uid, &token).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"status": outcome.as_str()})))
}
