use axum::extract::State;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};

use dealerdesk_core::ServiceError;

use crate::api::AppState;
use crate::model::{ChangeEmail, Claims, UpdateProfile};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/email/change", post(change_email))
}

async fn get_profile(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc.get_user(&claims.sub).map_err(ServiceError::from)?;
    Ok(Json(user.sanitized()))
}

async fn update_profile(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<UpdateProfile>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc
        .update_profile(&claims.sub, input)
        .map_err(ServiceError::from)?;
    Ok(Json(user.sanitized()))
}

async fn change_email(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<ChangeEmail>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc
        .change_email(&claims.sub, input)
        .map_err(ServiceError::from)?;
    Ok(Json(user.sanitized()))
}
