use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;

use account::model::Claims;
use dealerdesk_core::{ListParams, ServiceError, is_recent};

use crate::api::AppState;
use crate::model::CreateShowroom;

/// Window in which an entity is flagged as recently created.
const RECENT_DAYS: i64 = 7;

/// Query flag shared by the statistics endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatsQuery {
    #[serde(default)]
    pub verbose: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_showrooms).post(create_showroom))
        .route(
            "/{slug}",
            get(get_showroom).put(update_showroom).delete(delete_showroom),
        )
        .route("/{slug}/statistics", get(showroom_statistics))
}

async fn list_showrooms(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = state.svc.list_showrooms(&claims.sub, &params)?;
    let statistics = state.svc.owner_statistics(&claims.sub, false)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
        "statistics": statistics,
    })))
}

async fn create_showroom(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<CreateShowroom>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let showroom = state.svc.create_showroom(&claims.sub, input)?;
    let body = serde_json::to_value(showroom)
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(body)))
}

async fn get_showroom(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let showroom = state.svc.get_showroom_for_owner(&slug, &claims.sub)?;
    let statistics = state.svc.showroom_statistics(&showroom, false)?;
    Ok(Json(serde_json::json!({
        "showroom": showroom,
        "statistics": statistics,
        "is_new": is_recent(&showroom.created_at, RECENT_DAYS),
    })))
}

async fn update_showroom(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let showroom = state.svc.update_showroom(&slug, &claims.sub, patch)?;
    let body = serde_json::to_value(showroom)
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    Ok(Json(body))
}

async fn delete_showroom(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ServiceError> {
    state.svc.delete_showroom(&slug, &claims.sub)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn showroom_statistics(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let showroom = state.svc.get_showroom_for_owner(&slug, &claims.sub)?;
    let statistics = state.svc.showroom_statistics(&showroom, query.verbose)?;
    let body = serde_json::to_value(statistics)
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    Ok(Json(body))
}
