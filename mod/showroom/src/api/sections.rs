use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};

use account::model::Claims;
use dealerdesk_core::{ListParams, ServiceError};

use crate::api::AppState;
use crate::api::showrooms::StatsQuery;
use crate::model::Section;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{slug}/{section}", get(list_section).post(create_in_section))
        .route("/{slug}/{section}/statistics", get(section_statistics))
        .route(
            "/{slug}/{section}/{object_slug}",
            get(get_object).put(update_object).delete(delete_object),
        )
        .route(
            "/{slug}/{section}/{object_slug}/statistics",
            get(object_statistics),
        )
}

/// An unknown section name is a missing resource, same as an unknown slug.
fn parse_section(name: &str) -> Result<Section, ServiceError> {
    Section::from_name(name)
        .ok_or_else(|| ServiceError::NotFound(format!("unknown section '{}'", name)))
}

async fn list_section(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((slug, section)): Path<(String, String)>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let section = parse_section(&section)?;
    let showroom = state.svc.get_showroom_for_owner(&slug, &claims.sub)?;

    let result = state.svc.section_list(&showroom, section, &params)?;
    let statistics = state.svc.section_statistics(&showroom, section, None, false)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
        "statistics": statistics,
    })))
}

async fn create_in_section(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((slug, section)): Path<(String, String)>,
    Json(payload): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let section = parse_section(&section)?;
    let showroom = state.svc.get_showroom_for_owner(&slug, &claims.sub)?;

    let created = state.svc.section_create(&showroom, section, payload)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_object(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((slug, section, object_slug)): Path<(String, String, String)>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let section = parse_section(&section)?;
    let showroom = state.svc.get_showroom_for_owner(&slug, &claims.sub)?;

    let item = state.svc.section_get(&showroom, section, &object_slug)?;
    let statistics = state
        .svc
        .section_statistics(&showroom, section, Some(&object_slug), false)?;
    Ok(Json(serde_json::json!({
        "item": item,
        "statistics": statistics,
    })))
}

async fn update_object(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((slug, section, object_slug)): Path<(String, String, String)>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let section = parse_section(&section)?;
    let showroom = state.svc.get_showroom_for_owner(&slug, &claims.sub)?;

    let updated = state
        .svc
        .section_update(&showroom, section, &object_slug, patch)?;
    Ok(Json(updated))
}

async fn delete_object(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((slug, section, object_slug)): Path<(String, String, String)>,
) -> Result<StatusCode, ServiceError> {
    let section = parse_section(&section)?;
    let showroom = state.svc.get_showroom_for_owner(&slug, &claims.sub)?;

    state.svc.section_delete(&showroom, section, &object_slug)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn section_statistics(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((slug, section)): Path<(String, String)>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let section = parse_section(&section)?;
    let showroom = state.svc.get_showroom_for_owner(&slug, &claims.sub)?;

    let statistics = state
        .svc
        .section_statistics(&showroom, section, None, query.verbose)?;
    let body = serde_json::to_value(statistics)
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    Ok(Json(body))
}

async fn object_statistics(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((slug, section, object_slug)): Path<(String, String, String)>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let section = parse_section(&section)?;
    let showroom = state.svc.get_showroom_for_owner(&slug, &claims.sub)?;

    let statistics =
        state
            .svc
            .section_statistics(&showroom, section, Some(&object_slug), query.verbose)?;
    let body = serde_json::to_value(statistics)
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    Ok(Json(body))
}
