use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};

use account::model::Claims;
use dealerdesk_core::ServiceError;

use crate::api::AppState;
use crate::model::{CreateSaleItem, CreateSupplyItem, SellRequest};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{slug}/products/{product_slug}/sell", post(sell_product))
        .route(
            "/{slug}/sales/{sale_slug}/items",
            get(list_sale_items).post(add_sale_item),
        )
        .route(
            "/{slug}/supplies/{supply_slug}/items",
            get(list_supply_items).post(add_supply_item),
        )
}

async fn sell_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((slug, product_slug)): Path<(String, String)>,
    Json(input): Json<SellRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let showroom = state.svc.get_showroom_for_owner(&slug, &claims.sub)?;
    let (sale, item) = state.svc.sell_product(&showroom, &product_slug, input)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"sale": sale, "item": item})),
    ))
}

async fn list_sale_items(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((slug, sale_slug)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let showroom = state.svc.get_showroom_for_owner(&slug, &claims.sub)?;
    let items = state.svc.list_sale_items(&showroom, &sale_slug)?;
    Ok(Json(serde_json::json!({"items": items})))
}

async fn add_sale_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((slug, sale_slug)): Path<(String, String)>,
    Json(input): Json<CreateSaleItem>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let showroom = state.svc.get_showroom_for_owner(&slug, &claims.sub)?;
    let item = state.svc.add_sale_item(&showroom, &sale_slug, input)?;
    let body = serde_json::to_value(item)
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(body)))
}

async fn list_supply_items(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((slug, supply_slug)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let showroom = state.svc.get_showroom_for_owner(&slug, &claims.sub)?;
    let items = state.svc.list_supply_items(&showroom, &supply_slug)?;
    Ok(Json(serde_json::json!({"items": items})))
}

async fn add_supply_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((slug, supply_slug)): Path<(String, String)>,
    Json(input): Json<CreateSupplyItem>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let showroom = state.svc.get_showroom_for_owner(&slug, &claims.sub)?;
    let item = state.svc.add_supply_item(&showroom, &supply_slug, input)?;
    let body = serde_json::to_value(item)
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(body)))
}
