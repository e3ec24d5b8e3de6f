//! Route registration — collects all module routes + system endpoints.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;

use account::service::AccountService;

/// Build the complete router with all routes.
///
/// Module routers arrive already nested under their own prefixes; the
/// JWT middleware wraps everything and skips the public paths.
pub fn build_router(
    account_service: Arc<AccountService>,
    module_routes: Vec<(&str, Router)>,
) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    for (name, router) in module_routes {
        tracing::info!(module = name, "mounting module routes");
        app = app.merge(router);
    }

    app.layer(middleware::from_fn_with_state(
        account_service,
        account::api::middleware::auth_middleware,
    ))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "dealerdeskd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
