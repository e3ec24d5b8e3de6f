mod auth;
mod email;
pub mod middleware;
mod password;
mod profile;

use std::sync::Arc;

use axum::Router;

use crate::service::AccountService;

/// Shared application state.
pub type AppState = Arc<AccountService>;

/// Build the complete account API router, nested under `/account`.
///
/// Authentication is enforced by the server-level JWT middleware
/// (see [`middleware::auth_middleware`]), which skips the public paths.
pub fn build_router(svc: Arc<AccountService>) -> Router {
    let api = Router::new()
        .merge(auth::routes())
        .merge(profile::routes())
        .merge(password::routes())
        .merge(email::routes());

    Router::new().nest("/account", api).with_state(svc)
}
