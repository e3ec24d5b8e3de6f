mod middleware;
mod sections;
mod showrooms;
mod trade;

use std::sync::Arc;

use axum::Router;

use account::service::AccountService;

use crate::service::ShowroomService;

/// Shared application state: the showroom service plus the account
/// service backing the email-verified gate.
#[derive(Clone)]
pub struct AppState {
    pub svc: Arc<ShowroomService>,
    pub account: Arc<AccountService>,
}

/// Build the complete showroom API router, nested under `/showrooms`.
///
/// Every route requires an authenticated, active, email-verified user;
/// the server-level JWT middleware supplies the claims and the
/// `require_verified` layer enforces the rest.
pub fn build_router(svc: Arc<ShowroomService>, account: Arc<AccountService>) -> Router {
    let state = AppState { svc, account };

    let api = Router::new()
        .merge(showrooms::routes())
        .merge(sections::routes())
        .merge(trade::routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_verified,
        ));

    Router::new().nest("/showrooms", api).with_state(state)
}
