//! Showroom module — tenant-owned dealerships and their sections.
//!
//! # Resources
//!
//! - **Showroom** — the tenant; everything below hangs off it
//! - **Employee / ProductCategory / Product / Dealer** — inventory and staff
//! - **ProductSale + items / ProductSupply + items** — trade history
//!
//! Sections are addressed generically by the model-name path segment
//! (`/showrooms/{slug}/{section}/{object_slug}`), and several entities
//! expose aggregate statistics over their sale/supply history.

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use account::service::AccountService;
use dealerdesk_core::Module;
use dealerdesk_sql::SQLStore;

use crate::service::ShowroomService;

/// Showroom module implementing the Module trait.
///
/// Holds the ShowroomService plus a handle to the account service for
/// the email-verified gate on every route.
pub struct ShowroomModule {
    service: Arc<ShowroomService>,
    account: Arc<AccountService>,
}

impl ShowroomModule {
    pub fn new(
        sql: Arc<dyn SQLStore>,
        account: Arc<AccountService>,
    ) -> Result<Self, dealerdesk_core::ServiceError> {
        let service = ShowroomService::new(sql)?;
        Ok(Self { service, account })
    }

    /// Get a reference to the underlying ShowroomService.
    pub fn service(&self) -> &Arc<ShowroomService> {
        &self.service
    }
}

impl Module for ShowroomModule {
    fn name(&self) -> &str {
        "showroom"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone(), self.account.clone())
    }
}
