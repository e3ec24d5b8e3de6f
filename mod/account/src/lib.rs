//! Account module — registration, password auth, sessions, email verification.
//!
//! # Resources
//!
//! - **User** — showroom owner identity with a verification flag
//! - **Session** — JWT issuance record (revocable)
//! - **EmailNotification** — send history, throttles verification mail
//!
//! # Usage
//!
//! ```ignore
//! use account::{AccountModule, mailing::LogMailer, service::AccountConfig};
//!
//! let module = AccountModule::new(sql, Arc::new(LogMailer), AccountConfig::default())?;
//! let router = module.routes(); // Already nested under /account
//! ```

pub mod api;
pub mod mailing;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use dealerdesk_core::Module;
use dealerdesk_sql::SQLStore;

use crate::mailing::{Mailer, Mailing};
use crate::service::{AccountConfig, AccountService};

/// Account module implementing the Module trait.
pub struct AccountModule {
    service: Arc<AccountService>,
}

impl AccountModule {
    /// Create a new AccountModule with an injected mail transport.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        mailer: Arc<dyn Mailer>,
        config: AccountConfig,
    ) -> Result<Self, dealerdesk_core::ServiceError> {
        let service = AccountService::new(sql, Mailing::new(mailer), config)
            .map_err(dealerdesk_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying AccountService.
    pub fn service(&self) -> &Arc<AccountService> {
        &self.service
    }
}

impl Module for AccountModule {
    fn name(&self) -> &str {
        "account"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
