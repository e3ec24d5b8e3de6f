pub mod password;
pub mod schema;
pub mod session;
pub mod token;
pub mod user;
pub mod verify;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use dealerdesk_sql::{SQLStore, Value};

use crate::mailing::Mailing;

/// Account service error type.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<AccountError> for dealerdesk_core::ServiceError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::NotFound(m) => dealerdesk_core::ServiceError::NotFound(m),
            AccountError::Conflict(m) => dealerdesk_core::ServiceError::Conflict(m),
            AccountError::Validation(m) => dealerdesk_core::ServiceError::Validation(m),
            AccountError::Unauthorized(m) => dealerdesk_core::ServiceError::Unauthorized(m),
            AccountError::Forbidden(m) => dealerdesk_core::ServiceError::PermissionDenied(m),
            AccountError::Storage(m) => dealerdesk_core::ServiceError::Storage(m),
            AccountError::Internal(m) => dealerdesk_core::ServiceError::Internal(m),
        }
    }
}

/// Configuration for the account service.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 24h).
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds (default: 7 days).
    pub refresh_token_ttl: i64,
    /// Email verification token lifetime in seconds (default: 3 days).
    pub verify_token_ttl: i64,
    /// Password reset token lifetime in seconds (default: 1h).
    pub reset_token_ttl: i64,
    /// Minimum pause between verification emails in seconds (default: 60).
    pub verification_cooldown: i64,
    /// Base URL used in emailed links.
    pub site_url: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dealerdesk-dev-secret-change-me".to_string(),
            access_token_ttl: 86400,        // 24h
            refresh_token_ttl: 604800,      // 7 days
            verify_token_ttl: 259200,       // 3 days
            reset_token_ttl: 3600,          // 1h
            verification_cooldown: 60,
            site_url: "http://localhost:8080".to_string(),
        }
    }
}

/// The account service. Holds the SQL store, mail dispatcher and configuration.
pub struct AccountService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) mailing: Mailing,
    pub(crate) config: AccountConfig,
}

impl AccountService {
    /// Create a new AccountService, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        mailing: Mailing,
        config: AccountConfig,
    ) -> Result<Arc<Self>, AccountError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self {
            sql,
            mailing,
            config,
        }))
    }

    // ── Generic CRUD helpers ──

    /// Insert a record as JSON into a table with indexed columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), AccountError> {
        let json = serde_json::to_string(record)
            .map_err(|e| AccountError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 3;
            cols.push(col);
            placeholders.push(format!("?{}", idx));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") {
                AccountError::Conflict(msg)
            } else {
                AccountError::Storage(msg)
            }
        })?;

        Ok(())
    }

    /// Get a record by id, deserializing the JSON `data` column.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, AccountError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        let rows = self.sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| AccountError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| AccountError::NotFound(format!("{}/{}", table, id)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| AccountError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| AccountError::Internal(e.to_string()))
    }

    /// Update a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), AccountError> {
        let json = serde_json::to_string(record)
            .map_err(|e| AccountError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            sets.join(", "),
            id_idx,
        );

        let affected = self.sql.exec(&sql, &params).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") {
                AccountError::Conflict(msg)
            } else {
                AccountError::Storage(msg)
            }
        })?;

        if affected == 0 {
            return Err(AccountError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use dealerdesk_sql::SqliteStore;

    use crate::mailing::{Mailing, RecordingMailer};

    use super::{AccountConfig, AccountService};

    /// In-memory service with a recording mailer for tests.
    pub fn test_service() -> (Arc<AccountService>, Arc<RecordingMailer>) {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let mailer = Arc::new(RecordingMailer::new());
        let svc = AccountService::new(
            sql,
            Mailing::new(mailer.clone()),
            AccountConfig::default(),
        )
        .unwrap();
        (svc, mailer)
    }
}
