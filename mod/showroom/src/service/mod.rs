pub mod category;
pub mod dealer;
pub mod employee;
pub mod product;
pub mod sale;
pub mod schema;
pub mod section;
pub mod showroom;
pub mod statistics;
pub mod supply;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use dealerdesk_core::{ListParams, ServiceError};
use dealerdesk_sql::{SQLStore, Value};

/// How many times a create retries with a fresh slug suffix before
/// giving up and surfacing the conflict.
const SLUG_RETRIES: usize = 3;

/// Showroom service — holds the SQL store and provides all tenant CRUD
/// and statistics logic.
pub struct ShowroomService {
    pub(crate) sql: Arc<dyn SQLStore>,
}

impl ShowroomService {
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Arc<Self>, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql }))
    }

    // ── Generic CRUD helpers ──

    /// Insert a record as JSON into a table with indexed columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

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
                ServiceError::Conflict(msg)
            } else {
                ServiceError::Storage(msg)
            }
        })?;

        Ok(())
    }

    /// Insert with bounded retry on slug collisions.
    ///
    /// `build` produces a fresh record (with a newly generated slug) per
    /// attempt; only UNIQUE violations on the slug column retry — any
    /// other conflict surfaces immediately.
    pub(crate) fn insert_with_slug_retry<T, F>(
        &self,
        table: &str,
        mut build: F,
    ) -> Result<T, ServiceError>
    where
        T: Serialize,
        F: FnMut() -> (String, T, Vec<(&'static str, Value)>),
    {
        let mut attempt = 0;
        loop {
            let (id, record, indexes) = build();
            match self.insert_record(table, &id, &record, &indexes) {
                Ok(()) => return Ok(record),
                Err(ServiceError::Conflict(msg))
                    if msg.contains(".slug") && attempt + 1 < SLUG_RETRIES =>
                {
                    attempt += 1;
                    tracing::debug!(table, attempt, "slug collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Get a tenant-scoped record by slug. A miss — wrong slug or wrong
    /// showroom — is plain NotFound either way.
    pub(crate) fn get_scoped<T: DeserializeOwned>(
        &self,
        table: &str,
        noun: &str,
        slug: &str,
        showroom_id: &str,
    ) -> Result<T, ServiceError> {
        let sql = format!(
            "SELECT data FROM {} WHERE slug = ?1 AND showroom_id = ?2",
            table
        );
        let rows = self.sql
            .query(
                &sql,
                &[
                    Value::Text(slug.to_string()),
                    Value::Text(showroom_id.to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("{} '{}' not found", noun, slug)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Update a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

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
                ServiceError::Conflict(msg)
            } else {
                ServiceError::Storage(msg)
            }
        })?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }

    /// Delete a record by id.
    pub(crate) fn delete_record(&self, table: &str, id: &str) -> Result<(), ServiceError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table);
        let affected = self.sql
            .exec(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }

    /// List records with optional filters and pagination.
    pub(crate) fn list_records<T: DeserializeOwned + Serialize>(
        &self,
        table: &str,
        filters: &[(&str, Value)],
        params: &ListParams,
    ) -> Result<(Vec<T>, usize), ServiceError> {
        let mut where_clauses = Vec::new();
        let mut bind = Vec::new();

        for (i, (col, val)) in filters.iter().enumerate() {
            let idx = i + 1;
            where_clauses.push(format!("{} = ?{}", col, idx));
            bind.push(val.clone());
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        // Count
        let count_sql = format!("SELECT COUNT(*) as cnt FROM {}{}", table, where_sql);
        let count_rows = self.sql
            .query(&count_sql, &bind)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total = count_rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize;

        // Items
        let limit_idx = bind.len() + 1;
        let offset_idx = bind.len() + 2;
        bind.push(Value::Integer(params.limit as i64));
        bind.push(Value::Integer(params.offset as i64));

        let sql = format!(
            "SELECT data FROM {}{} ORDER BY created_at DESC LIMIT ?{} OFFSET ?{}",
            table, where_sql, limit_idx, offset_idx,
        );

        let rows = self.sql
            .query(&sql, &bind)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            let item: T =
                serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))?;
            items.push(item);
        }

        Ok((items, total))
    }
}

// ── Field validation ──

pub(crate) fn validate_required(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Loose phone shape check: optional leading +, separators allowed,
/// 5 to 20 digits.
pub(crate) fn validate_phone(value: &str) -> Result<(), ServiceError> {
    let value = value.trim();
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    let shape_ok = value
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || (c == '+' && i == 0) || " -()".contains(c));

    if !shape_ok || !(5..=20).contains(&digits) {
        return Err(ServiceError::Validation(
            "invalid phone number format".into(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_non_negative(field: &str, value: i64) -> Result<(), ServiceError> {
    if value < 0 {
        return Err(ServiceError::Validation(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(())
}

pub(crate) fn validate_positive(field: &str, value: i64) -> Result<(), ServiceError> {
    if value <= 0 {
        return Err(ServiceError::Validation(format!(
            "{} must be positive",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use dealerdesk_sql::SqliteStore;

    use crate::model::{CreateShowroom, Showroom};

    use super::ShowroomService;

    pub fn test_service() -> Arc<ShowroomService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        ShowroomService::new(sql).unwrap()
    }

    pub fn test_showroom(svc: &ShowroomService, owner_id: &str) -> Showroom {
        svc.create_showroom(
            owner_id,
            CreateShowroom {
                title: "Alfa Motors".to_string(),
                phone_number: "+1 555 0100".to_string(),
            },
        )
        .unwrap()
    }
}
