use dealerdesk_core::{ListParams, ListResult, ServiceError, merge_patch, new_id, new_slug, now_rfc3339};
use dealerdesk_sql::Value;

use crate::model::{CreateDealer, Dealer, Showroom};
use crate::service::{ShowroomService, validate_required};

impl ShowroomService {
    /// Add a dealer to a showroom. Names are unique within the showroom.
    pub fn create_dealer(
        &self,
        showroom: &Showroom,
        input: CreateDealer,
    ) -> Result<Dealer, ServiceError> {
        validate_required("name", &input.name)?;
        let name = input.name.trim().to_string();

        self.insert_with_slug_retry("dealers", || {
            let now = now_rfc3339();
            let dealer = Dealer {
                id: new_id(),
                slug: new_slug("dealer", &[&name]),
                name: name.clone(),
                is_active: input.is_active,
                showroom_id: showroom.id.clone(),
                created_at: now.clone(),
                updated_at: now.clone(),
            };
            let indexes = vec![
                ("slug", Value::Text(dealer.slug.clone())),
                ("showroom_id", Value::Text(dealer.showroom_id.clone())),
                ("name", Value::Text(dealer.name.clone())),
                ("is_active", Value::Integer(i64::from(dealer.is_active))),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ];
            (dealer.id.clone(), dealer, indexes)
        })
        .map_err(|e| match e {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict(format!("dealer '{}' already exists", name))
            }
            other => other,
        })
    }

    pub fn get_dealer(&self, showroom: &Showroom, slug: &str) -> Result<Dealer, ServiceError> {
        self.get_scoped("dealers", "dealer", slug, &showroom.id)
    }

    pub fn list_dealers(
        &self,
        showroom: &Showroom,
        params: &ListParams,
    ) -> Result<ListResult<Dealer>, ServiceError> {
        let (items, total) = self.list_records(
            "dealers",
            &[("showroom_id", Value::Text(showroom.id.clone()))],
            params,
        )?;
        Ok(ListResult { items, total })
    }

    /// Update a dealer with JSON merge-patch semantics.
    pub fn update_dealer(
        &self,
        showroom: &Showroom,
        slug: &str,
        patch: serde_json::Value,
    ) -> Result<Dealer, ServiceError> {
        let current = self.get_dealer(showroom, slug)?;
        let now = now_rfc3339();

        let mut base = serde_json::to_value(&current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        merge_patch(&mut base, &patch);
        base["id"] = serde_json::json!(current.id);
        base["slug"] = serde_json::json!(current.slug);
        base["showroom_id"] = serde_json::json!(current.showroom_id);
        base["created_at"] = serde_json::json!(current.created_at);
        base["updated_at"] = serde_json::json!(now);

        let updated: Dealer = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        validate_required("name", &updated.name)?;

        self.update_record(
            "dealers",
            &updated.id,
            &updated,
            &[
                ("name", Value::Text(updated.name.clone())),
                ("is_active", Value::Integer(i64::from(updated.is_active))),
                ("updated_at", Value::Text(now)),
            ],
        )
        .map_err(|e| match e {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict(format!("dealer '{}' already exists", updated.name))
            }
            other => other,
        })?;
        Ok(updated)
    }

    /// Delete a dealer. Refused while supplies reference it.
    pub fn delete_dealer(&self, showroom: &Showroom, slug: &str) -> Result<(), ServiceError> {
        let dealer = self.get_dealer(showroom, slug)?;

        let rows = self.sql
            .query(
                "SELECT COUNT(*) AS cnt FROM supplies WHERE dealer_id = ?1",
                &[Value::Text(dealer.id.clone())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let supplies = rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0);
        if supplies > 0 {
            return Err(ServiceError::Conflict(format!(
                "dealer '{}' has {} supplies and cannot be deleted",
                dealer.name, supplies
            )));
        }

        self.delete_record("dealers", &dealer.id)
    }
}
