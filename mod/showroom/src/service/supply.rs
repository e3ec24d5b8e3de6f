use dealerdesk_core::{ListParams, ListResult, ServiceError, new_id, new_slug, now_rfc3339};
use dealerdesk_sql::Value;

use crate::model::{CreateSupply, CreateSupplyItem, ProductSupply, ProductSupplyItem, Showroom};
use crate::service::{ShowroomService, validate_non_negative, validate_positive};

impl ShowroomService {
    /// Record a supply from a dealer of this showroom.
    pub fn create_supply(
        &self,
        showroom: &Showroom,
        input: CreateSupply,
    ) -> Result<ProductSupply, ServiceError> {
        let dealer = self.get_dealer(showroom, &input.dealer_slug)?;

        self.insert_with_slug_retry("supplies", || {
            let now = now_rfc3339();
            let supply = ProductSupply {
                id: new_id(),
                slug: new_slug("supply", &[&showroom.title]),
                showroom_id: showroom.id.clone(),
                dealer_id: dealer.id.clone(),
                created_at: now.clone(),
            };
            let indexes = vec![
                ("slug", Value::Text(supply.slug.clone())),
                ("showroom_id", Value::Text(supply.showroom_id.clone())),
                ("dealer_id", Value::Text(supply.dealer_id.clone())),
                ("created_at", Value::Text(now)),
            ];
            (supply.id.clone(), supply, indexes)
        })
    }

    pub fn get_supply(
        &self,
        showroom: &Showroom,
        slug: &str,
    ) -> Result<ProductSupply, ServiceError> {
        self.get_scoped("supplies", "supply", slug, &showroom.id)
    }

    pub fn list_supplies(
        &self,
        showroom: &Showroom,
        params: &ListParams,
    ) -> Result<ListResult<ProductSupply>, ServiceError> {
        let (items, total) = self.list_records(
            "supplies",
            &[("showroom_id", Value::Text(showroom.id.clone()))],
            params,
        )?;
        Ok(ListResult { items, total })
    }

    /// Re-attribute a supply to another dealer of the same showroom.
    pub fn update_supply(
        &self,
        showroom: &Showroom,
        slug: &str,
        patch: serde_json::Value,
    ) -> Result<ProductSupply, ServiceError> {
        let mut supply = self.get_supply(showroom, slug)?;

        match patch.get("dealer_slug") {
            Some(serde_json::Value::String(dealer_slug)) => {
                supply.dealer_id = self.get_dealer(showroom, dealer_slug)?.id;
            }
            Some(_) => {
                return Err(ServiceError::Validation("dealer_slug must be a string".into()));
            }
            None => {}
        }

        self.update_record(
            "supplies",
            &supply.id,
            &supply,
            &[("dealer_id", Value::Text(supply.dealer_id.clone()))],
        )?;
        Ok(supply)
    }

    /// Delete a supply and its items.
    pub fn delete_supply(&self, showroom: &Showroom, slug: &str) -> Result<(), ServiceError> {
        let supply = self.get_supply(showroom, slug)?;

        self.sql
            .exec(
                "DELETE FROM supply_items WHERE supply_id = ?1",
                &[Value::Text(supply.id.clone())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        self.delete_record("supplies", &supply.id)
    }

    /// Add an item to a supply. Stock is bookkeeping-only here: supplies
    /// feed the statistics, they do not move inventory.
    pub fn add_supply_item(
        &self,
        showroom: &Showroom,
        supply_slug: &str,
        input: CreateSupplyItem,
    ) -> Result<ProductSupplyItem, ServiceError> {
        let supply = self.get_supply(showroom, supply_slug)?;
        let product = self.get_product(showroom, &input.product_slug)?;
        validate_positive("quantity", input.quantity)?;
        validate_non_negative("supply price", input.supply_price)?;

        self.insert_with_slug_retry("supply_items", || {
            let now = now_rfc3339();
            let item = ProductSupplyItem {
                id: new_id(),
                slug: new_slug("supply-item", &[&product.title]),
                supply_id: supply.id.clone(),
                product_id: product.id.clone(),
                quantity: input.quantity,
                supply_price: input.supply_price,
                created_at: now.clone(),
            };
            let indexes = vec![
                ("slug", Value::Text(item.slug.clone())),
                ("supply_id", Value::Text(item.supply_id.clone())),
                ("product_id", Value::Text(item.product_id.clone())),
                ("quantity", Value::Integer(item.quantity)),
                ("supply_price", Value::Integer(item.supply_price)),
                ("created_at", Value::Text(now)),
            ];
            (item.id.clone(), item, indexes)
        })
    }

    /// List the items of a supply, oldest first.
    pub fn list_supply_items(
        &self,
        showroom: &Showroom,
        supply_slug: &str,
    ) -> Result<Vec<ProductSupplyItem>, ServiceError> {
        let supply = self.get_supply(showroom, supply_slug)?;

        let rows = self.sql
            .query(
                "SELECT data FROM supply_items WHERE supply_id = ?1 ORDER BY created_at ASC",
                &[Value::Text(supply.id)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            if let Some(data) = row.get_str("data") {
                let item: ProductSupplyItem = serde_json::from_str(data)
                    .map_err(|e| ServiceError::Internal(e.to_string()))?;
                items.push(item);
            }
        }
        Ok(items)
    }
}
