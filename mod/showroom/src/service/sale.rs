use dealerdesk_core::{ListParams, ListResult, ServiceError, new_id, new_slug, now_rfc3339};
use dealerdesk_sql::Value;

use crate::model::{CreateSale, CreateSaleItem, ProductSale, ProductSaleItem, Showroom};
use crate::service::ShowroomService;

impl ShowroomService {
    /// Open a sale, optionally credited to an employee of this showroom.
    pub fn create_sale(
        &self,
        showroom: &Showroom,
        input: CreateSale,
    ) -> Result<ProductSale, ServiceError> {
        let employee_id = match &input.employee_slug {
            Some(employee_slug) => Some(self.get_employee(showroom, employee_slug)?.id),
            None => None,
        };

        self.insert_with_slug_retry("sales", || {
            let now = now_rfc3339();
            let sale = ProductSale {
                id: new_id(),
                slug: new_slug("sale", &[&showroom.title]),
                showroom_id: showroom.id.clone(),
                employee_id: employee_id.clone(),
                created_at: now.clone(),
            };
            let mut indexes = vec![
                ("slug", Value::Text(sale.slug.clone())),
                ("showroom_id", Value::Text(sale.showroom_id.clone())),
                ("created_at", Value::Text(now)),
            ];
            match &sale.employee_id {
                Some(id) => indexes.push(("employee_id", Value::Text(id.clone()))),
                None => indexes.push(("employee_id", Value::Null)),
            }
            (sale.id.clone(), sale, indexes)
        })
    }

    pub fn get_sale(&self, showroom: &Showroom, slug: &str) -> Result<ProductSale, ServiceError> {
        self.get_scoped("sales", "sale", slug, &showroom.id)
    }

    pub fn list_sales(
        &self,
        showroom: &Showroom,
        params: &ListParams,
    ) -> Result<ListResult<ProductSale>, ServiceError> {
        let (items, total) = self.list_records(
            "sales",
            &[("showroom_id", Value::Text(showroom.id.clone()))],
            params,
        )?;
        Ok(ListResult { items, total })
    }

    /// Re-credit a sale. The only patchable field is `employee_slug`
    /// (null clears the credit); everything else on a sale is history.
    pub fn update_sale(
        &self,
        showroom: &Showroom,
        slug: &str,
        patch: serde_json::Value,
    ) -> Result<ProductSale, ServiceError> {
        let mut sale = self.get_sale(showroom, slug)?;

        match patch.get("employee_slug") {
            Some(serde_json::Value::Null) => sale.employee_id = None,
            Some(serde_json::Value::String(employee_slug)) => {
                sale.employee_id = Some(self.get_employee(showroom, employee_slug)?.id);
            }
            Some(_) => {
                return Err(ServiceError::Validation(
                    "employee_slug must be a string or null".into(),
                ));
            }
            None => {}
        }

        let employee_index = match &sale.employee_id {
            Some(id) => Value::Text(id.clone()),
            None => Value::Null,
        };
        self.update_record("sales", &sale.id, &sale, &[("employee_id", employee_index)])?;
        Ok(sale)
    }

    /// Delete a sale and its items.
    pub fn delete_sale(&self, showroom: &Showroom, slug: &str) -> Result<(), ServiceError> {
        let sale = self.get_sale(showroom, slug)?;

        self.sql
            .exec(
                "DELETE FROM sale_items WHERE sale_id = ?1",
                &[Value::Text(sale.id.clone())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        self.delete_record("sales", &sale.id)
    }

    /// Add an item to an existing sale. Same stock semantics as selling
    /// through the product endpoint.
    pub fn add_sale_item(
        &self,
        showroom: &Showroom,
        sale_slug: &str,
        input: CreateSaleItem,
    ) -> Result<ProductSaleItem, ServiceError> {
        let sale = self.get_sale(showroom, sale_slug)?;
        let product = self.get_product(showroom, &input.product_slug)?;
        self.record_sold_item(&product, &sale, input.quantity, input.sale_price)
    }

    /// List the items of a sale, oldest first.
    pub fn list_sale_items(
        &self,
        showroom: &Showroom,
        sale_slug: &str,
    ) -> Result<Vec<ProductSaleItem>, ServiceError> {
        let sale = self.get_sale(showroom, sale_slug)?;

        let rows = self.sql
            .query(
                "SELECT data FROM sale_items WHERE sale_id = ?1 ORDER BY created_at ASC",
                &[Value::Text(sale.id)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            if let Some(data) = row.get_str("data") {
                let item: ProductSaleItem = serde_json::from_str(data)
                    .map_err(|e| ServiceError::Internal(e.to_string()))?;
                items.push(item);
            }
        }
        Ok(items)
    }
}
