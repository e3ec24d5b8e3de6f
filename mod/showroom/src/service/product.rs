use dealerdesk_core::{ListParams, ListResult, ServiceError, merge_patch, new_id, new_slug, now_rfc3339};
use dealerdesk_sql::Value;

use crate::model::{CreateProduct, CreateSale, Product, ProductSale, ProductSaleItem, SellRequest, Showroom};
use crate::service::{ShowroomService, validate_non_negative, validate_positive, validate_required};

impl ShowroomService {
    /// Add a product to a showroom under an existing category.
    pub fn create_product(
        &self,
        showroom: &Showroom,
        input: CreateProduct,
    ) -> Result<Product, ServiceError> {
        validate_required("title", &input.title)?;
        validate_non_negative("price", input.price)?;
        validate_non_negative("quantity", input.quantity)?;
        let category = self.get_category(showroom, &input.category_slug)?;

        let title = input.title.trim().to_string();

        self.insert_with_slug_retry("products", || {
            let now = now_rfc3339();
            let product = Product {
                id: new_id(),
                slug: new_slug("product", &[&title]),
                title: title.clone(),
                price: input.price,
                quantity: input.quantity,
                category_id: category.id.clone(),
                showroom_id: showroom.id.clone(),
                created_at: now.clone(),
                updated_at: now.clone(),
            };
            let indexes = vec![
                ("slug", Value::Text(product.slug.clone())),
                ("showroom_id", Value::Text(product.showroom_id.clone())),
                ("category_id", Value::Text(product.category_id.clone())),
                ("title", Value::Text(product.title.clone())),
                ("price", Value::Integer(product.price)),
                ("quantity", Value::Integer(product.quantity)),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ];
            (product.id.clone(), product, indexes)
        })
    }

    pub fn get_product(&self, showroom: &Showroom, slug: &str) -> Result<Product, ServiceError> {
        self.get_scoped("products", "product", slug, &showroom.id)
    }

    pub fn list_products(
        &self,
        showroom: &Showroom,
        params: &ListParams,
    ) -> Result<ListResult<Product>, ServiceError> {
        let (items, total) = self.list_records(
            "products",
            &[("showroom_id", Value::Text(showroom.id.clone()))],
            params,
        )?;
        Ok(ListResult { items, total })
    }

    /// Update a product with JSON merge-patch semantics. The category
    /// can be moved by patching `category_slug`.
    pub fn update_product(
        &self,
        showroom: &Showroom,
        slug: &str,
        patch: serde_json::Value,
    ) -> Result<Product, ServiceError> {
        let current = self.get_product(showroom, slug)?;
        let now = now_rfc3339();

        let mut patch = patch;
        let new_category = match patch.get("category_slug").and_then(|v| v.as_str()) {
            Some(category_slug) => Some(self.get_category(showroom, category_slug)?),
            None => None,
        };
        if let Some(obj) = patch.as_object_mut() {
            obj.remove("category_slug");
        }

        let mut base = serde_json::to_value(&current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        merge_patch(&mut base, &patch);
        base["id"] = serde_json::json!(current.id);
        base["slug"] = serde_json::json!(current.slug);
        base["showroom_id"] = serde_json::json!(current.showroom_id);
        base["category_id"] = serde_json::json!(
            new_category
                .as_ref()
                .map(|c| c.id.clone())
                .unwrap_or(current.category_id.clone())
        );
        base["created_at"] = serde_json::json!(current.created_at);
        base["updated_at"] = serde_json::json!(now);

        let updated: Product = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        validate_required("title", &updated.title)?;
        validate_non_negative("price", updated.price)?;
        validate_non_negative("quantity", updated.quantity)?;

        self.update_record(
            "products",
            &updated.id,
            &updated,
            &[
                ("category_id", Value::Text(updated.category_id.clone())),
                ("title", Value::Text(updated.title.clone())),
                ("price", Value::Integer(updated.price)),
                ("quantity", Value::Integer(updated.quantity)),
                ("updated_at", Value::Text(now)),
            ],
        )?;
        Ok(updated)
    }

    /// Delete a product. Sale and supply items keep their references to
    /// the vanished product.
    pub fn delete_product(&self, showroom: &Showroom, slug: &str) -> Result<(), ServiceError> {
        let product = self.get_product(showroom, slug)?;
        self.delete_record("products", &product.id)
    }

    /// Sell units of a product.
    ///
    /// Decrements stock, opens a sale when none is given (optionally
    /// credited to an employee), and records a sale item at the
    /// product's current price.
    pub fn sell_product(
        &self,
        showroom: &Showroom,
        product_slug: &str,
        input: SellRequest,
    ) -> Result<(ProductSale, ProductSaleItem), ServiceError> {
        let product = self.get_product(showroom, product_slug)?;

        let sale = match &input.sale_slug {
            Some(sale_slug) => self.get_sale(showroom, sale_slug)?,
            None => self.create_sale(
                showroom,
                CreateSale {
                    employee_slug: input.employee_slug.clone(),
                },
            )?,
        };

        let item = self.record_sold_item(&product, &sale, input.quantity, None)?;
        Ok((sale, item))
    }

    /// Decrement stock and write the sale item row.
    pub(crate) fn record_sold_item(
        &self,
        product: &Product,
        sale: &ProductSale,
        quantity: i64,
        price_override: Option<i64>,
    ) -> Result<ProductSaleItem, ServiceError> {
        validate_positive("quantity", quantity)?;
        let sale_price = price_override.unwrap_or(product.price);
        validate_non_negative("sale price", sale_price)?;

        if quantity > product.quantity {
            return Err(ServiceError::Validation(format!(
                "insufficient stock: {} units of '{}' available",
                product.quantity, product.title
            )));
        }

        let mut product = product.clone();
        product.quantity -= quantity;
        product.updated_at = now_rfc3339();
        self.update_record(
            "products",
            &product.id,
            &product,
            &[
                ("quantity", Value::Integer(product.quantity)),
                ("updated_at", Value::Text(product.updated_at.clone())),
            ],
        )?;

        self.insert_with_slug_retry("sale_items", || {
            let now = now_rfc3339();
            let item = ProductSaleItem {
                id: new_id(),
                slug: new_slug("sale-item", &[&product.title]),
                sale_id: sale.id.clone(),
                product_id: product.id.clone(),
                quantity,
                sale_price,
                created_at: now.clone(),
            };
            let indexes = vec![
                ("slug", Value::Text(item.slug.clone())),
                ("sale_id", Value::Text(item.sale_id.clone())),
                ("product_id", Value::Text(item.product_id.clone())),
                ("quantity", Value::Integer(item.quantity)),
                ("sale_price", Value::Integer(item.sale_price)),
                ("created_at", Value::Text(now)),
            ];
            (item.id.clone(), item, indexes)
        })
    }
}
