use dealerdesk_core::{ListParams, ListResult, ServiceError, merge_patch, new_id, new_slug, now_rfc3339};
use dealerdesk_sql::Value;

use crate::model::{CreateCategory, ProductCategory, Showroom};
use crate::service::{ShowroomService, validate_required};

impl ShowroomService {
    /// Create a product category. Names are unique within the showroom.
    pub fn create_category(
        &self,
        showroom: &Showroom,
        input: CreateCategory,
    ) -> Result<ProductCategory, ServiceError> {
        validate_required("name", &input.name)?;
        let name = input.name.trim().to_string();

        self.insert_with_slug_retry("categories", || {
            let now = now_rfc3339();
            let category = ProductCategory {
                id: new_id(),
                slug: new_slug("category", &[&name]),
                name: name.clone(),
                showroom_id: showroom.id.clone(),
                created_at: now.clone(),
                updated_at: now.clone(),
            };
            let indexes = vec![
                ("slug", Value::Text(category.slug.clone())),
                ("showroom_id", Value::Text(category.showroom_id.clone())),
                ("name", Value::Text(category.name.clone())),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ];
            (category.id.clone(), category, indexes)
        })
        .map_err(|e| match e {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict(format!("category '{}' already exists", name))
            }
            other => other,
        })
    }

    pub fn get_category(
        &self,
        showroom: &Showroom,
        slug: &str,
    ) -> Result<ProductCategory, ServiceError> {
        self.get_scoped("categories", "category", slug, &showroom.id)
    }

    pub fn list_categories(
        &self,
        showroom: &Showroom,
        params: &ListParams,
    ) -> Result<ListResult<ProductCategory>, ServiceError> {
        let (items, total) = self.list_records(
            "categories",
            &[("showroom_id", Value::Text(showroom.id.clone()))],
            params,
        )?;
        Ok(ListResult { items, total })
    }

    /// Update a category with JSON merge-patch semantics.
    pub fn update_category(
        &self,
        showroom: &Showroom,
        slug: &str,
        patch: serde_json::Value,
    ) -> Result<ProductCategory, ServiceError> {
        let current = self.get_category(showroom, slug)?;
        let now = now_rfc3339();

        let mut base = serde_json::to_value(&current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        merge_patch(&mut base, &patch);
        base["id"] = serde_json::json!(current.id);
        base["slug"] = serde_json::json!(current.slug);
        base["showroom_id"] = serde_json::json!(current.showroom_id);
        base["created_at"] = serde_json::json!(current.created_at);
        base["updated_at"] = serde_json::json!(now);

        let updated: ProductCategory = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        validate_required("name", &updated.name)?;

        self.update_record(
            "categories",
            &updated.id,
            &updated,
            &[
                ("name", Value::Text(updated.name.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )
        .map_err(|e| match e {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict(format!("category '{}' already exists", updated.name))
            }
            other => other,
        })?;
        Ok(updated)
    }

    /// Delete a category and its products. Sale and supply items keep
    /// their product references.
    pub fn delete_category(&self, showroom: &Showroom, slug: &str) -> Result<(), ServiceError> {
        let category = self.get_category(showroom, slug)?;

        self.sql
            .exec(
                "DELETE FROM products WHERE category_id = ?1",
                &[Value::Text(category.id.clone())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        self.delete_record("categories", &category.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CreateProduct;
    use crate::service::test_support::{test_service, test_showroom};

    #[test]
    fn category_crud() {
        let svc = test_service();
        let showroom = test_showroom(&svc, "owner-1");

        let category = svc
            .create_category(&showroom, CreateCategory { name: "Sedans".into() })
            .unwrap();
        assert!(category.slug.starts_with("category-sedans-"));

        let renamed = svc
            .update_category(&showroom, &category.slug, serde_json::json!({"name": "SUVs"}))
            .unwrap();
        assert_eq!(renamed.name, "SUVs");

        let list = svc.list_categories(&showroom, &ListParams::default()).unwrap();
        assert_eq!(list.total, 1);

        svc.delete_category(&showroom, &category.slug).unwrap();
        assert!(svc.get_category(&showroom, &category.slug).is_err());
    }

    #[test]
    fn duplicate_name_in_showroom_conflicts() {
        let svc = test_service();
        let showroom = test_showroom(&svc, "owner-1");

        svc.create_category(&showroom, CreateCategory { name: "Sedans".into() })
            .unwrap();
        let dup = svc.create_category(&showroom, CreateCategory { name: "Sedans".into() });
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));

        // Same name in a different showroom is fine.
        let other = test_showroom(&svc, "owner-2");
        assert!(svc
            .create_category(&other, CreateCategory { name: "Sedans".into() })
            .is_ok());
    }

    #[test]
    fn delete_cascades_to_products() {
        let svc = test_service();
        let showroom = test_showroom(&svc, "owner-1");
        let category = svc
            .create_category(&showroom, CreateCategory { name: "Sedans".into() })
            .unwrap();

        let product = svc
            .create_product(
                &showroom,
                CreateProduct {
                    title: "Model 3".into(),
                    price: 30_000,
                    quantity: 2,
                    category_slug: category.slug.clone(),
                },
            )
            .unwrap();

        svc.delete_category(&showroom, &category.slug).unwrap();
        assert!(svc.get_product(&showroom, &product.slug).is_err());
    }
}
