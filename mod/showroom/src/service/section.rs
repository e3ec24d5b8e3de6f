//! Generic section CRUD — dispatch from the model-name path segment to
//! the typed per-entity operations.

use serde::Serialize;
use serde::de::DeserializeOwned;

use dealerdesk_core::{ListParams, ListResult, ServiceError};
use dealerdesk_sql::Value;

use crate::model::{
    CreateCategory, CreateDealer, CreateEmployee, CreateProduct, CreateSale, CreateSupply, Section,
    Showroom,
};
use crate::service::ShowroomService;

fn to_value<T: Serialize>(record: &T) -> Result<serde_json::Value, ServiceError> {
    serde_json::to_value(record).map_err(|e| ServiceError::Internal(e.to_string()))
}

fn to_value_list<T: Serialize>(
    result: ListResult<T>,
) -> Result<ListResult<serde_json::Value>, ServiceError> {
    let mut items = Vec::with_capacity(result.items.len());
    for item in &result.items {
        items.push(to_value(item)?);
    }
    Ok(ListResult {
        items,
        total: result.total,
    })
}

fn parse_input<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T, ServiceError> {
    serde_json::from_value(payload).map_err(|e| ServiceError::Validation(e.to_string()))
}

impl ShowroomService {
    /// Resolve a section object's id by slug within a showroom.
    pub(crate) fn section_record_id(
        &self,
        showroom: &Showroom,
        section: Section,
        slug: &str,
    ) -> Result<String, ServiceError> {
        let sql = format!(
            "SELECT id FROM {} WHERE slug = ?1 AND showroom_id = ?2",
            section.table()
        );
        let rows = self.sql
            .query(
                &sql,
                &[
                    Value::Text(slug.to_string()),
                    Value::Text(showroom.id.clone()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.first()
            .and_then(|r| r.get_str("id"))
            .map(|id| id.to_string())
            .ok_or_else(|| {
                ServiceError::NotFound(format!("{} '{}' not found", section.singular(), slug))
            })
    }

    /// List a section of a showroom.
    pub fn section_list(
        &self,
        showroom: &Showroom,
        section: Section,
        params: &ListParams,
    ) -> Result<ListResult<serde_json::Value>, ServiceError> {
        match section {
            Section::Employees => to_value_list(self.list_employees(showroom, params)?),
            Section::Products => to_value_list(self.list_products(showroom, params)?),
            Section::Sales => to_value_list(self.list_sales(showroom, params)?),
            Section::Supplies => to_value_list(self.list_supplies(showroom, params)?),
            Section::Dealers => to_value_list(self.list_dealers(showroom, params)?),
            Section::Categories => to_value_list(self.list_categories(showroom, params)?),
        }
    }

    /// Fetch one section object by slug.
    pub fn section_get(
        &self,
        showroom: &Showroom,
        section: Section,
        slug: &str,
    ) -> Result<serde_json::Value, ServiceError> {
        match section {
            Section::Employees => to_value(&self.get_employee(showroom, slug)?),
            Section::Products => to_value(&self.get_product(showroom, slug)?),
            Section::Sales => to_value(&self.get_sale(showroom, slug)?),
            Section::Supplies => to_value(&self.get_supply(showroom, slug)?),
            Section::Dealers => to_value(&self.get_dealer(showroom, slug)?),
            Section::Categories => to_value(&self.get_category(showroom, slug)?),
        }
    }

    /// Create a section object from a JSON payload.
    pub fn section_create(
        &self,
        showroom: &Showroom,
        section: Section,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, ServiceError> {
        match section {
            Section::Employees => {
                let input: CreateEmployee = parse_input(payload)?;
                to_value(&self.create_employee(showroom, input)?)
            }
            Section::Products => {
                let input: CreateProduct = parse_input(payload)?;
                to_value(&self.create_product(showroom, input)?)
            }
            Section::Sales => {
                let input: CreateSale = parse_input(payload)?;
                to_value(&self.create_sale(showroom, input)?)
            }
            Section::Supplies => {
                let input: CreateSupply = parse_input(payload)?;
                to_value(&self.create_supply(showroom, input)?)
            }
            Section::Dealers => {
                let input: CreateDealer = parse_input(payload)?;
                to_value(&self.create_dealer(showroom, input)?)
            }
            Section::Categories => {
                let input: CreateCategory = parse_input(payload)?;
                to_value(&self.create_category(showroom, input)?)
            }
        }
    }

    /// Patch a section object.
    pub fn section_update(
        &self,
        showroom: &Showroom,
        section: Section,
        slug: &str,
        patch: serde_json::Value,
    ) -> Result<serde_json::Value, ServiceError> {
        match section {
            Section::Employees => to_value(&self.update_employee(showroom, slug, patch)?),
            Section::Products => to_value(&self.update_product(showroom, slug, patch)?),
            Section::Sales => to_value(&self.update_sale(showroom, slug, patch)?),
            Section::Supplies => to_value(&self.update_supply(showroom, slug, patch)?),
            Section::Dealers => to_value(&self.update_dealer(showroom, slug, patch)?),
            Section::Categories => to_value(&self.update_category(showroom, slug, patch)?),
        }
    }

    /// Delete a section object, honoring each entity's cascade rules.
    pub fn section_delete(
        &self,
        showroom: &Showroom,
        section: Section,
        slug: &str,
    ) -> Result<(), ServiceError> {
        match section {
            Section::Employees => self.delete_employee(showroom, slug),
            Section::Products => self.delete_product(showroom, slug),
            Section::Sales => self.delete_sale(showroom, slug),
            Section::Supplies => self.delete_supply(showroom, slug),
            Section::Dealers => self.delete_dealer(showroom, slug),
            Section::Categories => self.delete_category(showroom, slug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{test_service, test_showroom};

    #[test]
    fn dispatch_roundtrip_for_every_section() {
        let svc = test_service();
        let showroom = test_showroom(&svc, "owner-1");

        // Creation order respects references: categories and dealers
        // before products and supplies.
        let category = svc
            .section_create(
                &showroom,
                Section::Categories,
                serde_json::json!({"name": "Sedans"}),
            )
            .unwrap();
        svc.section_create(
            &showroom,
            Section::Products,
            serde_json::json!({
                "title": "Model 3",
                "price": 30_000,
                "quantity": 4,
                "category_slug": category["slug"],
            }),
        )
        .unwrap();
        svc.section_create(
            &showroom,
            Section::Employees,
            serde_json::json!({
                "first_name": "Ivan",
                "last_name": "Petrov",
                "phone_number": "+7 900 000 00 00",
            }),
        )
        .unwrap();
        let dealer = svc
            .section_create(
                &showroom,
                Section::Dealers,
                serde_json::json!({"name": "AutoTrade"}),
            )
            .unwrap();
        svc.section_create(&showroom, Section::Sales, serde_json::json!({}))
            .unwrap();
        svc.section_create(
            &showroom,
            Section::Supplies,
            serde_json::json!({"dealer_slug": dealer["slug"]}),
        )
        .unwrap();

        for section in Section::ALL {
            let list = svc
                .section_list(&showroom, section, &ListParams::default())
                .unwrap();
            assert_eq!(list.total, 1, "section {}", section);

            let slug = list.items[0]["slug"].as_str().unwrap().to_string();
            let fetched = svc.section_get(&showroom, section, &slug).unwrap();
            assert_eq!(fetched["slug"], list.items[0]["slug"]);
        }
    }

    #[test]
    fn create_with_bad_payload_is_validation_error() {
        let svc = test_service();
        let showroom = test_showroom(&svc, "owner-1");

        let result = svc.section_create(
            &showroom,
            Section::Employees,
            serde_json::json!({"first_name": "Ivan"}),
        );
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn record_id_misses_are_not_found() {
        let svc = test_service();
        let showroom = test_showroom(&svc, "owner-1");

        let result = svc.section_record_id(&showroom, Section::Products, "product-ghost-00000");
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
