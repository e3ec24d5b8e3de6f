use dealerdesk_core::{ListParams, ListResult, ServiceError, merge_patch, new_id, new_slug, now_rfc3339};
use dealerdesk_sql::Value;

use crate::model::{CreateShowroom, Showroom};
use crate::service::{ShowroomService, validate_phone, validate_required};

impl ShowroomService {
    /// Create a showroom owned by the given user.
    pub fn create_showroom(
        &self,
        owner_id: &str,
        input: CreateShowroom,
    ) -> Result<Showroom, ServiceError> {
        validate_required("title", &input.title)?;
        validate_phone(&input.phone_number)?;

        let title = input.title.trim().to_string();
        let phone_number = input.phone_number.trim().to_string();

        self.insert_with_slug_retry("showrooms", || {
            let now = now_rfc3339();
            let showroom = Showroom {
                id: new_id(),
                slug: new_slug("showroom", &[&title]),
                title: title.clone(),
                phone_number: phone_number.clone(),
                is_verified: false,
                owner_id: owner_id.to_string(),
                created_at: now.clone(),
                updated_at: now.clone(),
            };
            let indexes = vec![
                ("slug", Value::Text(showroom.slug.clone())),
                ("owner_id", Value::Text(showroom.owner_id.clone())),
                ("title", Value::Text(showroom.title.clone())),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ];
            (showroom.id.clone(), showroom, indexes)
        })
    }

    /// Resolve a showroom by slug for its owner.
    ///
    /// This is the tenancy gate: a slug owned by someone else misses the
    /// filter and reads as NotFound, exactly like an unknown slug.
    pub fn get_showroom_for_owner(
        &self,
        slug: &str,
        owner_id: &str,
    ) -> Result<Showroom, ServiceError> {
        let rows = self.sql
            .query(
                "SELECT data FROM showrooms WHERE slug = ?1 AND owner_id = ?2",
                &[Value::Text(slug.to_string()), Value::Text(owner_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("showroom '{}' not found", slug)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// List showrooms owned by a user.
    pub fn list_showrooms(
        &self,
        owner_id: &str,
        params: &ListParams,
    ) -> Result<ListResult<Showroom>, ServiceError> {
        let (items, total) = self.list_records(
            "showrooms",
            &[("owner_id", Value::Text(owner_id.to_string()))],
            params,
        )?;
        Ok(ListResult { items, total })
    }

    /// Update a showroom with JSON merge-patch semantics.
    ///
    /// Identity and service-managed fields (id, slug, owner, timestamps,
    /// verification flag) survive any patch.
    pub fn update_showroom(
        &self,
        slug: &str,
        owner_id: &str,
        patch: serde_json::Value,
    ) -> Result<Showroom, ServiceError> {
        let current = self.get_showroom_for_owner(slug, owner_id)?;
        let now = now_rfc3339();

        let mut base = serde_json::to_value(&current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        merge_patch(&mut base, &patch);
        base["id"] = serde_json::json!(current.id);
        base["slug"] = serde_json::json!(current.slug);
        base["owner_id"] = serde_json::json!(current.owner_id);
        base["is_verified"] = serde_json::json!(current.is_verified);
        base["created_at"] = serde_json::json!(current.created_at);
        base["updated_at"] = serde_json::json!(now);

        let updated: Showroom = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        validate_required("title", &updated.title)?;
        validate_phone(&updated.phone_number)?;

        self.update_record(
            "showrooms",
            &updated.id,
            &updated,
            &[
                ("title", Value::Text(updated.title.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;
        Ok(updated)
    }

    /// Delete a showroom and everything it owns.
    ///
    /// Cascade order matters: items before their parents, children
    /// before the showroom row.
    pub fn delete_showroom(&self, slug: &str, owner_id: &str) -> Result<(), ServiceError> {
        let showroom = self.get_showroom_for_owner(slug, owner_id)?;
        let id = Value::Text(showroom.id.clone());

        let cascades = [
            "DELETE FROM sale_items WHERE sale_id IN (SELECT id FROM sales WHERE showroom_id = ?1)",
            "DELETE FROM supply_items WHERE supply_id IN (SELECT id FROM supplies WHERE showroom_id = ?1)",
            "DELETE FROM sales WHERE showroom_id = ?1",
            "DELETE FROM supplies WHERE showroom_id = ?1",
            "DELETE FROM products WHERE showroom_id = ?1",
            "DELETE FROM categories WHERE showroom_id = ?1",
            "DELETE FROM employees WHERE showroom_id = ?1",
            "DELETE FROM dealers WHERE showroom_id = ?1",
        ];
        for stmt in &cascades {
            self.sql
                .exec(stmt, &[id.clone()])
                .map_err(|e| ServiceError::Storage(e.to_string()))?;
        }

        self.delete_record("showrooms", &showroom.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CreateCategory, CreateEmployee, Section};
    use crate::service::test_support::{test_service, test_showroom};

    #[test]
    fn create_and_fetch_scoped_by_owner() {
        let svc = test_service();
        let showroom = test_showroom(&svc, "owner-1");

        assert!(showroom.slug.starts_with("showroom-alfa-motors-"));
        assert!(!showroom.is_verified);

        let fetched = svc.get_showroom_for_owner(&showroom.slug, "owner-1").unwrap();
        assert_eq!(fetched.id, showroom.id);

        // Another user cannot see it at all.
        let denied = svc.get_showroom_for_owner(&showroom.slug, "owner-2");
        assert!(matches!(denied, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn list_is_per_owner() {
        let svc = test_service();
        test_showroom(&svc, "owner-1");
        test_showroom(&svc, "owner-1");
        test_showroom(&svc, "owner-2");

        let mine = svc.list_showrooms("owner-1", &ListParams::default()).unwrap();
        assert_eq!(mine.total, 2);
        let theirs = svc.list_showrooms("owner-2", &ListParams::default()).unwrap();
        assert_eq!(theirs.total, 1);
    }

    #[test]
    fn update_preserves_identity_fields() {
        let svc = test_service();
        let showroom = test_showroom(&svc, "owner-1");

        let updated = svc
            .update_showroom(
                &showroom.slug,
                "owner-1",
                serde_json::json!({
                    "title": "Beta Cars",
                    "slug": "hijacked",
                    "owner_id": "owner-2",
                    "is_verified": true,
                }),
            )
            .unwrap();

        assert_eq!(updated.title, "Beta Cars");
        assert_eq!(updated.slug, showroom.slug);
        assert_eq!(updated.owner_id, "owner-1");
        assert!(!updated.is_verified);
    }

    #[test]
    fn update_validates_patched_fields() {
        let svc = test_service();
        let showroom = test_showroom(&svc, "owner-1");

        let result = svc.update_showroom(
            &showroom.slug,
            "owner-1",
            serde_json::json!({"phone_number": "not a phone"}),
        );
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn delete_cascades_to_sections() {
        let svc = test_service();
        let showroom = test_showroom(&svc, "owner-1");

        svc.create_employee(
            &showroom,
            CreateEmployee {
                first_name: "Ivan".into(),
                last_name: "Petrov".into(),
                patronymic: "Sergeevich".into(),
                phone_number: "+7 900 000 00 00".into(),
            },
        )
        .unwrap();
        svc.create_category(&showroom, CreateCategory { name: "Sedans".into() })
            .unwrap();

        svc.delete_showroom(&showroom.slug, "owner-1").unwrap();

        assert!(svc.get_showroom_for_owner(&showroom.slug, "owner-1").is_err());
        let stats = svc
            .section_statistics(&showroom, Section::Employees, None, false)
            .unwrap();
        assert_eq!(stats.count, 0);
    }

    #[test]
    fn create_rejects_bad_input() {
        let svc = test_service();
        assert!(svc
            .create_showroom(
                "owner-1",
                CreateShowroom {
                    title: "  ".into(),
                    phone_number: "+1 555 0100".into(),
                },
            )
            .is_err());
        assert!(svc
            .create_showroom(
                "owner-1",
                CreateShowroom {
                    title: "Alfa".into(),
                    phone_number: "nope".into(),
                },
            )
            .is_err());
    }
}
