use dealerdesk_core::{ListParams, ListResult, ServiceError, merge_patch, new_id, new_slug, now_rfc3339};
use dealerdesk_sql::Value;

use crate::model::{CreateEmployee, Employee, Showroom};
use crate::service::{ShowroomService, validate_phone, validate_required};

impl ShowroomService {
    /// Hire an employee into a showroom.
    pub fn create_employee(
        &self,
        showroom: &Showroom,
        input: CreateEmployee,
    ) -> Result<Employee, ServiceError> {
        validate_required("first name", &input.first_name)?;
        validate_required("last name", &input.last_name)?;
        validate_phone(&input.phone_number)?;

        let first_name = input.first_name.trim().to_string();
        let last_name = input.last_name.trim().to_string();
        let patronymic = input.patronymic.trim().to_string();
        let phone_number = input.phone_number.trim().to_string();

        self.insert_with_slug_retry("employees", || {
            let now = now_rfc3339();
            let employee = Employee {
                id: new_id(),
                slug: new_slug("employee", &[&first_name, &last_name, &patronymic]),
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                patronymic: patronymic.clone(),
                phone_number: phone_number.clone(),
                showroom_id: showroom.id.clone(),
                is_restricted: false,
                created_at: now.clone(),
                updated_at: now.clone(),
            };
            let indexes = vec![
                ("slug", Value::Text(employee.slug.clone())),
                ("showroom_id", Value::Text(employee.showroom_id.clone())),
                ("last_name", Value::Text(employee.last_name.clone())),
                ("is_restricted", Value::Integer(0)),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ];
            (employee.id.clone(), employee, indexes)
        })
    }

    pub fn get_employee(&self, showroom: &Showroom, slug: &str) -> Result<Employee, ServiceError> {
        self.get_scoped("employees", "employee", slug, &showroom.id)
    }

    pub fn list_employees(
        &self,
        showroom: &Showroom,
        params: &ListParams,
    ) -> Result<ListResult<Employee>, ServiceError> {
        let (items, total) = self.list_records(
            "employees",
            &[("showroom_id", Value::Text(showroom.id.clone()))],
            params,
        )?;
        Ok(ListResult { items, total })
    }

    /// Update an employee with JSON merge-patch semantics.
    pub fn update_employee(
        &self,
        showroom: &Showroom,
        slug: &str,
        patch: serde_json::Value,
    ) -> Result<Employee, ServiceError> {
        let current = self.get_employee(showroom, slug)?;
        let now = now_rfc3339();

        let mut base = serde_json::to_value(&current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        merge_patch(&mut base, &patch);
        base["id"] = serde_json::json!(current.id);
        base["slug"] = serde_json::json!(current.slug);
        base["showroom_id"] = serde_json::json!(current.showroom_id);
        base["created_at"] = serde_json::json!(current.created_at);
        base["updated_at"] = serde_json::json!(now);

        let updated: Employee = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        validate_required("first name", &updated.first_name)?;
        validate_required("last name", &updated.last_name)?;
        validate_phone(&updated.phone_number)?;

        self.update_record(
            "employees",
            &updated.id,
            &updated,
            &[
                ("last_name", Value::Text(updated.last_name.clone())),
                (
                    "is_restricted",
                    Value::Integer(i64::from(updated.is_restricted)),
                ),
                ("updated_at", Value::Text(now)),
            ],
        )?;
        Ok(updated)
    }

    /// Remove an employee. Their sales stay on record with a dangling
    /// employee reference.
    pub fn delete_employee(&self, showroom: &Showroom, slug: &str) -> Result<(), ServiceError> {
        let employee = self.get_employee(showroom, slug)?;
        self.delete_record("employees", &employee.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{test_service, test_showroom};

    fn hire(svc: &ShowroomService, showroom: &Showroom) -> Employee {
        svc.create_employee(
            showroom,
            CreateEmployee {
                first_name: "Ivan".into(),
                last_name: "Petrov".into(),
                patronymic: "Sergeevich".into(),
                phone_number: "+7 900 000 00 00".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn employee_crud() {
        let svc = test_service();
        let showroom = test_showroom(&svc, "owner-1");

        let employee = hire(&svc, &showroom);
        assert!(employee.slug.starts_with("employee-ivan-petrov-sergeevich-"));
        assert!(!employee.is_restricted);

        let fetched = svc.get_employee(&showroom, &employee.slug).unwrap();
        assert_eq!(fetched.id, employee.id);

        let updated = svc
            .update_employee(
                &showroom,
                &employee.slug,
                serde_json::json!({"is_restricted": true}),
            )
            .unwrap();
        assert!(updated.is_restricted);

        let list = svc.list_employees(&showroom, &ListParams::default()).unwrap();
        assert_eq!(list.total, 1);

        svc.delete_employee(&showroom, &employee.slug).unwrap();
        assert!(svc.get_employee(&showroom, &employee.slug).is_err());
    }

    #[test]
    fn employee_is_scoped_to_showroom() {
        let svc = test_service();
        let mine = test_showroom(&svc, "owner-1");
        let theirs = test_showroom(&svc, "owner-2");

        let employee = hire(&svc, &mine);

        let result = svc.get_employee(&theirs, &employee.slug);
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn update_rejects_invalid_phone() {
        let svc = test_service();
        let showroom = test_showroom(&svc, "owner-1");
        let employee = hire(&svc, &showroom);

        let result = svc.update_employee(
            &showroom,
            &employee.slug,
            serde_json::json!({"phone_number": "n/a"}),
        );
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
