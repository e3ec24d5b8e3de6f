use dealerdesk_core::{new_id, now_rfc3339};
use dealerdesk_sql::Value;

use crate::model::{ChangeEmail, CreateAccount, UpdateProfile, User};
use crate::service::{AccountError, AccountService};

impl AccountService {
    /// Register a new account and kick off email verification.
    pub fn register(&self, input: CreateAccount) -> Result<User, AccountError> {
        if !input.accept_terms {
            return Err(AccountError::Validation(
                "terms of service must be accepted".into(),
            ));
        }
        validate_email(&input.email)?;
        validate_person_name("first name", &input.first_name)?;
        validate_person_name("last name", &input.last_name)?;
        validate_password_pair(&input.password, &input.password_confirm)?;

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            email: input.email.trim().to_lowercase(),
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            password_hash: self.hash_password(&input.password)?,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            is_email_verified: false,
            last_login: None,
            password_updated_at: now.clone(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "users",
            &user.id,
            &user,
            &[
                ("email", Value::Text(user.email.clone())),
                ("is_active", Value::Integer(1)),
                ("is_email_verified", Value::Integer(0)),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )
        .map_err(|e| match e {
            AccountError::Conflict(_) => {
                AccountError::Conflict("this email is already registered".into())
            }
            other => other,
        })?;

        // Best effort; registration succeeds even if the mail can't go out.
        if let Err(e) = self.send_verification_email(&user.id) {
            tracing::warn!(user = %user.id, "verification mail not sent: {}", e);
        }

        Ok(user)
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, AccountError> {
        self.get_record("users", id)
    }

    /// Find a user by email (case-insensitive via stored lowercase).
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AccountError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM users WHERE email = ?1",
                &[Value::Text(email.trim().to_lowercase())],
            )
            .map_err(|e| AccountError::Storage(e.to_string()))?;

        match rows.first().and_then(|r| r.get_str("data")) {
            Some(data) => serde_json::from_str(data)
                .map(Some)
                .map_err(|e| AccountError::Internal(e.to_string())),
            None => Ok(None),
        }
    }

    /// Update profile names.
    pub fn update_profile(&self, id: &str, input: UpdateProfile) -> Result<User, AccountError> {
        let mut user = self.get_user(id)?;

        if let Some(first_name) = input.first_name {
            validate_person_name("first name", &first_name)?;
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = input.last_name {
            validate_person_name("last name", &last_name)?;
            user.last_name = last_name.trim().to_string();
        }
        user.updated_at = now_rfc3339();

        self.update_record(
            "users",
            id,
            &user,
            &[("updated_at", Value::Text(user.updated_at.clone()))],
        )?;
        Ok(user)
    }

    /// Change the account email. Clears the verification flag so the new
    /// address must be confirmed again.
    pub fn change_email(&self, id: &str, input: ChangeEmail) -> Result<User, AccountError> {
        validate_email(&input.email)?;
        let mut user = self.get_user(id)?;

        let email = input.email.trim().to_lowercase();
        if email == user.email {
            return Ok(user);
        }

        user.email = email;
        user.is_email_verified = false;
        user.updated_at = now_rfc3339();

        self.update_record(
            "users",
            id,
            &user,
            &[
                ("email", Value::Text(user.email.clone())),
                ("is_email_verified", Value::Integer(0)),
                ("updated_at", Value::Text(user.updated_at.clone())),
            ],
        )
        .map_err(|e| match e {
            AccountError::Conflict(_) => {
                AccountError::Conflict("this email is already registered".into())
            }
            other => other,
        })?;
        Ok(user)
    }

    /// Persist a user snapshot, refreshing the indexed columns.
    pub(crate) fn store_user(&self, user: &User) -> Result<(), AccountError> {
        self.update_record(
            "users",
            &user.id,
            user,
            &[
                ("email", Value::Text(user.email.clone())),
                ("is_active", Value::Integer(i64::from(user.is_active))),
                (
                    "is_email_verified",
                    Value::Integer(i64::from(user.is_email_verified)),
                ),
                ("updated_at", Value::Text(user.updated_at.clone())),
            ],
        )
    }
}

pub(crate) fn validate_email(email: &str) -> Result<(), AccountError> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AccountError::Validation("invalid email format".into()));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.contains(' ') {
        return Err(AccountError::Validation("invalid email format".into()));
    }
    Ok(())
}

pub(crate) fn validate_person_name(field: &str, name: &str) -> Result<(), AccountError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AccountError::Validation(format!("{} is required", field)));
    }
    if !name.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\'') {
        return Err(AccountError::Validation(format!(
            "{} must contain letters only",
            field
        )));
    }
    Ok(())
}

pub(crate) fn validate_password_pair(password: &str, confirm: &str) -> Result<(), AccountError> {
    if password.len() < 8 {
        return Err(AccountError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }
    if password != confirm {
        return Err(AccountError::Validation("passwords do not match".into()));
    }
    Ok(())
}
