use serde::{Deserialize, Serialize};

/// A showroom owner's account.
///
/// The record is persisted whole (including the password hash) in the
/// `data` column; API responses go through [`User::sanitized`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Email address. Unique; doubles as the login name.
    pub email: String,

    pub first_name: String,
    pub last_name: String,

    /// Argon2id password hash (PHC string).
    pub password_hash: String,

    /// Whether the account can log in.
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Service staff marker.
    #[serde(default)]
    pub is_staff: bool,

    /// Site administrator marker.
    #[serde(default)]
    pub is_superuser: bool,

    /// Whether the email address has been confirmed.
    #[serde(default)]
    pub is_email_verified: bool,

    /// RFC 3339 timestamp of the last successful login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,

    /// RFC 3339 timestamp of the last password change.
    pub password_updated_at: String,

    /// RFC 3339 registration timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

impl User {
    /// Full display name.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// JSON view of the account without the password hash.
    pub fn sanitized(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.remove("password_hash");
        }
        value
    }
}

fn default_true() -> bool {
    true
}

/// Registration input.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
    /// Terms-of-service acceptance. Registration is refused without it.
    #[serde(default)]
    pub accept_terms: bool,
}

/// Login input.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Profile update input — names only; email changes go through
/// [`ChangeEmail`] so the verification flag can be reset.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Email change input. Clears the verification flag.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeEmail {
    pub email: String,
}

/// Password change input (authenticated flow).
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePassword {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

/// Password reset request (by email, unauthenticated).
#[derive(Debug, Clone, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

/// Password reset confirmation (from the emailed link).
#[derive(Debug, Clone, Deserialize)]
pub struct ResetConfirm {
    pub uid: String,
    pub token: String,
    pub new_password: String,
    pub new_password_confirm: String,
}
