use serde::{Deserialize, Serialize};

/// Why an email was sent to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    EmailVerification,
    PasswordReset,
    LoginNotification,
}

impl NotificationKind {
    /// Stable string stored in the `kind` column.
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::EmailVerification => "email_verification",
            NotificationKind::PasswordReset => "password_reset",
            NotificationKind::LoginNotification => "login_notification",
        }
    }
}

/// Send-history record. Used to throttle repeated sends of the same
/// kind to the same user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailNotification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub created_at: String,
}
