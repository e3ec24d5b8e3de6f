use dealerdesk_core::{new_id, now_rfc3339};
use dealerdesk_sql::Value;

use crate::mailing::OutgoingMail;
use crate::model::{EmailNotification, NotificationKind, User};
use crate::service::token::{PURPOSE_EMAIL_VERIFY, email_verify_fingerprint};
use crate::service::{AccountError, AccountService};

/// Result of an email verification check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    AlreadyVerified,
}

impl VerifyOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            VerifyOutcome::Verified => "verified",
            VerifyOutcome::AlreadyVerified => "already_verified",
        }
    }
}

impl AccountService {
    /// Record an email send in the history table.
    pub(crate) fn record_notification(
        &self,
        user_id: &str,
        kind: NotificationKind,
    ) -> Result<(), AccountError> {
        let record = EmailNotification {
            id: new_id(),
            user_id: user_id.to_string(),
            kind,
            created_at: now_rfc3339(),
        };
        self.insert_record(
            "email_notifications",
            &record.id,
            &record,
            &[
                ("user_id", Value::Text(record.user_id.clone())),
                ("kind", Value::Text(kind.as_str().to_string())),
                ("created_at", Value::Text(record.created_at.clone())),
            ],
        )
    }

    /// Count sends of a kind to a user at or after `since` (RFC 3339).
    pub(crate) fn notifications_since(
        &self,
        user_id: &str,
        kind: NotificationKind,
        since: &str,
    ) -> Result<i64, AccountError> {
        let rows = self.sql
            .query(
                "SELECT COUNT(*) AS cnt FROM email_notifications
                 WHERE user_id = ?1 AND kind = ?2 AND created_at >= ?3",
                &[
                    Value::Text(user_id.to_string()),
                    Value::Text(kind.as_str().to_string()),
                    Value::Text(since.to_string()),
                ],
            )
            .map_err(|e| AccountError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0))
    }

    /// Current verification token for a user (bound to its present state).
    pub(crate) fn email_verify_token(&self, user: &User) -> Result<String, AccountError> {
        self.issue_purpose_token(
            user,
            PURPOSE_EMAIL_VERIFY,
            email_verify_fingerprint(user),
            self.config.verify_token_ttl,
        )
    }

    /// Send (or resend) the verification email.
    ///
    /// Throttled through the send history: a second request inside the
    /// cooldown window is rejected rather than queued.
    pub fn send_verification_email(&self, user_id: &str) -> Result<(), AccountError> {
        let user = self.get_user(user_id)?;
        if user.is_email_verified {
            return Err(AccountError::Validation("email is already verified".into()));
        }

        let since = (chrono::Utc::now()
            - chrono::Duration::seconds(self.config.verification_cooldown))
        .to_rfc3339();
        if self.notifications_since(&user.id, NotificationKind::EmailVerification, &since)? > 0 {
            return Err(AccountError::Validation(
                "a verification email was sent recently, try again later".into(),
            ));
        }

        let token = self.email_verify_token(&user)?;
        self.record_notification(&user.id, NotificationKind::EmailVerification)?;
        self.mailing.send_detached(OutgoingMail {
            to: user.email.clone(),
            subject: "Confirm your email".to_string(),
            body: format!(
                "Hello {},\n\n\
                 Follow this link to confirm your email address:\n\
                 {}/account/email/verify/{}/{}\n\n\
                 The link expires in {} hours.",
                user.display_name(),
                self.config.site_url,
                user.id,
                token,
                self.config.verify_token_ttl / 3600,
            ),
        });

        Ok(())
    }

    /// Check a verification link for the (user, token) pair.
    pub fn verify_email(&self, uid: &str, token: &str) -> Result<VerifyOutcome, AccountError> {
        let mut user = self.get_user(uid)?;
        if !user.is_active {
            return Err(AccountError::Forbidden("this account is inactive".into()));
        }
        if user.is_email_verified {
            return Ok(VerifyOutcome::AlreadyVerified);
        }

        self.check_purpose_token(
            &user,
            token,
            PURPOSE_EMAIL_VERIFY,
            &email_verify_fingerprint(&user),
        )?;

        user.is_email_verified = true;
        user.updated_at = now_rfc3339();
        self.store_user(&user)?;

        Ok(VerifyOutcome::Verified)
    }

    /// Whether a user may reach email-verified-only resources.
    pub fn require_verified(&self, user_id: &str) -> Result<User, AccountError> {
        let user = self.get_user(user_id)?;
        if !user.is_active {
            return Err(AccountError::Forbidden("this account is inactive".into()));
        }
        if !user.is_email_verified {
            return Err(AccountError::Forbidden(
                "email address is not verified".into(),
            ));
        }
        Ok(user)
    }
}
