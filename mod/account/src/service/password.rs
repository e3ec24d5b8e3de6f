use argon2::Argon2;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand_core::OsRng;

use dealerdesk_core::now_rfc3339;

use crate::mailing::OutgoingMail;
use crate::model::{ChangePassword, NotificationKind, ResetConfirm, User};
use crate::service::token::{PURPOSE_PASSWORD_RESET, password_reset_fingerprint};
use crate::service::user::validate_password_pair;
use crate::service::{AccountError, AccountService};

impl AccountService {
    /// Hash a password with argon2id and a fresh random salt.
    pub(crate) fn hash_password(&self, password: &str) -> Result<String, AccountError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AccountError::Internal(format!("password hashing failed: {}", e)))
    }

    /// Verify a password against a stored argon2id hash.
    pub(crate) fn verify_password(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Change the password of an authenticated user.
    ///
    /// Bumps `password_updated_at` and revokes every outstanding session,
    /// so old tokens (and old reset links) stop working.
    pub fn change_password(&self, user_id: &str, input: ChangePassword) -> Result<(), AccountError> {
        let user = self.get_user(user_id)?;

        if !self.verify_password(&input.old_password, &user.password_hash) {
            return Err(AccountError::Validation("old password is incorrect".into()));
        }
        validate_password_pair(&input.new_password, &input.new_password_confirm)?;

        self.set_password(user, &input.new_password)
    }

    /// Request a password reset by email.
    ///
    /// Deliberately succeeds whether or not the address is registered, so
    /// the endpoint cannot be used to probe for accounts.
    pub fn request_password_reset(&self, email: &str) -> Result<(), AccountError> {
        let Some(user) = self.find_user_by_email(email)? else {
            tracing::debug!("password reset requested for unknown email");
            return Ok(());
        };
        if !user.is_active {
            return Ok(());
        }

        let token = self.issue_purpose_token(
            &user,
            PURPOSE_PASSWORD_RESET,
            password_reset_fingerprint(&user),
            self.config.reset_token_ttl,
        )?;

        self.record_notification(&user.id, NotificationKind::PasswordReset)?;
        self.mailing.send_detached(OutgoingMail {
            to: user.email.clone(),
            subject: "Password reset".to_string(),
            body: format!(
                "Hello {},\n\n\
                 To choose a new password, follow this link:\n\
                 {}/account/password/reset/confirm?uid={}&token={}\n\n\
                 The link expires in {} minutes. If you did not request a reset, \
                 ignore this message.",
                user.display_name(),
                self.config.site_url,
                user.id,
                token,
                self.config.reset_token_ttl / 60,
            ),
        });

        Ok(())
    }

    /// Confirm a password reset from the emailed link.
    pub fn confirm_password_reset(&self, input: ResetConfirm) -> Result<(), AccountError> {
        let user = self
            .get_user(&input.uid)
            .map_err(|_| AccountError::Unauthorized("invalid or expired token".into()))?;
        if !user.is_active {
            return Err(AccountError::Forbidden("this account is inactive".into()));
        }

        self.check_purpose_token(
            &user,
            &input.token,
            PURPOSE_PASSWORD_RESET,
            &password_reset_fingerprint(&user),
        )?;
        validate_password_pair(&input.new_password, &input.new_password_confirm)?;

        self.set_password(user, &input.new_password)
    }

    fn set_password(&self, mut user: User, new_password: &str) -> Result<(), AccountError> {
        let now = now_rfc3339();
        user.password_hash = self.hash_password(new_password)?;
        user.password_updated_at = now.clone();
        user.updated_at = now;
        self.store_user(&user)?;

        let revoked = self.revoke_all_user_sessions(&user.id)?;
        tracing::info!(user = %user.id, revoked, "password changed, sessions revoked");
        Ok(())
    }
}
