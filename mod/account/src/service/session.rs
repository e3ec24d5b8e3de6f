use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use dealerdesk_core::new_id;
use dealerdesk_sql::Value;

use crate::mailing::OutgoingMail;
use crate::model::{Claims, Credentials, NotificationKind, Session, TokenPair, User};
use crate::service::{AccountError, AccountService};

/// Client details attached to a login, for the session record and the
/// security notification mail.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl AccountService {
    /// Authenticate with email + password and issue a token pair.
    pub fn login(&self, input: Credentials, client: ClientInfo) -> Result<TokenPair, AccountError> {
        let user = self
            .find_user_by_email(&input.email)?
            .ok_or_else(|| AccountError::Unauthorized("invalid email or password".into()))?;

        if !user.is_active {
            return Err(AccountError::Unauthorized("this account is inactive".into()));
        }
        if !self.verify_password(&input.password, &user.password_hash) {
            return Err(AccountError::Unauthorized("invalid email or password".into()));
        }

        let mut user = user;
        let now = dealerdesk_core::now_rfc3339();
        user.last_login = Some(now.clone());
        user.updated_at = now;
        self.store_user(&user)?;

        let tokens = self.issue_tokens(&user, client.user_agent.clone(), client.ip_address.clone())?;

        self.record_notification(&user.id, NotificationKind::LoginNotification)?;
        self.mailing.send_detached(OutgoingMail {
            to: user.email.clone(),
            subject: "New sign-in to your account".to_string(),
            body: format!(
                "Hello {},\n\n\
                 Your account was just signed in to from {}.\n\
                 If this wasn't you, change your password immediately.",
                user.display_name(),
                client.ip_address.as_deref().unwrap_or("an unknown address"),
            ),
        });

        Ok(tokens)
    }

    /// Issue a JWT token pair (access + refresh) for a user.
    ///
    /// Creates a session record and returns signed tokens.
    pub fn issue_tokens(
        &self,
        user: &User,
        user_agent: Option<String>,
        ip_address: Option<String>,
    ) -> Result<TokenPair, AccountError> {
        let session_id = new_id();
        let now = chrono::Utc::now();
        let access_exp = now + chrono::Duration::seconds(self.config.access_token_ttl);
        let refresh_exp = now + chrono::Duration::seconds(self.config.refresh_token_ttl);

        let access_claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.display_name(),
            sid: session_id.clone(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
        };

        let refresh_claims = Claims {
            exp: refresh_exp.timestamp(),
            ..access_claims.clone()
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AccountError::Internal(format!("JWT encode failed: {}", e)))?;

        let refresh_token = encode(
            &Header::default(),
            &refresh_claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AccountError::Internal(format!("JWT encode failed: {}", e)))?;

        let session = Session {
            id: session_id,
            user_id: user.id.clone(),
            issued_at: now.to_rfc3339(),
            expires_at: refresh_exp.to_rfc3339(),
            revoked: false,
            user_agent,
            ip_address,
        };

        self.insert_record(
            "sessions",
            &session.id,
            &session,
            &[
                ("user_id", Value::Text(session.user_id.clone())),
                ("revoked", Value::Integer(0)),
                ("issued_at", Value::Text(session.issued_at.clone())),
                ("expires_at", Value::Text(session.expires_at.clone())),
            ],
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_ttl,
        })
    }

    /// Verify and decode a JWT access token.
    /// Returns the claims if valid and the session is not revoked.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AccountError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AccountError::Unauthorized(format!("invalid token: {}", e)))?;

        let claims = token_data.claims;

        // Check if the session has been revoked.
        if let Ok(session) = self.get_record::<Session>("sessions", &claims.sid) {
            if session.revoked {
                return Err(AccountError::Unauthorized("session has been revoked".into()));
            }
        }

        Ok(claims)
    }

    /// Refresh an access token using a refresh token.
    /// Validates the refresh token, revokes the old session, and issues a new pair.
    pub fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, AccountError> {
        let claims = self.verify_token(refresh_token)?;

        let user: User = self
            .get_record("users", &claims.sub)
            .map_err(|_| AccountError::Unauthorized("user not found".into()))?;

        if !user.is_active {
            return Err(AccountError::Unauthorized("this account is inactive".into()));
        }

        self.revoke_session(&claims.sid)?;
        self.issue_tokens(&user, None, None)
    }

    /// Revoke a session (its tokens become invalid).
    pub fn revoke_session(&self, session_id: &str) -> Result<(), AccountError> {
        let mut session: Session = self.get_record("sessions", session_id)?;
        session.revoked = true;

        self.update_record(
            "sessions",
            session_id,
            &session,
            &[("revoked", Value::Integer(1))],
        )?;

        Ok(())
    }

    /// Revoke all active sessions for a user. Returns the number revoked.
    pub fn revoke_all_user_sessions(&self, user_id: &str) -> Result<u64, AccountError> {
        let affected = self.sql
            .exec(
                "UPDATE sessions SET revoked = 1, data = REPLACE(data, '\"revoked\":false', '\"revoked\":true') WHERE user_id = ?1 AND revoked = 0",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| AccountError::Storage(e.to_string()))?;

        Ok(affected)
    }

    /// List active sessions for a user.
    pub fn list_user_sessions(&self, user_id: &str) -> Result<Vec<Session>, AccountError> {
        let rows = self.sql
            .query(
                "SELECT data FROM sessions WHERE user_id = ?1 AND revoked = 0 ORDER BY issued_at DESC",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| AccountError::Storage(e.to_string()))?;

        let mut sessions = Vec::new();
        for row in &rows {
            if let Some(data) = row.get_str("data") {
                let session: Session = serde_json::from_str(data)
                    .map_err(|e| AccountError::Internal(e.to_string()))?;
                sessions.push(session);
            }
        }
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CreateAccount;
    use crate::service::test_support::test_service;

    fn create_input(email: &str) -> CreateAccount {
        CreateAccount {
            email: email.to_string(),
            first_name: "Alice".to_string(),
            last_name: "Carter".to_string(),
            password: "correct horse".to_string(),
            password_confirm: "correct horse".to_string(),
            accept_terms: true,
        }
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn login_issues_verifiable_tokens() {
        let (svc, _) = test_service();
        let user = svc.register(create_input("a@example.com")).unwrap();

        let tokens = svc
            .login(
                credentials("a@example.com", "correct horse"),
                ClientInfo {
                    ip_address: Some("203.0.113.9".into()),
                    user_agent: None,
                },
            )
            .unwrap();
        assert_eq!(tokens.token_type, "Bearer");

        let claims = svc.verify_token(&tokens.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.name, "Alice Carter");

        let updated = svc.get_user(&user.id).unwrap();
        assert!(updated.last_login.is_some());
    }

    #[test]
    fn login_rejects_bad_password_and_unknown_email() {
        let (svc, _) = test_service();
        svc.register(create_input("a@example.com")).unwrap();

        let bad = svc.login(credentials("a@example.com", "nope nope"), ClientInfo::default());
        assert!(matches!(bad, Err(AccountError::Unauthorized(_))));

        let unknown = svc.login(credentials("x@example.com", "whatever1"), ClientInfo::default());
        assert!(matches!(unknown, Err(AccountError::Unauthorized(_))));
    }

    #[test]
    fn login_rejects_inactive_account() {
        let (svc, _) = test_service();
        let user = svc.register(create_input("a@example.com")).unwrap();

        let mut deactivated = svc.get_user(&user.id).unwrap();
        deactivated.is_active = false;
        svc.store_user(&deactivated).unwrap();

        let result = svc.login(credentials("a@example.com", "correct horse"), ClientInfo::default());
        assert!(matches!(result, Err(AccountError::Unauthorized(_))));
    }

    #[test]
    fn refresh_rotates_session() {
        let (svc, _) = test_service();
        let user = svc.register(create_input("a@example.com")).unwrap();
        let tokens1 = svc.issue_tokens(&user, None, None).unwrap();

        let tokens2 = svc.refresh_tokens(&tokens1.refresh_token).unwrap();
        assert_ne!(tokens2.access_token, tokens1.access_token);

        // Old pair is revoked, new one works.
        assert!(svc.verify_token(&tokens1.access_token).is_err());
        let claims = svc.verify_token(&tokens2.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
    }

    #[test]
    fn revoke_all_user_sessions_kills_every_token() {
        let (svc, _) = test_service();
        let user = svc.register(create_input("a@example.com")).unwrap();

        let tokens1 = svc.issue_tokens(&user, None, None).unwrap();
        let tokens2 = svc.issue_tokens(&user, None, None).unwrap();
        assert_eq!(svc.list_user_sessions(&user.id).unwrap().len(), 2);

        let count = svc.revoke_all_user_sessions(&user.id).unwrap();
        assert_eq!(count, 2);

        assert!(svc.verify_token(&tokens1.access_token).is_err());
        assert!(svc.verify_token(&tokens2.access_token).is_err());
        assert!(svc.list_user_sessions(&user.id).unwrap().is_empty());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let (svc, _) = test_service();
        assert!(svc.verify_token("this.is.not.a.valid.jwt").is_err());
    }
}
