//! Server configuration.
//!
//! Loaded from a TOML file; the `-c` argument is either a context name
//! (resolved to `/etc/dealerdesk/<name>.toml`) or a direct path.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageSection,
    pub jwt: JwtSection,
    #[serde(default)]
    pub mail: MailSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    /// Directory holding the SQLite database.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtSection {
    /// Signing secret for session and purpose tokens.
    pub secret: String,

    /// Access token lifetime in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: i64,

    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailSection {
    /// Base URL used in emailed links.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Minimum pause between verification emails, in seconds.
    #[serde(default = "default_cooldown")]
    pub verification_cooldown_secs: i64,

    /// Email verification link lifetime in seconds.
    #[serde(default = "default_verify_ttl")]
    pub verify_token_ttl_secs: i64,

    /// Password reset link lifetime in seconds.
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_secs: i64,
}

impl Default for MailSection {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            verification_cooldown_secs: default_cooldown(),
            verify_token_ttl_secs: default_verify_ttl(),
            reset_token_ttl_secs: default_reset_ttl(),
        }
    }
}

fn default_access_ttl() -> i64 {
    86400 // 24h
}

fn default_refresh_ttl() -> i64 {
    604800 // 7 days
}

fn default_site_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_cooldown() -> i64 {
    60
}

fn default_verify_ttl() -> i64 {
    259200 // 3 days
}

fn default_reset_ttl() -> i64 {
    3600 // 1h
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    ///
    /// Names without `/` or `.` map to `/etc/dealerdesk/<name>.toml`.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/dealerdesk/{}.toml", name_or_path))
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("cannot parse {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Refuse to start on a configuration that cannot work.
    pub fn verify(&self) -> anyhow::Result<()> {
        if self.jwt.secret.is_empty() {
            anyhow::bail!("JWT secret is empty in configuration.");
        }
        if self.storage.data_dir.is_empty() {
            anyhow::bail!("Storage data_dir is empty in configuration.");
        }
        Ok(())
    }

    /// Account service configuration derived from this file.
    pub fn account_config(&self) -> account::service::AccountConfig {
        account::service::AccountConfig {
            jwt_secret: self.jwt.secret.clone(),
            access_token_ttl: self.jwt.access_ttl_secs,
            refresh_token_ttl: self.jwt.refresh_ttl_secs,
            verify_token_ttl: self.mail.verify_token_ttl_secs,
            reset_token_ttl: self.mail.reset_token_ttl_secs,
            verification_cooldown: self.mail.verification_cooldown_secs,
            site_url: self.mail.site_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_path_rules() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/dealerdesk/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
    }

    #[test]
    fn load_and_verify() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(
            &path,
            r#"
            [storage]
            data_dir = "/var/lib/dealerdesk"

            [jwt]
            secret = "test-secret"

            [mail]
            site_url = "https://dealerdesk.example"
            "#,
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        config.verify().unwrap();
        assert_eq!(config.jwt.access_ttl_secs, 86400);
        assert_eq!(config.mail.site_url, "https://dealerdesk.example");
        assert_eq!(config.mail.verification_cooldown_secs, 60);
    }

    #[test]
    fn verify_rejects_empty_secret() {
        let config = ServerConfig {
            storage: StorageSection {
                data_dir: "/tmp".into(),
            },
            jwt: JwtSection {
                secret: String::new(),
                access_ttl_secs: 1,
                refresh_ttl_secs: 1,
            },
            mail: MailSection::default(),
        };
        assert!(config.verify().is_err());
    }
}
