//! Runtime configuration assembled from the environment
//!
//! A `.env` file is honored when present (loaded by the binary before this
//! runs). Credentials are kept inside `ImapConfig` and never logged.

use std::env;
use std::path::PathBuf;

use crate::mail::{ImapConfig, MailError, MailResult, SecurityType};

/// Everything the binary needs: where to fetch, where to store, which rules.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub imap: ImapConfig,
    pub db_path: PathBuf,
    pub rules_path: PathBuf,
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// `EMAIL_ACCOUNT` and `EMAIL_PASSWORD` are required; everything else
    /// has a default (Gmail host, `emails.db`, `rules.json`).
    pub fn from_env() -> MailResult<Self> {
        let username = env::var("EMAIL_ACCOUNT")
            .map_err(|_| MailError::Config("EMAIL_ACCOUNT is not set".to_string()))?;
        let password = env::var("EMAIL_PASSWORD")
            .map_err(|_| MailError::Config("EMAIL_PASSWORD is not set".to_string()))?;

        let host = env::var("IMAP_HOST").unwrap_or_else(|_| "imap.gmail.com".to_string());
        let security = SecurityType::SSL;
        let port: u16 = env::var("IMAP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| security.default_imap_port());

        let db_path = env::var("MAILSIEVE_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("emails.db"));
        let rules_path = env::var("MAILSIEVE_RULES")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("rules.json"));

        Ok(Self {
            imap: ImapConfig {
                host,
                port,
                security,
                username,
                password,
            },
            db_path,
            rules_path,
        })
    }
}
