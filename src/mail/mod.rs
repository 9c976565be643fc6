//! Mail ingestion
//!
//! IMAP fetching and RFC 822 parsing; the rest of the crate only sees the
//! normalized `StoredMessage` shape.

pub mod config;
pub mod imap;
pub mod parse;

// Re-export commonly used types
pub use config::{ImapConfig, SecurityType};
pub use imap::ImapClient;
pub use parse::parse_message;

/// Result type alias for mail operations
pub type MailResult<T> = Result<T, MailError>;

/// Unified error type for mail operations
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("IMAP error: {0}")]
    Imap(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not connected")]
    NotConnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
