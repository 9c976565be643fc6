//! # Mailsieve
//!
//! Rule-based IMAP mail processor: fetch messages from a mailbox, persist
//! them in a local SQLite store, and evaluate a declarative rule set against
//! each stored message to decide which actions apply. Action execution is
//! left to the caller; the engine only reports matches.

pub mod config;
pub mod db;
pub mod filters;
pub mod mail;

pub use config::AppConfig;
pub use db::{Database, StoredMessage};
pub use filters::{FilterEngine, MatchResult, RuleSet};
