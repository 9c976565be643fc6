//! Database module for Mailsieve
//!
//! SQLite-backed message store. Ingestion upserts normalized messages; the
//! filter engine reads full snapshots and never writes.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::params;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Connection pooling
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Record not found: {0}")]
    NotFound(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// One stored email, keyed by its Message-ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    /// RFC 822 date-time text, e.g. `Mon, 19 Jul 2021 10:00:00 +0000`.
    pub date: String,
    pub from_address: String,
    pub subject: String,
    /// First text/plain part; empty when the message has none.
    pub body: String,
}

/// Message store backed by a pooled SQLite connection.
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl Database {
    /// Open (or create) the message store at the given path.
    pub fn new(db_path: PathBuf) -> DbResult<Self> {
        let manager = SqliteConnectionManager::file(&db_path);

        let pool = Pool::builder()
            .max_size(8)
            .connection_timeout(std::time::Duration::from_secs(10))
            .build(manager)?;

        let conn = pool.get()?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        "#,
        )?;
        conn.execute_batch(include_str!("schema.sql"))?;
        drop(conn);

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Create an in-memory store (for testing).
    ///
    /// Pool size 1: each connection to `:memory:` would otherwise get its
    /// own private database.
    pub fn in_memory() -> DbResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;

        let conn = pool.get()?;
        conn.execute_batch(include_str!("schema.sql"))?;
        drop(conn);

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Get a connection from the pool
    #[inline]
    fn get_conn(&self) -> DbResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Insert or update a message; the Message-ID is the conflict key.
    pub fn upsert_message(&self, message: &StoredMessage) -> DbResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO messages (id, date, from_address, subject, body)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                date = excluded.date,
                from_address = excluded.from_address,
                subject = excluded.subject,
                body = excluded.body
            "#,
            params![
                message.id,
                message.date,
                message.from_address,
                message.subject,
                message.body,
            ],
        )?;
        Ok(())
    }

    /// Upsert a batch of messages in a single transaction.
    pub fn batch_upsert_messages(&self, messages: &[StoredMessage]) -> DbResult<usize> {
        if messages.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO messages (id, date, from_address, subject, body)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    date = excluded.date,
                    from_address = excluded.from_address,
                    subject = excluded.subject,
                    body = excluded.body
                "#,
            )?;
            for message in messages {
                stmt.execute(params![
                    message.id,
                    message.date,
                    message.from_address,
                    message.subject,
                    message.body,
                ])?;
            }
        }
        tx.commit()?;

        Ok(messages.len())
    }

    /// Scan every stored message, in insertion order.
    pub fn list_messages(&self) -> DbResult<Vec<StoredMessage>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, date, from_address, subject, body FROM messages ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredMessage {
                id: row.get(0)?,
                date: row.get(1)?,
                from_address: row.get(2)?,
                subject: row.get(3)?,
                body: row.get(4)?,
            })
        })?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    /// Fetch a single message by Message-ID.
    pub fn get_message(&self, id: &str) -> DbResult<StoredMessage> {
        let conn = self.get_conn()?;
        conn.query_row(
            "SELECT id, date, from_address, subject, body FROM messages WHERE id = ?1",
            params![id],
            |row| {
                Ok(StoredMessage {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    from_address: row.get(2)?,
                    subject: row.get(3)?,
                    body: row.get(4)?,
                })
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(id.to_string()),
            other => DbError::Sqlite(other),
        })
    }

    /// Number of stored messages.
    pub fn message_count(&self) -> DbResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(count)
    }
}
