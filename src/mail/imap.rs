//! IMAP Client Implementation
//!
//! Single blocking TLS connection used to pull every message in a mailbox
//! as raw RFC 822 bytes.

use std::net::TcpStream;

use imap::Session;
use native_tls::{TlsConnector, TlsStream};

use crate::mail::{
    config::{ImapConfig, SecurityType},
    MailError, MailResult,
};

/// IMAP client wrapper over a TLS session
pub struct ImapClient {
    session: Option<Session<TlsStream<TcpStream>>>,
    config: ImapConfig,
}

impl ImapClient {
    /// Create a new IMAP client with the given configuration
    pub fn new(config: ImapConfig) -> Self {
        Self {
            session: None,
            config,
        }
    }

    /// Connect and authenticate against the IMAP server
    pub fn connect(&mut self) -> MailResult<()> {
        let tls = TlsConnector::builder()
            .build()
            .map_err(|e| MailError::Connection(e.to_string()))?;

        let address = match self.config.security {
            SecurityType::SSL => format!("{}:{}", self.config.host, self.config.port),
            // The imap crate has no built-in STARTTLS upgrade; fall back to
            // direct TLS on 993.
            SecurityType::STARTTLS => format!("{}:993", self.config.host),
            SecurityType::NONE => {
                return Err(MailError::Connection(
                    "Insecure connections not supported".to_string(),
                ));
            }
        };

        let stream =
            TcpStream::connect(&address).map_err(|e| MailError::Connection(e.to_string()))?;
        stream
            .set_read_timeout(Some(std::time::Duration::from_secs(30)))
            .ok();
        stream
            .set_write_timeout(Some(std::time::Duration::from_secs(30)))
            .ok();

        let tls_stream = tls
            .connect(&self.config.host, stream)
            .map_err(|e| MailError::Connection(e.to_string()))?;

        let client = imap::Client::new(tls_stream);
        let session = client
            .login(&self.config.username, &self.config.password)
            .map_err(|e| MailError::Authentication(e.0.to_string()))?;

        self.session = Some(session);
        log::info!("Connected to IMAP server: {}", self.config.host);
        Ok(())
    }

    /// Get mutable reference to session
    fn session(&mut self) -> MailResult<&mut Session<TlsStream<TcpStream>>> {
        self.session.as_mut().ok_or(MailError::NotConnected)
    }

    /// Disconnect from the server
    pub fn disconnect(&mut self) -> MailResult<()> {
        if let Some(mut session) = self.session.take() {
            session
                .logout()
                .map_err(|e| MailError::Imap(e.to_string()))?;
        }
        Ok(())
    }

    /// Fetch every message in `folder` as raw RFC 822 bytes.
    ///
    /// One full pass, no delta tracking; sequence numbers are fetched in
    /// ascending order so the result follows mailbox order.
    pub fn fetch_all(&mut self, folder: &str) -> MailResult<Vec<Vec<u8>>> {
        let session = self.session()?;

        session
            .select(folder)
            .map_err(|e| MailError::Imap(e.to_string()))?;

        let ids = session
            .search("ALL")
            .map_err(|e| MailError::Imap(e.to_string()))?;

        let mut ids: Vec<u32> = ids.into_iter().collect();
        ids.sort_unstable();
        log::info!("Folder {} holds {} messages", folder, ids.len());

        let mut raw_messages = Vec::with_capacity(ids.len());
        for id in ids {
            let messages = session
                .fetch(id.to_string(), "RFC822")
                .map_err(|e| MailError::Imap(e.to_string()))?;

            if let Some(body) = messages.iter().next().and_then(|m| m.body()) {
                raw_messages.push(body.to_vec());
            } else {
                log::warn!("Message {} returned no RFC822 body, skipping", id);
            }
        }

        Ok(raw_messages)
    }
}
