//! RFC 822 message parsing
//!
//! Normalizes a raw message into the stored shape: Message-ID, date text,
//! sender, decoded subject, and the first plaintext body part.

use chrono::{FixedOffset, TimeZone};
use mail_parser::MessageParser;

use crate::db::StoredMessage;
use crate::filters::conditions::DATE_FORMAT;
use crate::mail::{MailError, MailResult};

/// Parse raw RFC 822 bytes into a storable message.
///
/// Messages without a Message-ID or Date header are rejected; a missing
/// plaintext part yields an empty body, never an error.
pub fn parse_message(raw: &[u8]) -> MailResult<StoredMessage> {
    let parsed = MessageParser::default()
        .parse(raw)
        .ok_or_else(|| MailError::Parse("not an RFC 822 message".to_string()))?;

    let id = parsed
        .message_id()
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| MailError::Parse("missing Message-ID header".to_string()))?;

    let date = parsed
        .date()
        .and_then(format_date)
        .ok_or_else(|| MailError::Parse("missing or invalid Date header".to_string()))?;

    let from_address = parsed
        .from()
        .and_then(|addr| addr.first())
        .map(|a| match (a.name(), a.address()) {
            (Some(name), Some(address)) => format!("{} <{}>", name, address),
            (None, Some(address)) => address.to_string(),
            (Some(name), None) => name.to_string(),
            (None, None) => String::new(),
        })
        .unwrap_or_default();

    let subject = parsed.subject().unwrap_or_default().to_string();

    // First text/plain part; multipart messages contribute the first one
    // found walking the parts depth-first.
    let body = parsed.body_text(0).map(|s| s.to_string()).unwrap_or_default();

    Ok(StoredMessage {
        id,
        date,
        from_address,
        subject,
        body,
    })
}

/// Render a parsed header date into the fixed storage pattern.
fn format_date(date: &mail_parser::DateTime) -> Option<String> {
    let mut offset_secs = i32::from(date.tz_hour) * 3600 + i32::from(date.tz_minute) * 60;
    if date.tz_before_gmt {
        offset_secs = -offset_secs;
    }
    let offset = FixedOffset::east_opt(offset_secs)?;

    let rendered = offset
        .with_ymd_and_hms(
            i32::from(date.year),
            u32::from(date.month),
            u32::from(date.day),
            u32::from(date.hour),
            u32::from(date.minute),
            u32::from(date.second),
        )
        .single()?
        .format(DATE_FORMAT)
        .to_string();
    Some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = "Message-ID: <1@example.com>\r\n\
        Date: Mon, 19 Jul 2021 10:00:00 +0000\r\n\
        From: Sender <sender@example.com>\r\n\
        To: you@example.com\r\n\
        Subject: Test Email 1\r\n\
        Content-Type: text/plain; charset=utf-8\r\n\
        \r\n\
        Hello from the test fixture.\r\n";

    #[test]
    fn parses_simple_message() {
        let message = parse_message(SIMPLE.as_bytes()).unwrap();
        assert_eq!(message.id, "1@example.com");
        assert_eq!(message.date, "Mon, 19 Jul 2021 10:00:00 +0000");
        assert_eq!(message.from_address, "Sender <sender@example.com>");
        assert_eq!(message.subject, "Test Email 1");
        assert!(message.body.contains("Hello from the test fixture."));
    }

    #[test]
    fn stored_date_parses_under_engine_pattern() {
        let message = parse_message(SIMPLE.as_bytes()).unwrap();
        assert!(crate::filters::conditions::parse_message_date(&message.date).is_ok());
    }

    #[test]
    fn multipart_takes_first_plaintext_part() {
        let raw = "Message-ID: <2@example.com>\r\n\
            Date: Tue, 20 Jul 2021 08:30:00 +0200\r\n\
            From: sender@example.com\r\n\
            Subject: Multipart\r\n\
            Content-Type: multipart/alternative; boundary=\"xyz\"\r\n\
            \r\n\
            --xyz\r\n\
            Content-Type: text/plain; charset=utf-8\r\n\
            \r\n\
            plain part\r\n\
            --xyz\r\n\
            Content-Type: text/html; charset=utf-8\r\n\
            \r\n\
            <p>html part</p>\r\n\
            --xyz--\r\n";

        let message = parse_message(raw.as_bytes()).unwrap();
        assert!(message.body.contains("plain part"));
        assert!(!message.body.contains("<p>"));
        assert_eq!(message.date, "Tue, 20 Jul 2021 08:30:00 +0200");
    }

    #[test]
    fn missing_message_id_is_rejected() {
        let raw = "Date: Mon, 19 Jul 2021 10:00:00 +0000\r\n\
            From: sender@example.com\r\n\
            Subject: No id\r\n\
            \r\n\
            body\r\n";
        let err = parse_message(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, MailError::Parse(_)));
    }

    #[test]
    fn headers_only_message_gets_empty_body() {
        let raw = "Message-ID: <3@example.com>\r\n\
            Date: Mon, 19 Jul 2021 10:00:00 +0000\r\n\
            From: sender@example.com\r\n\
            Subject: Empty\r\n\
            \r\n";
        let message = parse_message(raw.as_bytes()).unwrap();
        assert!(message.body.is_empty());
    }

    #[test]
    fn encoded_subject_is_decoded() {
        // RFC 2047 encoded "Grüße"
        let raw = "Message-ID: <4@example.com>\r\n\
            Date: Mon, 19 Jul 2021 10:00:00 +0000\r\n\
            From: sender@example.com\r\n\
            Subject: =?utf-8?B?R3LDvMOfZQ==?=\r\n\
            \r\n\
            body\r\n";
        let message = parse_message(raw.as_bytes()).unwrap();
        assert_eq!(message.subject, "Grüße");
    }
}
