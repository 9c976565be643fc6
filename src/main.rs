use std::process::ExitCode;

use log::{error, info, warn};

use mailsieve::config::AppConfig;
use mailsieve::db::Database;
use mailsieve::filters::{FilterEngine, RuleSet};
use mailsieve::mail::{parse_message, ImapClient};

const INBOX: &str = "INBOX";

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    // Load rules up front so a bad rule file fails before any network I/O.
    let rule_set = RuleSet::load(&config.rules_path)?;
    info!("Loaded {} rules from {}", rule_set.rules.len(), config.rules_path.display());

    let db = Database::new(config.db_path.clone())?;

    let mut client = ImapClient::new(config.imap.clone());
    client.connect()?;
    let raw_messages = client.fetch_all(INBOX)?;
    client.disconnect()?;
    info!("Fetched {} messages", raw_messages.len());

    let mut messages = Vec::with_capacity(raw_messages.len());
    for raw in &raw_messages {
        match parse_message(raw) {
            Ok(message) => messages.push(message),
            Err(e) => warn!("Skipping message: {e}"),
        }
    }
    let stored = db.batch_upsert_messages(&messages)?;
    info!("Stored {stored} messages in {}", config.db_path.display());

    let snapshot = db.list_messages()?;
    let engine = FilterEngine::new();
    let report = engine.run(&snapshot, &rule_set);

    for result in &report.matches {
        println!(
            "{} matched rule {}: actions {:?}",
            result.message_id,
            result.rule_name.as_deref().unwrap_or("(unnamed)"),
            result.actions
        );
    }
    if !report.failures.is_empty() {
        warn!("{} message/rule evaluations failed", report.failures.len());
    }
    info!(
        "Evaluated {} messages against {} rules: {} matches",
        snapshot.len(),
        rule_set.rules.len(),
        report.matches.len()
    );

    Ok(())
}
