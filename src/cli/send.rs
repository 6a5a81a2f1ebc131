//! Send mode: publish a single ad-hoc message

use anyhow::{Context, Result};
use async_nats::Client;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::message::Encoding;

enum Payload {
    Text(String),
    Structured(serde_json::Value),
}

/// Publish one message to `subject` and exit. The message is the positional
/// words joined by spaces, or the contents of `--message-file` when given.
pub async fn run(
    client: &Client,
    config: &Config,
    subject: &str,
    words: &[String],
    message_file: Option<&Path>,
) -> Result<()> {
    let payload = load_payload(words, message_file, config.raw_messages);

    let (bytes, shown, encoding) = match (config.raw_messages, payload) {
        (true, Payload::Text(text)) => (text.clone().into_bytes(), text, Encoding::Raw),
        (_, Payload::Structured(value)) => {
            let bytes = serde_json::to_vec(&value).context("failed to encode message as JSON")?;
            (bytes, value.to_string(), Encoding::Json)
        }
        (false, Payload::Text(text)) => {
            // A textual message that parses as JSON is sent structurally;
            // anything else goes out as a JSON string.
            let value = serde_json::from_str::<serde_json::Value>(&text)
                .unwrap_or(serde_json::Value::String(text));
            let bytes = serde_json::to_vec(&value).context("failed to encode message as JSON")?;
            (bytes, value.to_string(), Encoding::Json)
        }
    };

    println!("  sending a message:");
    println!("   subject: [{subject}]");
    println!("   message: [{shown}]");
    println!("  encoding: {encoding}");

    client
        .publish(subject.to_string(), bytes.into())
        .await
        .with_context(|| format!("failed to publish to [{subject}]"))?;
    client.flush().await.context("failed to flush NATS connection")?;
    Ok(())
}

/// Resolve the outgoing message. A message file that cannot be read or
/// parsed is reported and the positional words are used instead.
fn load_payload(words: &[String], message_file: Option<&Path>, raw: bool) -> Payload {
    let joined = words.join(" ");

    let Some(path) = message_file else {
        return Payload::Text(joined);
    };

    match fs::read_to_string(path) {
        Ok(content) if raw => Payload::Text(content),
        Ok(content) => match serde_yaml::from_str::<serde_json::Value>(&content) {
            Ok(value) => Payload::Structured(value),
            Err(err) => {
                tracing::warn!("could not parse the message file [{}]: {err}", path.display());
                Payload::Text(joined)
            }
        },
        Err(err) => {
            tracing::warn!("could not load the message file [{}]: {err}", path.display());
            Payload::Text(joined)
        }
    }
}
