//! Message payload decoding and console formatting

use std::fmt;

/// How a payload ended up being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Raw,
    Json,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Raw => write!(f, "raw"),
            Encoding::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    pub text: String,
    pub encoding: Encoding,
}

/// Decode a received payload for display.
///
/// In raw mode the UTF-8 payload is passed through verbatim (lossily for
/// non-UTF-8 bytes). Otherwise the payload is parsed as JSON: a JSON string
/// is shown bare, any other JSON value is re-dumped as YAML on the following
/// lines so nested structures stay readable. Payloads that are not valid
/// JSON fall back to raw.
pub fn decode_payload(payload: &[u8], raw: bool) -> DecodedMessage {
    let text = String::from_utf8_lossy(payload).into_owned();
    if raw {
        return DecodedMessage { text, encoding: Encoding::Raw };
    }

    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(serde_json::Value::String(s)) => DecodedMessage { text: s, encoding: Encoding::Json },
        Ok(value) => match serde_yaml::to_string(&value) {
            Ok(dumped) => DecodedMessage { text: format!("\n{dumped}"), encoding: Encoding::Json },
            Err(_) => DecodedMessage { text, encoding: Encoding::Raw },
        },
        Err(_) => DecodedMessage { text, encoding: Encoding::Raw },
    }
}

/// Print one received message. `pattern` is the subscription the message
/// arrived through, which may be a wildcard covering many concrete subjects.
pub fn print_received(subject: &str, pattern: &str, decoded: &DecodedMessage) {
    println!();
    println!("  subject: {subject}({pattern})");
    println!("  message: [{}]", decoded.text);
    println!(" encoding: {}", decoded.encoding);
}
