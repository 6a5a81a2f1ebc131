//! nats-tap: log the messages from various NATS subjects
//!
//! Connects to a NATS server, subscribes to one or more subjects (wildcards
//! included), and prints every received message in human-readable form.
//! Can alternatively publish a single ad-hoc message with `--send`.

use anyhow::Result;

mod cli;
mod client;
mod config;
mod message;

fn main() -> Result<()> {
    cli::run()
}
