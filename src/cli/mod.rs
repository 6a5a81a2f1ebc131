//! Command-line interface for nats-tap
//!
//! One implicit command with two modes: listen (the default) and, when
//! `--send` is given, publish a single message.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::client;
use crate::config::{self, CliOverrides};

mod listen;
mod send;

/// Log the messages from various NATS subjects
#[derive(Parser)]
#[command(name = "nats-tap")]
#[command(author, version)]
pub struct Cli {
    /// A message to send (words are joined by single spaces)
    #[arg(value_name = "WORD")]
    words: Vec<String>,

    /// Load configuration from this YAML file
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// The NATS server's host
    #[arg(short = 'H', long, value_name = "HOST")]
    host: Option<String>,

    /// The NATS server's port
    #[arg(short = 'P', long, value_name = "PORT")]
    port: Option<String>,

    /// Send/listen for raw payloads instead of decoding them as JSON
    #[arg(short = 'r', long, overrides_with = "no_raw")]
    raw: bool,

    /// Decode payloads as JSON (negates a configured rawMessages: true)
    #[arg(long, overrides_with = "raw")]
    no_raw: bool,

    /// Publish one message to this subject instead of listening
    #[arg(short = 's', long, value_name = "SUBJECT")]
    send: Option<String>,

    /// Load the message to send from a YAML file
    #[arg(short = 'm', long, value_name = "PATH")]
    message_file: Option<PathBuf>,

    /// Report additional information about what is happening
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    /// The tri-state `--raw`/`--no-raw` pair: `None` when neither flag was
    /// given, so the file-configured value survives.
    fn raw_override(&self) -> Option<bool> {
        if self.raw {
            Some(true)
        } else if self.no_raw {
            Some(false)
        } else {
            None
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Wire verbose flag to the tracing log level.
    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let overrides = CliOverrides {
        host: cli.host.clone(),
        port: cli.port.clone(),
        raw: cli.raw_override(),
    };
    let config = config::load_config(cli.config.as_deref(), &overrides)?;

    if cli.verbose {
        println!("---------------------------------------------------------------");
        println!("Configuration:");
        print!("{}", serde_yaml::to_string(&config)?);
        println!("---------------------------------------------------------------");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let client = client::connect(&config.nats_server).await?;
        match &cli.send {
            Some(subject) => {
                send::run(&client, &config, subject, &cli.words, cli.message_file.as_deref()).await
            }
            None => listen::run(&client, &config).await,
        }
    })
}
