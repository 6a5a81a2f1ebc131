//! Listen mode: subscribe to every configured subject and log messages

use anyhow::{Context, Result};
use async_nats::{Client, Subscriber};
use chrono::Local;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::message;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// Subscribe once to each configured subject and print every message until
/// a termination signal arrives. A heartbeat timestamp is printed every
/// [`HEARTBEAT_INTERVAL`] so an idle session is visibly alive.
pub async fn run(client: &Client, config: &Config) -> Result<()> {
    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    println!("Listening to NATS subjects:");
    let mut tasks = JoinSet::new();
    for subject in &config.subjects {
        println!("  [{subject}]");
        let subscriber = client
            .subscribe(subject.clone())
            .await
            .with_context(|| format!("failed to subscribe to [{subject}]"))?;
        tasks.spawn(listen_to_subject(
            subscriber,
            subject.clone(),
            config.raw_messages,
            shutdown.clone(),
        ));
    }
    tasks.spawn(heartbeat(shutdown.clone()));

    shutdown.cancelled().await;
    while tasks.join_next().await.is_some() {}

    client.flush().await.context("failed to flush NATS connection during shutdown")?;
    Ok(())
}

async fn listen_to_subject(
    mut subscriber: Subscriber,
    pattern: String,
    raw: bool,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = subscriber.next() => match received {
                Some(msg) => {
                    let decoded = message::decode_payload(&msg.payload, raw);
                    message::print_received(msg.subject.as_str(), &pattern, &decoded);
                }
                None => {
                    tracing::warn!("subscription [{pattern}] closed by the server");
                    break;
                }
            }
        }
    }
}

async fn heartbeat(shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick fires immediately; swallow it so the heartbeat does not
    // land in the middle of the subject listing.
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                println!();
                println!("{}", Local::now().format("%Y-%m-%d %H:%M:%S%.6f"));
            }
        }
    }
}

fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let signal = shutdown_signal().await;
        println!();
        println!("Shutting down: caught {signal}");
        shutdown.cancel();
    });
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    match (signal(SignalKind::terminate()), signal(SignalKind::hangup())) {
        (Ok(mut terminate), Ok(mut hangup)) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT",
                _ = terminate.recv() => "SIGTERM",
                _ = hangup.recv() => "SIGHUP",
            }
        }
        _ => {
            let _ = tokio::signal::ctrl_c().await;
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "ctrl-c"
}
