//! NATS connection glue

use anyhow::{Context, Result};
use async_nats::{Client, ConnectOptions, Event};

use crate::config::NatsServer;

/// Connect to the configured NATS server, wiring connection events into the
/// log. When both `cert` and `key` are configured they are presented as a
/// TLS client certificate.
pub async fn connect(server: &NatsServer) -> Result<Client> {
    let url = format!("nats://{}:{}", server.host, server.port);

    let mut options = ConnectOptions::new().event_callback(|event| async move {
        match event {
            Event::Disconnected => tracing::warn!("connection to NATS server lost"),
            Event::Connected => tracing::info!("reconnected to NATS server"),
            Event::ClientError(err) => tracing::error!("NATS client error: {err}"),
            other => tracing::debug!("NATS client event: {other}"),
        }
    });

    if let (Some(cert), Some(key)) = (&server.cert, &server.key) {
        options = options.add_client_certificate(cert.clone(), key.clone()).require_tls(true);
    }

    options
        .connect(&url)
        .await
        .with_context(|| format!("failed to connect to NATS server at {url}"))
}
