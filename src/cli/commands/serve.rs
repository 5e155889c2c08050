//! `issue-shepherd serve`: webhook server plus the daily timer.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::webhook::WebhookServer;
use crate::cli::types::{GlobalArgs, ServeArgs};
use crate::infrastructure::config::Settings;

pub async fn execute(global: &GlobalArgs, settings: &Settings, args: &ServeArgs) -> Result<()> {
    let shepherd = Arc::new(super::connect(global, settings)?);

    // On failure the sets stay empty until the next membership webhook.
    if let Err(e) = shepherd.membership().refresh().await {
        tracing::warn!(error = %e, "initial membership load failed");
    }

    match shepherd.scheduler() {
        Some(scheduler) => {
            tokio::spawn(scheduler.run());
        }
        None => tracing::info!("daily detection disabled"),
    }

    let host = args.host.as_deref().unwrap_or(&settings.server.host);
    let port = args.port.unwrap_or(settings.server.port);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;

    WebhookServer::new(shepherd, &settings.auth)
        .serve(addr, shutdown_signal())
        .await
        .context("Webhook server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
