// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use agent_injector::config::{InjectorConfig, ServerConfig};
use agent_injector::injector::Injector;
use agent_injector::webhook;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing, defaulting to info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting agent injector");

    // Load configuration
    let config = InjectorConfig::from_env()?;
    let server_config = ServerConfig::from_env()?;
    info!(
        image = %config.sidecar_image,
        ignored_namespaces = ?config.ignored_namespaces,
        kubelet_port = ?config.kubelet_port,
        kubelet_read_only_port = ?config.kubelet_read_only_port,
        kubelet_insecure_tls = config.kubelet_insecure_tls,
        "Configuration loaded"
    );
    if config.agent_api_key.is_empty() {
        warn!("No default API key configured, pods must reference an API key secret");
    }

    let injector = Injector::new(config);

    webhook::serve(&server_config, injector).await?;

    // serve only returns once the listener stops
    warn!("Admission webhook server stopped");
    Ok(())
}
