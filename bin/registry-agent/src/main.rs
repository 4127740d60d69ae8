use anyhow::{Context, Result};
use registry_core::{RegistrySession, Vendor};
use registry_transport::JsonLineConnector;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod bus;
mod config;

use bus::NotifyListener;
use config::{AgentConfig, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("registry_agent=info,registry_core=info,registry_transport=info")
        }))
        .init();

    info!("Starting registry-agent...");

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("REGISTRY_AGENT_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AgentConfig::load(&config_path)?;
    info!("Loaded config from {}", config_path);

    let bus = Arc::new(NotifyListener::default());
    let factory = Arc::new(JsonLineConnector::new(config.connector_config()));
    let session = Arc::new(RegistrySession::with_config(
        factory,
        bus.clone(),
        config.session_config(),
    ));

    let mut dispatcher = session
        .connect()
        .await
        .with_context(|| format!("Failed to connect to registry at {}", config.connector_config().addr()))?;

    let vendors = config.vendors();
    session
        .register(
            vendors.clone(),
            &config.node.ip,
            config.node.port,
            &config.node.app,
            &config.node.service,
            &config.node.version,
        )
        .await
        .context("Failed to send registration")?;

    let mut report = tokio::time::interval(config.report_interval());
    let mut registered = false;

    loop {
        tokio::select! {
            _ = bus.wait(), if !registered => {
                registered = true;
                report_addresses(&session, &vendors).await;
            }
            _ = report.tick(), if registered => {
                report_addresses(&session, &vendors).await;
            }
            _ = &mut dispatcher => {
                warn!("Registry connection lost, shutting down");
                break;
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for ctrl-c")?;
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!(registrations = bus.completions(), "registry-agent stopped");
    Ok(())
}

/// Log how many instances are known for each declared vendor
async fn report_addresses(session: &RegistrySession, vendors: &[Vendor]) {
    for vendor in vendors {
        let addresses = session.get_all_addresses(vendor.identity()).await;
        if addresses.is_empty() {
            warn!(vendor = %vendor.identity(), "No known instances");
            continue;
        }

        info!(vendor = %vendor.identity(), instances = addresses.len(), "Vendor instances");
        for address in &addresses {
            debug!(
                vendor = %vendor.identity(),
                addr = %address.authority(),
                node_id = %address.node_id,
                "Instance"
            );
        }
    }
}
