//! # casabusd — casabus daemon
//!
//! Composition root that wires the bus adapter into the application core
//! and runs until interrupted.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env vars) and the device catalog
//! - Initialize tracing
//! - Build the device registry and spawn the event pipeline consumer
//! - Start the monitor loop and construct the command transport
//! - Expose the intent service and issue the initial status refresh
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use casabus_adapter_bus_tcp::{MonitorLoop, TcpCommandTransport};
use casabus_app::event_bus::EventBus;
use casabus_app::pipeline;
use casabus_app::registry::DeviceRegistry;
use casabus_app::service::HomeService;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    if config.catalog.is_empty() {
        tracing::warn!("device catalog is empty; add [[catalog.lights]] / [[catalog.shutters]] entries to casabusd.toml");
    }

    // Registry + pipeline: the single writer of device state.
    let registry = DeviceRegistry::from_catalog(&config.catalog)?;
    let events = EventBus::new(64);
    let (pipeline, registry_handle, applier) =
        pipeline::spawn(config.pipeline.capacity, registry, events.clone());

    // Monitor channel.
    let monitor = MonitorLoop::start(config.bus.clone(), pipeline.clone());

    // Command channel + intent service.
    let transport = TcpCommandTransport::new(config.bus.clone(), pipeline.clone());
    let service = HomeService::new(transport, registry_handle, events.clone());

    tracing::info!(
        host = %config.bus.host,
        port = config.bus.port,
        lights = config.catalog.lights.len(),
        shutters = config.catalog.shutters.len(),
        "casabusd started"
    );

    // Learn the actual device states as soon as the bus is reachable.
    service.refresh_lights_status();
    service.refresh_shutters_status();

    spawn_link_logger(&monitor);
    spawn_event_logger(events.subscribe());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    monitor.stop();
    drop(service);
    drop(pipeline);
    applier.await?;

    Ok(())
}

/// Log monitor connectivity transitions.
fn spawn_link_logger(monitor: &casabus_adapter_bus_tcp::MonitorHandle) {
    let mut link = monitor.link();
    tokio::spawn(async move {
        while link.changed().await.is_ok() {
            let state = *link.borrow_and_update();
            tracing::info!(%state, "monitor link");
        }
    });
}

/// Log state changes and dispatch failures from the event bus.
fn spawn_event_logger(mut events: broadcast::Receiver<casabus_domain::event::HomeEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::info!(?event, "bus event"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event logger fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
