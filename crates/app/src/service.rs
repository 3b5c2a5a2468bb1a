//! Intent service — the callable surface the presentation layer uses.
//!
//! Intents are fire-and-forget: the caller gets no synchronous result,
//! and effects arrive later through registry snapshots once the
//! controller's event frames round-trip the pipeline. The service never
//! writes device state itself — that stays with the pipeline's single
//! consumer.

use std::sync::Arc;

use casabus_domain::device::{DeviceKind, LightState, ShutterState};
use casabus_domain::event::HomeEvent;
use casabus_domain::frame::Frame;
use casabus_domain::id::DeviceId;

use crate::event_bus::EventBus;
use crate::ports::CommandTransport;
use crate::registry::RegistryHandle;

/// Application service exposing device intents over a [`CommandTransport`].
#[derive(Debug)]
pub struct HomeService<T> {
    transport: Arc<T>,
    registry: RegistryHandle,
    events: EventBus,
}

impl<T> Clone for HomeService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            registry: self.registry.clone(),
            events: self.events.clone(),
        }
    }
}

impl<T: CommandTransport + 'static> HomeService<T> {
    /// Create a new service dispatching through the given transport.
    pub fn new(transport: T, registry: RegistryHandle, events: EventBus) -> Self {
        Self {
            transport: Arc::new(transport),
            registry,
            events,
        }
    }

    /// Read-only registry view, for callers that only hold the service.
    #[must_use]
    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    /// Ask the controller to switch a light. Unknown ids are ignored with
    /// a log, mirroring the registry's tolerance for unknown devices.
    pub fn change_light_state(&self, id: DeviceId, state: LightState) {
        if self.registry.light(id).is_none() {
            tracing::warn!(%id, "change requested for uncatalogued light");
            return;
        }
        let frame = Frame::command(DeviceKind::Light.who(), state.wire_value(), id.value());
        tracing::info!(%id, %state, "dispatching light command");
        self.dispatch(vec![frame.encode()]);
    }

    /// Ask the controller to move a shutter.
    pub fn change_shutter_state(&self, id: DeviceId, state: ShutterState) {
        if self.registry.shutter(id).is_none() {
            tracing::warn!(%id, "change requested for uncatalogued shutter");
            return;
        }
        let frame = Frame::command(DeviceKind::Shutter.who(), state.wire_value(), id.value());
        tracing::info!(%id, %state, "dispatching shutter command");
        self.dispatch(vec![frame.encode()]);
    }

    /// Poll the controller for the current state of every catalogued
    /// light, as one ordered batch of status queries.
    pub fn refresh_lights_status(&self) {
        let batch: Vec<String> = self
            .registry
            .lights()
            .iter()
            .map(|light| Frame::status_query(DeviceKind::Light.who(), light.id.value()).encode())
            .collect();
        if batch.is_empty() {
            return;
        }
        tracing::info!(count = batch.len(), "refreshing light status");
        self.dispatch(batch);
    }

    /// Poll the controller for the current state of every catalogued
    /// shutter.
    pub fn refresh_shutters_status(&self) {
        let batch: Vec<String> = self
            .registry
            .shutters()
            .iter()
            .map(|shutter| {
                Frame::status_query(DeviceKind::Shutter.who(), shutter.id.value()).encode()
            })
            .collect();
        if batch.is_empty() {
            return;
        }
        tracing::info!(count = batch.len(), "refreshing shutter status");
        self.dispatch(batch);
    }

    /// Hand a batch to the transport on a spawned task and report the
    /// outcome on the event bus — intents never fail invisibly.
    fn dispatch(&self, batch: Vec<String>) {
        let total = batch.len();
        let transport = Arc::clone(&self.transport);
        let events = self.events.clone();

        tokio::spawn(async move {
            match transport.dispatch(batch).await {
                Ok(report) if report.all_confirmed() => {
                    tracing::debug!(total = report.total, "command batch confirmed");
                }
                Ok(report) => {
                    tracing::warn!(
                        total = report.total,
                        confirmed = report.confirmed,
                        unconfirmed = ?report.unconfirmed,
                        "command batch ended with unconfirmed commands"
                    );
                    events.publish(HomeEvent::CommandBatchFailed {
                        total: report.total,
                        confirmed: report.confirmed,
                    });
                }
                Err(err) => {
                    tracing::error!(%err, total, "command batch failed");
                    events.publish(HomeEvent::CommandBatchFailed {
                        total,
                        confirmed: 0,
                    });
                }
            }
        });
    }
}
