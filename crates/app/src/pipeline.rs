//! Event pipeline — the single serialization point for device-state
//! mutation.
//!
//! Both frame producers (the monitor loop and the command dispatcher)
//! enqueue raw frame texts here. Exactly one consumer task dequeues in
//! FIFO order, decodes, applies to the registry, and re-publishes
//! snapshots — so concurrent producers can never interleave mutations.
//! The queue is bounded; a full queue suspends the producer rather than
//! dropping frames.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use casabus_domain::codec;
use casabus_domain::error::BusError;
use casabus_domain::event::HomeEvent;

use crate::event_bus::EventBus;
use crate::registry::{ApplyOutcome, DeviceRegistry, RegistryHandle};

/// Producer handle into the pipeline. Cheap to clone; the consumer task
/// stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct PipelineHandle {
    tx: mpsc::Sender<String>,
}

impl PipelineHandle {
    /// Enqueue a raw inbound text chunk, waiting if the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::PipelineClosed`] when the consumer task has
    /// stopped (shutdown).
    pub async fn publish(&self, text: String) -> Result<(), BusError> {
        self.tx
            .send(text)
            .await
            .map_err(|_| BusError::PipelineClosed)
    }
}

/// Spawn the pipeline consumer, taking ownership of the registry.
///
/// Returns the producer handle, the read-only registry view, and the
/// consumer's join handle (resolves after the last producer handle is
/// dropped and the queue drains).
#[must_use]
pub fn spawn(
    capacity: usize,
    registry: DeviceRegistry,
    events: EventBus,
) -> (PipelineHandle, RegistryHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity);
    let (lights_tx, lights_rx) = watch::channel(registry.lights().to_vec());
    let (shutters_tx, shutters_rx) = watch::channel(registry.shutters().to_vec());

    let consumer = Consumer {
        registry,
        lights_tx,
        shutters_tx,
        events,
        dropped_segments: 0,
        ignored_frames: 0,
    };
    let join = tokio::spawn(consumer.run(rx));

    (
        PipelineHandle { tx },
        RegistryHandle::new(lights_rx, shutters_rx),
        join,
    )
}

struct Consumer {
    registry: DeviceRegistry,
    lights_tx: watch::Sender<Vec<casabus_domain::device::Light>>,
    shutters_tx: watch::Sender<Vec<casabus_domain::device::Shutter>>,
    events: EventBus,
    dropped_segments: u64,
    ignored_frames: u64,
}

impl Consumer {
    async fn run(mut self, mut rx: mpsc::Receiver<String>) {
        while let Some(text) = rx.recv().await {
            self.consume(&text);
        }
        tracing::debug!(
            dropped_segments = self.dropped_segments,
            ignored_frames = self.ignored_frames,
            "event pipeline consumer stopped"
        );
    }

    fn consume(&mut self, text: &str) {
        for segment in codec::segments(text) {
            match codec::parse_segment(segment) {
                Ok(frame) => self.apply(&frame),
                Err(err) => {
                    self.dropped_segments += 1;
                    tracing::trace!(
                        %err,
                        segment,
                        total_dropped = self.dropped_segments,
                        "inbound segment dropped"
                    );
                }
            }
        }
    }

    fn apply(&mut self, frame: &casabus_domain::frame::ParsedFrame) {
        match self.registry.apply(frame) {
            ApplyOutcome::LightChanged { id, state } => {
                tracing::debug!(%id, %state, "light state applied");
                self.lights_tx.send_replace(self.registry.lights().to_vec());
                self.events.publish(HomeEvent::LightChanged { id, state });
            }
            ApplyOutcome::ShutterChanged { id, state } => {
                tracing::debug!(%id, %state, "shutter state applied");
                self.shutters_tx
                    .send_replace(self.registry.shutters().to_vec());
                self.events.publish(HomeEvent::ShutterChanged { id, state });
            }
            ApplyOutcome::Ignored(reason) => {
                self.ignored_frames += 1;
                tracing::debug!(
                    ?reason,
                    total_ignored = self.ignored_frames,
                    "inbound frame ignored"
                );
            }
        }
    }
}
