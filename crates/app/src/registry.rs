//! Device registry — in-memory state for every catalogued device.
//!
//! The registry value is owned exclusively by the event pipeline's
//! consumer task; nothing else mutates it. Readers get cloned snapshots
//! through [`RegistryHandle`]'s watch channels, so no lock sits between
//! the presentation layer and device state.

use std::collections::HashMap;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use casabus_domain::catalog::{Catalog, CatalogError};
use casabus_domain::device::{DeviceKind, Light, LightState, Shutter, ShutterState};
use casabus_domain::frame::ParsedFrame;
use casabus_domain::id::DeviceId;

/// In-memory device state, keyed by kind and id.
///
/// Collections keep catalog order; the id→index maps are built once at
/// load and never re-sorted, so a device's position is stable for the
/// registry's lifetime.
#[derive(Debug)]
pub struct DeviceRegistry {
    lights: Vec<Light>,
    shutters: Vec<Shutter>,
    light_index: HashMap<DeviceId, usize>,
    shutter_index: HashMap<DeviceId, usize>,
}

/// What [`DeviceRegistry::apply`] did with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The frame addressed a known light; its state was set.
    LightChanged { id: DeviceId, state: LightState },
    /// The frame addressed a known shutter; its state was set.
    ShutterChanged { id: DeviceId, state: ShutterState },
    /// The frame was tolerated but had no effect.
    Ignored(IgnoreReason),
}

/// Why a frame was a no-op. Never an error — the bus carries traffic for
/// device kinds and ids this client does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The `who` value names no kind we speak.
    UnknownKind { who: u32 },
    /// No catalogued device of that kind has this id.
    UnknownId { kind: DeviceKind, id: DeviceId },
    /// The `what` value is outside the kind's state domain.
    UnknownState { kind: DeviceKind, what: u32 },
}

impl DeviceRegistry {
    /// Build a registry from the catalog, all devices in their default
    /// state.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the catalog fails validation
    /// (duplicate ids within a kind).
    pub fn from_catalog(catalog: &Catalog) -> Result<Self, CatalogError> {
        catalog.validate()?;

        let lights: Vec<Light> = catalog
            .lights
            .iter()
            .map(|entry| Light {
                id: entry.id,
                name: entry.name.clone(),
                dimmable: entry.dimmable,
                state: LightState::default(),
            })
            .collect();
        let shutters: Vec<Shutter> = catalog
            .shutters
            .iter()
            .map(|entry| Shutter {
                id: entry.id,
                name: entry.name.clone(),
                dimmable: entry.dimmable,
                state: ShutterState::default(),
            })
            .collect();

        let light_index = lights
            .iter()
            .enumerate()
            .map(|(index, light)| (light.id, index))
            .collect();
        let shutter_index = shutters
            .iter()
            .enumerate()
            .map(|(index, shutter)| (shutter.id, index))
            .collect();

        Ok(Self {
            lights,
            shutters,
            light_index,
            shutter_index,
        })
    }

    /// Position of a device in its kind's collection.
    #[must_use]
    pub fn lookup(&self, kind: DeviceKind, id: DeviceId) -> Option<usize> {
        match kind {
            DeviceKind::Light => self.light_index.get(&id).copied(),
            DeviceKind::Shutter => self.shutter_index.get(&id).copied(),
        }
    }

    /// Current light states, in catalog order.
    #[must_use]
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Current shutter states, in catalog order.
    #[must_use]
    pub fn shutters(&self) -> &[Shutter] {
        &self.shutters
    }

    /// Apply an inbound frame to device state.
    ///
    /// Unknown kinds, ids, and out-of-domain state values are no-ops, not
    /// errors; the returned [`ApplyOutcome`] says which. A frame carrying
    /// the state a device already has still counts as a change (the
    /// controller is authoritative).
    pub fn apply(&mut self, frame: &ParsedFrame) -> ApplyOutcome {
        let Some(kind) = DeviceKind::from_who(frame.who) else {
            return ApplyOutcome::Ignored(IgnoreReason::UnknownKind { who: frame.who });
        };
        let id = DeviceId::new(frame.where_);

        match kind {
            DeviceKind::Light => {
                let Some(index) = self.light_index.get(&id).copied() else {
                    return ApplyOutcome::Ignored(IgnoreReason::UnknownId { kind, id });
                };
                let Some(state) = LightState::from_wire(frame.what) else {
                    return ApplyOutcome::Ignored(IgnoreReason::UnknownState {
                        kind,
                        what: frame.what,
                    });
                };
                self.lights[index].state = state;
                ApplyOutcome::LightChanged { id, state }
            }
            DeviceKind::Shutter => {
                let Some(index) = self.shutter_index.get(&id).copied() else {
                    return ApplyOutcome::Ignored(IgnoreReason::UnknownId { kind, id });
                };
                let Some(state) = ShutterState::from_wire(frame.what) else {
                    return ApplyOutcome::Ignored(IgnoreReason::UnknownState {
                        kind,
                        what: frame.what,
                    });
                };
                self.shutters[index].state = state;
                ApplyOutcome::ShutterChanged { id, state }
            }
        }
    }
}

/// Read-only view of the registry for the presentation layer.
///
/// Snapshots are re-published by the pipeline's consumer after every
/// applied frame; `borrow`ing a watch receiver never blocks the writer.
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    lights: watch::Receiver<Vec<Light>>,
    shutters: watch::Receiver<Vec<Shutter>>,
}

impl RegistryHandle {
    pub(crate) fn new(
        lights: watch::Receiver<Vec<Light>>,
        shutters: watch::Receiver<Vec<Shutter>>,
    ) -> Self {
        Self { lights, shutters }
    }

    /// Snapshot of all lights, in catalog order.
    #[must_use]
    pub fn lights(&self) -> Vec<Light> {
        self.lights.borrow().clone()
    }

    /// Snapshot of all shutters, in catalog order.
    #[must_use]
    pub fn shutters(&self) -> Vec<Shutter> {
        self.shutters.borrow().clone()
    }

    /// Snapshot of one light by id.
    #[must_use]
    pub fn light(&self, id: DeviceId) -> Option<Light> {
        self.lights.borrow().iter().find(|l| l.id == id).cloned()
    }

    /// Snapshot of one shutter by id.
    #[must_use]
    pub fn shutter(&self, id: DeviceId) -> Option<Shutter> {
        self.shutters.borrow().iter().find(|s| s.id == id).cloned()
    }

    /// Watch receiver over light snapshots, for await-style observers.
    #[must_use]
    pub fn lights_watch(&self) -> watch::Receiver<Vec<Light>> {
        self.lights.clone()
    }

    /// Watch receiver over shutter snapshots, for await-style observers.
    #[must_use]
    pub fn shutters_watch(&self) -> watch::Receiver<Vec<Shutter>> {
        self.shutters.clone()
    }

    /// Stream of light snapshots (current snapshot first).
    #[must_use]
    pub fn lights_stream(&self) -> WatchStream<Vec<Light>> {
        WatchStream::new(self.lights.clone())
    }

    /// Stream of shutter snapshots (current snapshot first).
    #[must_use]
    pub fn shutters_stream(&self) -> WatchStream<Vec<Shutter>> {
        WatchStream::new(self.shutters.clone())
    }
}
