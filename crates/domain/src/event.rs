//! Events — records of state changes and dispatch outcomes, published on
//! the in-process event bus for any interested observer (logging, UI
//! bindings, tests).

use crate::device::{DeviceKind, LightState, ShutterState};
use crate::id::DeviceId;

/// Something observable happened in the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeEvent {
    /// A light's registry state changed after an inbound frame.
    LightChanged { id: DeviceId, state: LightState },
    /// A shutter's registry state changed after an inbound frame.
    ShutterChanged { id: DeviceId, state: ShutterState },
    /// A command batch failed outright or ended with unconfirmed commands.
    CommandBatchFailed {
        /// Commands in the batch.
        total: usize,
        /// Commands that saw a temporally-adjacent response.
        confirmed: usize,
    },
}

impl HomeEvent {
    /// The device kind this event concerns, when it concerns one.
    #[must_use]
    pub fn kind(&self) -> Option<DeviceKind> {
        match self {
            Self::LightChanged { .. } => Some(DeviceKind::Light),
            Self::ShutterChanged { .. } => Some(DeviceKind::Shutter),
            Self::CommandBatchFailed { .. } => None,
        }
    }
}

/// Connectivity of the monitor channel, published through a watch channel
/// so the presentation layer can reflect bus reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// Attempting to connect (initial state, and between retries).
    #[default]
    Connecting,
    /// Handshake sent; listening for events.
    Connected,
    /// Connection lost; a reconnect attempt is pending.
    Disconnected,
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
            Self::Disconnected => f.write_str("disconnected"),
        }
    }
}
