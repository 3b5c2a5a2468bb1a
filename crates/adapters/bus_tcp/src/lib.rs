//! # casabus-adapter-bus-tcp
//!
//! TCP adapter — speaks the bus wire protocol to the controller over
//! plain TCP.
//!
//! ## How it works
//!
//! The controller exposes one TCP endpoint; a fixed handshake string sent
//! right after connecting selects the channel mode. This adapter keeps
//! two kinds of sessions:
//!
//! - one **monitor** session, long-lived, that listens for unsolicited
//!   event frames and reconnects with exponential backoff when lost;
//! - a fresh **command** session per dispatched batch, closed as soon as
//!   the batch's responses have been drained.
//!
//! All inbound frames — monitor events and command responses alike — are
//! forwarded into the application's event pipeline; the adapter never
//! touches device state itself.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `casabus-app` and `casabus-domain`.

mod config;
mod dispatcher;
mod monitor;
mod session;

pub use config::BusConfig;
pub use dispatcher::TcpCommandTransport;
pub use monitor::{MonitorHandle, MonitorLoop};
pub use session::Session;
