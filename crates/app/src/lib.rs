//! # casabus-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Own the **Device Registry** and enforce its single-writer discipline:
//!   only the event pipeline's consumer task ever mutates device state
//! - Run the **Event Pipeline** — the bounded queue serializing every
//!   inbound frame from both producers (monitor loop, command dispatcher)
//! - Provide the **in-process event bus** (state changes, dispatch
//!   failures) that doesn't need IO
//! - Define the **`CommandTransport` port** that the TCP adapter implements
//! - Expose the **intent service** the presentation layer calls
//!   (`change_light_state`, `refresh_lights_status`, …)
//!
//! ## Dependency rule
//! Depends on `casabus-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod event_bus;
pub mod pipeline;
pub mod ports;
pub mod registry;
pub mod service;
