//! # casabus-domain
//!
//! Pure domain model for the casabus home-automation bus client.
//!
//! ## Responsibilities
//! - Foundational types: typed device identifiers, error conventions
//! - Define **Devices** (lights and roller shutters with typed states)
//! - Define the **Catalog** (the static device configuration per kind)
//! - Define **Frames** (the `*who*what*where##` wire messages) and the
//!   **Codec** that encodes, decodes, and reassembles them
//! - Define **Events** (state-change records consumed by the event bus)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! It must never import anything from `app`, adapters, or async crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod catalog;
pub mod codec;
pub mod device;
pub mod error;
pub mod event;
pub mod frame;
pub mod id;
