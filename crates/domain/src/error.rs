//! Common error types used across the workspace.
//!
//! Transport failures surface through [`BusError`] regardless of which
//! adapter produced them; each layer converts its own failures via the
//! typed variants rather than stringly-typed wrapping.

/// Errors raised on the path between an intent and the controller.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// Opening the TCP connection failed (refused, unreachable, or timed
    /// out).
    #[error("failed to connect to the controller")]
    Connect(#[source] std::io::Error),

    /// Writing to the socket failed on a closed or broken channel.
    #[error("failed to write to the bus")]
    Write(#[source] std::io::Error),

    /// Reading from the socket failed.
    #[error("failed to read from the bus")]
    Read(#[source] std::io::Error),

    /// The controller closed the connection.
    #[error("connection closed by the controller")]
    ConnectionClosed,

    /// The event pipeline consumer is gone; inbound frames have nowhere
    /// to go. Seen only during shutdown.
    #[error("event pipeline closed")]
    PipelineClosed,
}
