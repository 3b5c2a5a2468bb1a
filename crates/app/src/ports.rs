//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside
//! world. They are defined here (in `app`) so that both the use-case layer
//! and the adapter layer can depend on them without creating circular
//! dependencies.

use std::future::Future;

use casabus_domain::error::BusError;

/// Outcome of one dispatched command batch.
///
/// Responses on this bus are only loosely correlated with commands by
/// temporal proximity; "confirmed" means a response arrived within the
/// command's reply window, not that the response matched the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Commands in the batch.
    pub total: usize,
    /// Commands whose reply window saw data.
    pub confirmed: usize,
    /// Wire texts of the commands whose reply window stayed empty.
    pub unconfirmed: Vec<String>,
}

impl BatchReport {
    /// Whether every command saw a temporally-adjacent response.
    #[must_use]
    pub fn all_confirmed(&self) -> bool {
        self.unconfirmed.is_empty()
    }
}

/// Driven port for sending command batches to the controller.
///
/// The TCP adapter implements this with a short-lived session per batch
/// (fresh connection, command handshake, ordered sends, bounded response
/// drain). A transport failure mid-batch fails the whole batch.
pub trait CommandTransport: Send + Sync {
    /// Send the pre-encoded wire texts strictly in order, forwarding any
    /// responses into the event pipeline.
    fn dispatch(
        &self,
        batch: Vec<String>,
    ) -> impl Future<Output = Result<BatchReport, BusError>> + Send;
}
