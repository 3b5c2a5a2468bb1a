//! Bus adapter configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the TCP bus adapter.
///
/// The timing fields externalise what used to be magic constants in this
/// client's ancestry: ten drain attempts, 50 ms between them, and a
/// fixed-size read buffer. Their defaults keep those values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Controller hostname or address.
    pub host: String,
    /// Controller TCP port.
    pub port: u16,
    /// How long to wait for a TCP connect before giving up, in
    /// milliseconds.
    pub connect_timeout_ms: u64,
    /// How long the dispatcher waits for a response after each command,
    /// in milliseconds.
    pub reply_timeout_ms: u64,
    /// Maximum receive attempts when draining trailing responses after a
    /// batch. The drain stops early on the first empty attempt.
    pub drain_attempts: u32,
    /// Pause between drain attempts, in milliseconds.
    pub drain_delay_ms: u64,
    /// Size of the socket read buffer, in bytes. Frames longer than one
    /// read are reassembled, so this only bounds a single read.
    pub read_buffer_bytes: usize,
    /// First reconnect delay for the monitor loop, in milliseconds.
    /// Doubles on every failed attempt.
    pub reconnect_initial_ms: u64,
    /// Upper bound for the monitor reconnect delay, in milliseconds.
    pub reconnect_max_ms: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            host: "192.168.0.103".to_owned(),
            port: 20_000,
            connect_timeout_ms: 5_000,
            reply_timeout_ms: 200,
            drain_attempts: 10,
            drain_delay_ms: 50,
            read_buffer_bytes: 256,
            reconnect_initial_ms: 500,
            reconnect_max_ms: 30_000,
        }
    }
}

impl BusConfig {
    /// Connect timeout as a [`Duration`].
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Per-command reply window as a [`Duration`].
    #[must_use]
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    /// Pause between drain attempts as a [`Duration`].
    #[must_use]
    pub fn drain_delay(&self) -> Duration {
        Duration::from_millis(self.drain_delay_ms)
    }

    /// Initial reconnect backoff as a [`Duration`].
    #[must_use]
    pub fn reconnect_initial(&self) -> Duration {
        Duration::from_millis(self.reconnect_initial_ms)
    }

    /// Reconnect backoff ceiling as a [`Duration`].
    #[must_use]
    pub fn reconnect_max(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_ms)
    }
}
