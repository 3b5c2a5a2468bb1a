//! Session channel — one logical connection to the controller.
//!
//! A session is ephemeral: open, handshake, zero or more send/receive
//! calls, close. The monitor loop and each command batch own their own
//! session; sessions are never shared between tasks.

use std::time::Duration;

use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use casabus_domain::error::BusError;
use casabus_domain::frame::ChannelMode;

/// An open connection to the controller.
#[derive(Debug)]
pub struct Session {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    read_buffer: usize,
}

impl Session {
    /// Connect to the controller.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Connect`] when the connection is refused,
    /// unreachable, or does not complete within `connect_timeout`.
    pub async fn open(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        read_buffer: usize,
    ) -> Result<Self, BusError> {
        let address = format!("{host}:{port}");
        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(&address))
            .await
            .map_err(|_| {
                BusError::Connect(std::io::Error::from(std::io::ErrorKind::TimedOut))
            })?
            .map_err(BusError::Connect)?;

        tracing::debug!(%address, "session opened");
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader,
            writer,
            read_buffer,
        })
    }

    /// Send the fixed handshake selecting this session's channel mode.
    ///
    /// No acknowledgement is awaited; whatever the controller replies is
    /// handled as ordinary inbound data by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Write`] when the channel is closed or broken.
    pub async fn handshake(&mut self, mode: ChannelMode) -> Result<(), BusError> {
        self.send(mode.handshake()).await
    }

    /// Write ASCII wire text and flush.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Write`] when the channel is closed or broken.
    pub async fn send(&mut self, text: &str) -> Result<(), BusError> {
        self.writer
            .write_all(text.as_bytes())
            .await
            .map_err(BusError::Write)?;
        self.writer.flush().await.map_err(BusError::Write)?;
        tracing::trace!(text, "sent");
        Ok(())
    }

    /// One read attempt.
    ///
    /// With a timeout, returns `Ok(None)` when no data arrived inside the
    /// window; with `None`, waits until data arrives or the connection
    /// fails. A read may return any slice of the inbound stream — frame
    /// reassembly is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ConnectionClosed`] on peer EOF and
    /// [`BusError::Read`] on socket failure.
    pub async fn receive(&mut self, timeout: Option<Duration>) -> Result<Option<String>, BusError> {
        let mut buffer = vec![0u8; self.read_buffer];

        let read = match timeout {
            Some(window) => {
                match tokio::time::timeout(window, self.reader.read(&mut buffer)).await {
                    Err(_) => return Ok(None),
                    Ok(result) => result.map_err(BusError::Read)?,
                }
            }
            None => self.reader.read(&mut buffer).await.map_err(BusError::Read)?,
        };

        if read == 0 {
            return Err(BusError::ConnectionClosed);
        }

        let chunk = String::from_utf8_lossy(&buffer[..read]).into_owned();
        tracing::trace!(%chunk, "received");
        Ok(Some(chunk))
    }

    /// Release the connection. Consuming `self` makes double-close
    /// unrepresentable; shutdown failures on an already-dead socket are
    /// ignored.
    pub async fn close(mut self) {
        let _ = self.writer.shutdown().await;
        tracing::debug!("session closed");
    }
}
