//! Command dispatcher — a short-lived session per batch of outgoing
//! commands.
//!
//! Each batch gets a fresh connection and command handshake. Commands go
//! out strictly in caller order; after each send one bounded reply window
//! is observed, and after the batch a drain loop picks up the trailing
//! burst of event frames the controller emits alongside confirmations.
//! Responses are only loosely correlated with commands by temporal
//! proximity.

use std::sync::Arc;

use casabus_app::pipeline::PipelineHandle;
use casabus_app::ports::{BatchReport, CommandTransport};
use casabus_domain::codec::FrameAssembler;
use casabus_domain::error::BusError;
use casabus_domain::frame::ChannelMode;

use crate::config::BusConfig;
use crate::session::Session;

/// [`CommandTransport`] implementation over TCP command sessions.
#[derive(Debug, Clone)]
pub struct TcpCommandTransport {
    config: Arc<BusConfig>,
    pipeline: PipelineHandle,
}

impl TcpCommandTransport {
    /// Create a transport that forwards responses into `pipeline`.
    #[must_use]
    pub fn new(config: BusConfig, pipeline: PipelineHandle) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
        }
    }

    async fn run_batch(&self, batch: Vec<String>) -> Result<BatchReport, BusError> {
        let mut session = Session::open(
            &self.config.host,
            self.config.port,
            self.config.connect_timeout(),
            self.config.read_buffer_bytes,
        )
        .await?;

        let result = self.exchange(&mut session, &batch).await;
        session.close().await;
        result
    }

    async fn exchange(
        &self,
        session: &mut Session,
        batch: &[String],
    ) -> Result<BatchReport, BusError> {
        session.handshake(ChannelMode::Command).await?;

        let mut assembler = FrameAssembler::new();
        let mut confirmed = 0usize;
        let mut unconfirmed = Vec::new();

        for command in batch {
            session.send(command).await?;

            match session.receive(Some(self.config.reply_timeout())).await? {
                Some(chunk) => {
                    confirmed += 1;
                    self.forward(&mut assembler, &chunk).await?;
                }
                None => {
                    tracing::debug!(command, "no response within reply window");
                    unconfirmed.push(command.clone());
                }
            }
        }

        self.drain(session, &mut assembler).await?;

        Ok(BatchReport {
            total: batch.len(),
            confirmed,
            unconfirmed,
        })
    }

    /// Pick up trailing responses: bounded attempts, stop on the first
    /// empty one. The controller closing the session here is the normal
    /// end of a batch, not a failure.
    async fn drain(
        &self,
        session: &mut Session,
        assembler: &mut FrameAssembler,
    ) -> Result<(), BusError> {
        for attempt in 1..=self.config.drain_attempts {
            match session.receive(Some(self.config.reply_timeout())).await {
                Ok(Some(chunk)) => {
                    tracing::trace!(attempt, "trailing response received");
                    self.forward(assembler, &chunk).await?;
                }
                Ok(None) => break,
                Err(BusError::ConnectionClosed) => {
                    tracing::debug!(attempt, "controller closed the session during drain");
                    break;
                }
                Err(err) => return Err(err),
            }
            tokio::time::sleep(self.config.drain_delay()).await;
        }
        Ok(())
    }

    async fn forward(
        &self,
        assembler: &mut FrameAssembler,
        chunk: &str,
    ) -> Result<(), BusError> {
        for frame_text in assembler.push(chunk) {
            self.pipeline.publish(frame_text).await?;
        }
        Ok(())
    }
}

impl CommandTransport for TcpCommandTransport {
    fn dispatch(
        &self,
        batch: Vec<String>,
    ) -> impl std::future::Future<Output = Result<BatchReport, BusError>> + Send {
        self.run_batch(batch)
    }
}
