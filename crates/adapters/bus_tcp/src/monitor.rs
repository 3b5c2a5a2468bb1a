//! Monitor loop — the long-lived listener for unsolicited event frames.
//!
//! Connecting → Handshaking → Listening, with exponential-backoff
//! reconnection on any failure. Every complete inbound frame goes into
//! the event pipeline; the bounded queue's backpressure suspends the
//! loop when the consumer falls behind.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use casabus_app::pipeline::PipelineHandle;
use casabus_domain::codec::FrameAssembler;
use casabus_domain::error::BusError;
use casabus_domain::event::LinkState;
use casabus_domain::frame::ChannelMode;

use crate::config::BusConfig;
use crate::session::Session;

/// The monitor channel's background loop.
pub struct MonitorLoop {
    config: BusConfig,
    pipeline: PipelineHandle,
    link: watch::Sender<LinkState>,
}

/// Owner handle for a started monitor loop.
///
/// Dropping the handle leaves the loop running; call
/// [`stop`](Self::stop) (or let the process exit) to end it.
#[derive(Debug)]
pub struct MonitorHandle {
    join: JoinHandle<()>,
    link: watch::Receiver<LinkState>,
}

impl MonitorHandle {
    /// Connectivity signal: `Connecting` → `Connected` → `Disconnected`
    /// transitions as the loop runs.
    #[must_use]
    pub fn link(&self) -> watch::Receiver<LinkState> {
        self.link.clone()
    }

    /// Abort the loop and release its socket.
    pub fn stop(self) {
        self.join.abort();
    }
}

impl MonitorLoop {
    /// Spawn the monitor loop.
    #[must_use]
    pub fn start(config: BusConfig, pipeline: PipelineHandle) -> MonitorHandle {
        let (link_tx, link_rx) = watch::channel(LinkState::Connecting);
        let task = Self {
            config,
            pipeline,
            link: link_tx,
        };
        MonitorHandle {
            join: tokio::spawn(task.run()),
            link: link_rx,
        }
    }

    /// Reconnect loop. Returns only when the event pipeline has closed
    /// (process shutdown).
    async fn run(self) {
        let mut backoff = self.config.reconnect_initial();

        loop {
            self.link.send_replace(LinkState::Connecting);

            match self.connect_and_listen(&mut backoff).await {
                ControlFlow::Shutdown => {
                    tracing::debug!("event pipeline closed, monitor loop stopping");
                    return;
                }
                ControlFlow::Retry => {}
            }

            self.link.send_replace(LinkState::Disconnected);
            tracing::info!(delay_ms = backoff.as_millis() as u64, "monitor reconnect scheduled");
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(self.config.reconnect_max());
        }
    }

    async fn connect_and_listen(&self, backoff: &mut std::time::Duration) -> ControlFlow {
        let mut session = match Session::open(
            &self.config.host,
            self.config.port,
            self.config.connect_timeout(),
            self.config.read_buffer_bytes,
        )
        .await
        {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(%err, host = %self.config.host, port = self.config.port, "monitor connect failed");
                return ControlFlow::Retry;
            }
        };

        if let Err(err) = session.handshake(ChannelMode::Monitor).await {
            tracing::warn!(%err, "monitor handshake failed");
            session.close().await;
            return ControlFlow::Retry;
        }

        tracing::info!(host = %self.config.host, port = self.config.port, "monitor channel listening");
        self.link.send_replace(LinkState::Connected);
        *backoff = self.config.reconnect_initial();

        let outcome = self.listen(&mut session).await;
        session.close().await;

        match outcome {
            BusError::PipelineClosed => ControlFlow::Shutdown,
            err => {
                tracing::warn!(%err, "monitor channel lost");
                ControlFlow::Retry
            }
        }
    }

    /// Listening state: read chunks forever, forwarding every complete
    /// frame. Returns the error that ended the session.
    async fn listen(&self, session: &mut Session) -> BusError {
        let mut assembler = FrameAssembler::new();

        loop {
            let chunk = match session.receive(None).await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => continue,
                Err(err) => return err,
            };

            let discarded_before = assembler.discarded();
            for frame_text in assembler.push(&chunk) {
                if let Err(err) = self.pipeline.publish(frame_text).await {
                    return err;
                }
            }
            if assembler.discarded() > discarded_before {
                tracing::warn!(
                    discarded = assembler.discarded(),
                    "terminator-free noise discarded from monitor stream"
                );
            }
        }
    }
}

enum ControlFlow {
    Retry,
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use casabus_app::event_bus::EventBus;
    use casabus_app::pipeline;
    use casabus_app::registry::DeviceRegistry;
    use casabus_domain::catalog::{Catalog, CatalogEntry};
    use casabus_domain::device::LightState;
    use casabus_domain::id::DeviceId;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::{TcpListener, TcpStream};

    fn test_config(port: u16) -> BusConfig {
        BusConfig {
            host: "127.0.0.1".to_owned(),
            port,
            connect_timeout_ms: 1_000,
            reconnect_initial_ms: 10,
            reconnect_max_ms: 50,
            ..BusConfig::default()
        }
    }

    fn one_light_catalog() -> Catalog {
        Catalog {
            lights: vec![CatalogEntry {
                id: DeviceId::new(31),
                name: "Bureau Centraal".to_owned(),
                dimmable: false,
            }],
            shutters: Vec::new(),
        }
    }

    async fn read_handshake(peer: &mut TcpStream) {
        let mut buf = [0u8; 16];
        let n = peer.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"*99*1##");
    }

    async fn wait_for_state(
        handle: &casabus_app::registry::RegistryHandle,
        state: LightState,
    ) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while handle.lights()[0].state != state {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("registry never reached the expected state");
    }

    async fn wait_for_link(rx: &mut watch::Receiver<LinkState>, state: LinkState) {
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| *s == state))
            .await
            .expect("link never reached the expected state")
            .expect("monitor loop gone");
    }

    #[tokio::test]
    async fn should_handshake_then_forward_event_frames_to_registry() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let registry = DeviceRegistry::from_catalog(&one_light_catalog()).unwrap();
        let (pipeline, registry_handle, _join) = pipeline::spawn(10, registry, EventBus::new(16));

        let monitor = MonitorLoop::start(test_config(port), pipeline);

        let (mut peer, _) = listener.accept().await.unwrap();
        read_handshake(&mut peer).await;
        peer.write_all(b"*1*1*31##").await.unwrap();

        wait_for_state(&registry_handle, LightState::On).await;

        monitor.stop();
    }

    #[tokio::test]
    async fn should_reassemble_frame_split_across_reads() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let registry = DeviceRegistry::from_catalog(&one_light_catalog()).unwrap();
        let (pipeline, registry_handle, _join) = pipeline::spawn(10, registry, EventBus::new(16));

        let monitor = MonitorLoop::start(test_config(port), pipeline);

        let (mut peer, _) = listener.accept().await.unwrap();
        read_handshake(&mut peer).await;
        peer.write_all(b"*1*1*3").await.unwrap();
        peer.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        peer.write_all(b"1##").await.unwrap();

        wait_for_state(&registry_handle, LightState::On).await;

        monitor.stop();
    }

    #[tokio::test]
    async fn should_reconnect_with_fresh_handshake_after_connection_loss() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let registry = DeviceRegistry::from_catalog(&one_light_catalog()).unwrap();
        let (pipeline, registry_handle, _join) = pipeline::spawn(10, registry, EventBus::new(16));

        let monitor = MonitorLoop::start(test_config(port), pipeline);
        let mut link = monitor.link();

        let (mut peer, _) = listener.accept().await.unwrap();
        read_handshake(&mut peer).await;
        wait_for_link(&mut link, LinkState::Connected).await;

        // Drop the connection; the loop must notice and retry. The second
        // accept below only completes if the loop reconnects.
        drop(peer);

        let (mut peer, _) = listener.accept().await.unwrap();
        read_handshake(&mut peer).await;
        wait_for_link(&mut link, LinkState::Connected).await;

        // The fresh session still delivers events.
        peer.write_all(b"*1*1*31##").await.unwrap();
        wait_for_state(&registry_handle, LightState::On).await;

        monitor.stop();
    }

    #[tokio::test]
    async fn should_report_disconnected_when_controller_is_down() {
        // Bind then drop to get a dead port.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let registry = DeviceRegistry::from_catalog(&one_light_catalog()).unwrap();
        let (pipeline, _registry_handle, _join) = pipeline::spawn(10, registry, EventBus::new(16));

        let monitor = MonitorLoop::start(test_config(port), pipeline);
        let mut link = monitor.link();

        wait_for_link(&mut link, LinkState::Disconnected).await;
        monitor.stop();
    }
}
