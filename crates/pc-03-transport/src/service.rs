//! # Transport Worker
//!
//! Owns the UDP socket and the [`Router`]. Each wakeup handles exactly one of:
//! an outbound envelope, a received datagram, or a liveness tick. The worker
//! stops on `Message::Exit` from the outbound queue or when that queue closes.

use crate::domain::{TransportConfig, TransportError};
use crate::router::{Routed, Router};
use pc_01_peer_directory::BootstrapProvider;
use shared_types::{Envelope, Inbound, Message};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Largest datagram the socket will accept.
const RECV_BUFFER_BYTES: usize = 65_535;

/// Queues the transport worker is connected to.
pub struct TransportChannels {
    /// Envelopes produced by the ledger and the console.
    pub outbound: mpsc::Receiver<Envelope>,
    /// Consensus messages for the ledger.
    pub inbound: mpsc::Sender<Inbound>,
    /// Notices and replies for the UI sink.
    pub ui: mpsc::Sender<Message>,
}

enum Event {
    Outbound(Option<Envelope>),
    Datagram(std::io::Result<(usize, SocketAddr)>),
    Tick,
}

/// The transport/peer-directory worker.
pub struct TransportWorker {
    socket: UdpSocket,
    router: Router,
    config: TransportConfig,
    pending: Vec<Routed>,
}

impl TransportWorker {
    /// Bind the socket and register its address as our own.
    pub async fn bind(
        listen: SocketAddr,
        mut router: Router,
        config: TransportConfig,
    ) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(listen).await?;
        let local = socket.local_addr()?;
        router.add_own_address(local);
        router.add_own_address(SocketAddr::from((Ipv4Addr::LOCALHOST, local.port())));
        info!("[pc-03] Listening on {}", local);

        Ok(Self {
            socket,
            router,
            config,
            pending: Vec::new(),
        })
    }

    /// Address the socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }

    /// Seed the peer directory; the resulting pings go out when `run` starts.
    pub fn seed(&mut self, source: &dyn BootstrapProvider) {
        let routed = self.router.seed(source);
        self.pending.extend(routed);
    }

    /// Run until `Message::Exit` arrives or the outbound queue closes.
    pub async fn run(mut self, mut channels: TransportChannels) {
        let pending = std::mem::take(&mut self.pending);
        self.dispatch(pending, &channels).await;

        let mut buf = vec![0u8; RECV_BUFFER_BYTES];
        let mut liveness = tokio::time::interval(self.config.liveness_interval);
        liveness.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let event = tokio::select! {
                envelope = channels.outbound.recv() => Event::Outbound(envelope),
                received = self.socket.recv_from(&mut buf) => Event::Datagram(received),
                _ = liveness.tick() => Event::Tick,
            };

            let routed = match event {
                Event::Outbound(None) => {
                    info!("[pc-03] Outbound queue closed, stopping");
                    break;
                }
                Event::Outbound(Some(envelope)) if matches!(envelope.message, Message::Exit) => {
                    info!("[pc-03] Exit received, stopping");
                    break;
                }
                Event::Outbound(Some(envelope)) => self.router.outbound(envelope),
                Event::Datagram(Ok((len, from))) => self.router.inbound(from, &buf[..len]),
                Event::Datagram(Err(e)) => {
                    debug!("[pc-03] Receive failed: {}", e);
                    Vec::new()
                }
                Event::Tick => self.router.tick(),
            };

            self.dispatch(routed, &channels).await;
        }
    }

    async fn dispatch(&self, routed: Vec<Routed>, channels: &TransportChannels) {
        for item in routed {
            match item {
                Routed::Send { to, datagram } => {
                    if let Err(e) = self.socket.send_to(&datagram, to).await {
                        debug!("[pc-03] Send to {} failed: {}", to, e);
                    }
                }
                // Never wait on the ledger: it may itself be waiting on us.
                Routed::Deliver(inbound) => match channels.inbound.try_send(inbound) {
                    Ok(()) => {}
                    Err(TrySendError::Full(dropped)) => {
                        warn!(
                            "[pc-03] Ledger queue full, dropping {} from {:?}",
                            dropped.message.tag(),
                            dropped.origin
                        );
                    }
                    Err(TrySendError::Closed(_)) => {
                        warn!("[pc-03] Ledger queue closed, dropping message");
                    }
                },
                Routed::Notify(message) => {
                    let tag = message.tag();
                    if channels.ui.send(message).await.is_err() {
                        debug!("[pc-03] UI queue closed, dropping {}", tag);
                    }
                }
            }
        }
    }
}
