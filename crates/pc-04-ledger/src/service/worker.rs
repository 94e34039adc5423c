//! Ledger worker.
//!
//! One task owns the [`Ledger`] and processes its inbound queue one message
//! at a time. Mining runs on the blocking pool; the sealed block comes back
//! through the same inbound queue as `Message::Mined`.

use super::core::Ledger;
use shared_types::{Destination, Envelope, Inbound, Message, Notice, Origin};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Queues owned by the ledger worker.
pub struct LedgerChannels {
    /// Consensus traffic from the transport and local intents.
    pub inbound: mpsc::Receiver<Inbound>,
    /// Sender side of `inbound`, used to feed mined blocks back.
    pub inbound_tx: mpsc::Sender<Inbound>,
    /// Envelopes for the transport worker.
    pub outbound: mpsc::Sender<Envelope>,
}

pub struct LedgerWorker {
    ledger: Ledger,
}

impl LedgerWorker {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Run until a local `Exit` arrives or the inbound queue closes.
    ///
    /// `Exit` is forwarded to the outbound queue so the transport worker
    /// stops too. Returns the ledger for inspection.
    pub async fn run(mut self, mut channels: LedgerChannels) -> Ledger {
        let startup = self.ledger.startup();
        if !emit(&channels.outbound, startup).await {
            return self.ledger;
        }

        while let Some(inbound) = channels.inbound.recv().await {
            let local = inbound.origin == Origin::Local;
            match inbound.message {
                Message::Exit if local => {
                    info!("[pc-04] Exit received, stopping");
                    self.ledger.cancel_mining();
                    let exit = Envelope::new(Message::Exit, Destination::Local);
                    if channels.outbound.send(exit).await.is_err() {
                        debug!("[pc-04] Outbound queue already closed");
                    }
                    break;
                }
                Message::Mine if local => {
                    let out = self.start_mining(&channels);
                    if !emit(&channels.outbound, out).await {
                        break;
                    }
                }
                _ => {
                    let out = self.ledger.handle(inbound);
                    if !emit(&channels.outbound, out).await {
                        break;
                    }
                }
            }
        }
        self.ledger
    }

    /// Prepare a job and hand its search to the blocking pool.
    fn start_mining(&mut self, channels: &LedgerChannels) -> Vec<Envelope> {
        let job = match self.ledger.prepare_mining() {
            Ok(job) => job,
            Err(e) => {
                debug!("[pc-04] {}", e);
                return vec![Envelope::notice(Notice::Failure(e.to_string()))];
            }
        };

        let index = job.index();
        let feedback = channels.inbound_tx.clone();
        tokio::task::spawn_blocking(move || match job.run() {
            Some(block) => {
                if feedback.blocking_send(Inbound::local(Message::Mined(block))).is_err() {
                    debug!("[pc-04] Ledger stopped before block {} was delivered", index);
                }
            }
            None => debug!("[pc-04] Mining of block {} cancelled", index),
        });
        Vec::new()
    }
}

/// Send every envelope. Returns false once the outbound queue is closed.
async fn emit(outbound: &mpsc::Sender<Envelope>, envelopes: Vec<Envelope>) -> bool {
    for envelope in envelopes {
        if outbound.send(envelope).await.is_err() {
            warn!("[pc-04] Outbound queue closed, stopping");
            return false;
        }
    }
    true
}
