//! Default extension policy.

use crate::error::RejectReason;
use crate::ports::ExtensionPolicy;
use shared_types::{Block, Party, Transaction};

/// Plain value transfers only: no payloads, no escrow.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTransfers;

impl ExtensionPolicy for PlainTransfers {
    fn validate_transaction(&self, tx: &Transaction, _chain: &[Block]) -> Result<(), RejectReason> {
        if !tx.payload.is_empty() {
            return Err(RejectReason::MalformedPayload(format!(
                "{} payload bytes on a plain transfer",
                tx.payload.len()
            )));
        }
        if tx.recipient == Party::Escrow {
            return Err(RejectReason::InvalidRecipient(
                "escrow requires an extension policy".into(),
            ));
        }
        Ok(())
    }
}
