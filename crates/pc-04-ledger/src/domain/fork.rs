//! Provisional chain buffer for fork resolution.

use super::merkle::merkle_root;
use crate::error::RejectReason;
use shared_types::{Block, Hash, Header, Origin, Transaction};
use std::collections::HashSet;

/// One position of a candidate chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Header known, block not yet received.
    Pending(Header),
    /// Block received and matched against its header.
    Filled(Block),
}

/// A peer's candidate chain being assembled block by block.
#[derive(Debug, Clone)]
pub struct ForkBuffer {
    origin: Origin,
    slots: Vec<Slot>,
    in_flight: Vec<Transaction>,
}

impl ForkBuffer {
    /// Start assembling `headers`, reusing every leading block of `local`
    /// whose header matches.
    ///
    /// `headers` must start with `local`'s genesis and be linked end to end.
    /// `in_flight` holds the transactions that may need to return to the
    /// pool after a swap.
    pub fn new(
        headers: Vec<Header>,
        local: &[Block],
        in_flight: Vec<Transaction>,
        origin: Origin,
    ) -> Result<Self, RejectReason> {
        match (headers.first(), local.first()) {
            (Some(theirs), Some(ours)) if *theirs == ours.header => {}
            _ => return Err(RejectReason::ForeignGenesis),
        }
        for (i, pair) in headers.windows(2).enumerate() {
            let expected = i as u64 + 1;
            if pair[1].index != expected {
                return Err(RejectReason::BadIndex {
                    expected,
                    actual: pair[1].index,
                });
            }
            if pair[1].previous_root_hash != pair[0].root_hash {
                return Err(RejectReason::BrokenLink);
            }
        }

        let mut slots = Vec::with_capacity(headers.len());
        let mut shared = true;
        for (i, header) in headers.into_iter().enumerate() {
            match local.get(i) {
                Some(block) if shared && block.header == header => {
                    slots.push(Slot::Filled(block.clone()))
                }
                _ => {
                    shared = false;
                    slots.push(Slot::Pending(header));
                }
            }
        }

        Ok(Self {
            origin,
            slots,
            in_flight,
        })
    }

    /// Peer the candidate chain came from.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Headers still waiting for their block.
    pub fn pending_headers(&self) -> Vec<Header> {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Pending(header) => Some(header.clone()),
                Slot::Filled(_) => None,
            })
            .collect()
    }

    /// True once every slot is filled.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|slot| matches!(slot, Slot::Filled(_)))
    }

    /// Fill the pending slot matching `block`'s header. The block must match
    /// its own Merkle root. Returns true if a slot was filled.
    pub fn offer(&mut self, block: &Block) -> bool {
        let Some(slot) = usize::try_from(block.header.index)
            .ok()
            .and_then(|i| self.slots.get_mut(i))
        else {
            return false;
        };
        match slot {
            Slot::Pending(header) if *header == block.header => {}
            _ => return false,
        }
        if merkle_root(&block.transactions) != block.header.root_hash {
            return false;
        }

        let consumed: HashSet<Hash> = block.transactions.iter().map(Transaction::id).collect();
        self.in_flight.retain(|tx| !consumed.contains(&tx.id()));
        *slot = Slot::Filled(block.clone());
        true
    }

    /// Transactions not consumed by any filled block so far.
    pub fn in_flight(&self) -> &[Transaction] {
        &self.in_flight
    }

    /// Split a complete buffer into its blocks and leftover transactions.
    /// Returns `None` while any slot is pending.
    pub fn into_parts(self) -> Option<(Vec<Block>, Vec<Transaction>)> {
        let mut blocks = Vec::with_capacity(self.slots.len());
        for slot in self.slots {
            match slot {
                Slot::Filled(block) => blocks.push(block),
                Slot::Pending(_) => return None,
            }
        }
        Some((blocks, self.in_flight))
    }
}
