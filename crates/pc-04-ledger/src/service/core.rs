//! Ledger core.
//!
//! Owns the chain, the pool and the fork buffer. Every mutation goes through
//! [`Ledger::handle`], which processes one inbound message and returns the
//! envelopes to emit. Nothing here blocks except [`Ledger::mine`].

use super::mining::MiningJob;
use crate::adapters::SystemClock;
use crate::config::LedgerConfig;
use crate::domain::{canonical_order, merkle_root, validate_header, BlockValidator, Chain, ForkBuffer, Pool};
use crate::error::{LedgerError, LedgerResult, RejectReason};
use crate::ports::{Clock, ExtensionPolicy, ProofOfWork};
use pc_02_chain_storage::ChainStore;
use shared_crypto::short_hex;
use shared_types::{
    Block, Destination, Envelope, Hash, Header, Inbound, Message, Notice, Origin, Party, PublicKey,
    Transaction,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dependencies for [`Ledger`].
pub struct LedgerDependencies {
    pub config: LedgerConfig,
    pub store: Box<dyn ChainStore>,
    pub pow: Arc<dyn ProofOfWork>,
    pub policy: Box<dyn ExtensionPolicy>,
}

struct ActiveMining {
    index: u64,
    cancel: Arc<AtomicBool>,
}

/// The consensus engine of one node.
pub struct Ledger {
    config: LedgerConfig,
    chain: Chain,
    pool: Pool,
    fork: Option<ForkBuffer>,
    mining: Option<ActiveMining>,
    /// Transactions that arrived while a reward was pooled, in arrival order.
    deferred: Vec<(Transaction, Origin)>,
    miner: PublicKey,
    pow: Arc<dyn ProofOfWork>,
    policy: Box<dyn ExtensionPolicy>,
    store: Box<dyn ChainStore>,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Load the persisted chain and revalidate it. An unreadable or invalid
    /// chain is reported and replaced by genesis.
    pub fn new(deps: LedgerDependencies, miner: PublicKey) -> Self {
        let LedgerDependencies {
            config,
            store,
            pow,
            policy,
        } = deps;

        let chain = match store.load() {
            Ok(blocks) => {
                let rules = BlockValidator {
                    pow: pow.as_ref(),
                    policy: policy.as_ref(),
                    local_version: config.local_version,
                };
                match rules.validate_chain(blocks) {
                    Ok(chain) => chain,
                    Err(e) => {
                        warn!("[pc-04] Stored chain is invalid, starting from genesis: {}", e);
                        Chain::genesis()
                    }
                }
            }
            Err(e) => {
                warn!("[pc-04] Could not load chain, starting from genesis: {}", e);
                Chain::genesis()
            }
        };
        info!(
            "[pc-04] Ledger ready at height {} ({} confirmed transactions)",
            chain.tip().header.index,
            chain.tx_ids().len()
        );

        Self {
            pool: Pool::new(config.max_pool_size),
            config,
            chain,
            fork: None,
            mining: None,
            deferred: Vec::new(),
            miner,
            pow,
            policy,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Set custom clock (for testing)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn miner(&self) -> &PublicKey {
        &self.miner
    }

    pub fn is_mining(&self) -> bool {
        self.mining.is_some()
    }

    /// Fork currently being assembled, if any.
    pub fn fork(&self) -> Option<&ForkBuffer> {
        self.fork.as_ref()
    }

    fn rules(&self) -> BlockValidator<'_> {
        BlockValidator {
            pow: self.pow.as_ref(),
            policy: self.policy.as_ref(),
            local_version: self.config.local_version,
        }
    }

    /// Messages to emit once at startup: ask every peer for its header list.
    pub fn startup(&self) -> Vec<Envelope> {
        vec![Envelope::broadcast(Message::GetChain)]
    }

    /// Process one inbound message.
    ///
    /// Local intents (mining, queries, persistence) are refused from peers.
    /// Rejections are logged and dropped; a local submitter also gets a
    /// `Failure` notice.
    pub fn handle(&mut self, inbound: Inbound) -> Vec<Envelope> {
        let Inbound { message, origin } = inbound;
        if matches!(origin, Origin::Peer(_)) && !message.is_peer_consensus() {
            debug!(
                "[pc-04] Dropping {} from {:?}: not accepted from peers",
                message.tag(),
                origin
            );
            return Vec::new();
        }
        debug!("[pc-04] Handling {} from {:?}", message.tag(), origin);

        let mut out = match message {
            Message::NewTransaction(tx) if self.mining.is_some() => {
                self.defer(tx, origin);
                Vec::new()
            }
            Message::NewTransaction(tx) => match self.submit_transaction(tx) {
                Ok(out) => out,
                Err(e) => failure(e, origin),
            },
            Message::NewBlock(block) => self.submit_block(block),
            Message::NewHeader(header) => self.new_header(header, origin),
            Message::GetBlock(header) => self.get_block(&header, origin),
            Message::GetChain => vec![Envelope::new(
                Message::ResolveConflict(self.chain.headers()),
                origin.reply_to(),
            )],
            Message::GetNewestBlock => vec![Envelope::new(
                Message::NewHeader(self.chain.tip().header.clone()),
                origin.reply_to(),
            )],
            Message::ResolveConflict(headers) => self.resolve_conflict(headers, origin),
            Message::Mine => match self.mine() {
                Ok(out) => out,
                Err(e) => failure(e, origin),
            },
            Message::Mined(block) => self.handle_mined(block),
            Message::PrintBalance(key) => {
                let party = Party::Key(key.unwrap_or(self.miner));
                vec![Envelope::notice(Notice::Balance {
                    party,
                    amount: self.balance(&party),
                })]
            }
            Message::SetMiner(key) => {
                self.miner = key;
                info!("[pc-04] Mining rewards now go to {}", Party::Key(key));
                vec![Envelope::notice(Notice::MinerChanged(key))]
            }
            Message::Save => vec![self.save()],
            Message::Dump => vec![self.dump()],
            Message::Exit => {
                self.cancel_mining();
                Vec::new()
            }
            Message::Network(_) | Message::Notice(_) => {
                debug!("[pc-04] Ignoring non-ledger message");
                Vec::new()
            }
        };
        out.extend(self.replay_deferred());
        out
    }

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    /// Validate and pool a transaction.
    ///
    /// Refused while a mining reward is pooled, when already in the tip
    /// block or chain, when invalid, and when already pooled.
    /// [`Ledger::handle`] defers transactions that arrive during mining
    /// instead of submitting them.
    pub fn submit_transaction(&mut self, tx: Transaction) -> LedgerResult<Vec<Envelope>> {
        let reject = LedgerError::TransactionRejected;
        if self.pool.has_reward() {
            return Err(reject(RejectReason::MiningInProgress));
        }
        if self.chain.tip().contains(&tx) {
            return Err(reject(RejectReason::AlreadyInTip));
        }
        let id = tx.id();
        if self.chain.contains_tx(&id) {
            return Err(reject(RejectReason::AlreadyInChain));
        }

        let available = self.available_before(&tx);
        self.rules()
            .validate_transaction(&tx, available, self.chain.blocks())
            .map_err(reject)?;
        self.pool.insert(tx.clone()).map_err(reject)?;

        info!(
            "[pc-04] Pooled transaction {} ({} -> {}, amount {}, fee {})",
            short_hex(&id),
            tx.sender,
            tx.recipient,
            tx.amount,
            tx.fee
        );
        let mut out = vec![
            Envelope::broadcast(Message::NewTransaction(tx.clone())),
            Envelope::notice(Notice::TransactionAccepted(tx.clone())),
        ];
        out.extend(self.policy.apply_transaction_effects(&tx));
        Ok(out)
    }

    /// Hold a transaction until the running mining job ends.
    fn defer(&mut self, tx: Transaction, origin: Origin) {
        if self.deferred.len() >= self.config.max_pool_size {
            debug!("[pc-04] Deferred queue full, dropping transaction {}", short_hex(&tx.id()));
            return;
        }
        debug!("[pc-04] Deferring transaction {} until mining ends", short_hex(&tx.id()));
        self.deferred.push((tx, origin));
    }

    /// Submit deferred transactions once no reward is pooled.
    fn replay_deferred(&mut self) -> Vec<Envelope> {
        if self.mining.is_some() || self.deferred.is_empty() {
            return Vec::new();
        }
        let deferred = std::mem::take(&mut self.deferred);
        debug!("[pc-04] Replaying {} deferred transactions", deferred.len());
        deferred
            .into_iter()
            .flat_map(|(tx, origin)| match self.submit_transaction(tx) {
                Ok(out) => out,
                Err(e) => failure(e, origin),
            })
            .collect()
    }

    /// Confirmed balance plus pooled transfers stamped before `tx`.
    fn available_before(&self, tx: &Transaction) -> i128 {
        self.chain.balances().get(&tx.sender)
            + self.pool.pending_effect_before(&tx.sender, tx.timestamp)
    }

    /// Confirmed plus pending balance of `party`.
    pub fn balance(&self, party: &Party) -> i128 {
        self.chain.balances().get(party) + self.pool.pending_effect(party)
    }

    /// Re-admit `candidates` to the pool in canonical order, dropping any
    /// that are confirmed, rewards, or no longer valid.
    fn readmit(&mut self, mut candidates: Vec<Transaction>) {
        candidates.sort_by(canonical_order);
        let mut dropped = 0usize;
        for tx in candidates {
            if tx.is_reward() || self.chain.contains_tx(&tx.id()) {
                continue;
            }
            let verdict = self.rules().validate_transaction(
                &tx,
                self.available_before(&tx),
                self.chain.blocks(),
            );
            match verdict.and_then(|()| self.pool.insert(tx)) {
                Ok(()) | Err(RejectReason::AlreadyPooled) => {}
                Err(reason) => {
                    dropped += 1;
                    debug!("[pc-04] Dropping pending transaction: {}", reason);
                }
            }
        }
        if dropped > 0 {
            info!("[pc-04] Dropped {} pending transactions after revalidation", dropped);
        }
    }

    // =========================================================================
    // BLOCKS AND HEADERS
    // =========================================================================

    /// Try the block as the new tip, then offer it to the fork buffer.
    pub fn submit_block(&mut self, block: Block) -> Vec<Envelope> {
        let mut out = Vec::new();
        let fork_wants = self
            .fork
            .as_ref()
            .is_some_and(|fork| fork.pending_headers().contains(&block.header));

        match self.extend_tip(block.clone()) {
            Ok(accepted) => out.extend(accepted),
            Err(e) if fork_wants => debug!("[pc-04] {} (kept for fork resolution)", e),
            Err(e) => debug!("[pc-04] {}", e),
        }
        if fork_wants {
            out.extend(self.offer_to_fork(&block));
        }
        out
    }

    /// Append `block` if it validly extends the tip.
    pub fn extend_tip(&mut self, block: Block) -> LedgerResult<Vec<Envelope>> {
        let index = block.header.index;
        self.rules()
            .validate_block(&block, &self.chain)
            .map_err(|reason| LedgerError::BlockRejected { index, reason })?;

        let included: HashSet<Hash> = block.transactions.iter().map(Transaction::id).collect();
        let header = block.header.clone();
        self.cancel_mining();
        self.chain.push(block);
        self.pool.remove_ids(&included);
        let pending = self.pool.drain();
        self.readmit(pending);

        info!(
            "[pc-04] Block {} accepted ({} transactions, root {})",
            index,
            included.len(),
            short_hex(&header.root_hash)
        );
        Ok(vec![
            Envelope::broadcast(Message::NewHeader(header.clone())),
            Envelope::notice(Notice::BlockAccepted(header)),
        ])
    }

    /// React to a tip announcement: fetch the block if it extends our tip,
    /// resync if the sender is further ahead, ignore otherwise.
    pub fn new_header(&mut self, header: Header, origin: Origin) -> Vec<Envelope> {
        let tip = &self.chain.tip().header;
        let next = tip.index + 1;

        if header.index == next {
            match validate_header(&header, tip, self.config.local_version) {
                Ok(()) => vec![Envelope::new(Message::GetBlock(header), request_target(origin))],
                Err(reason) => {
                    debug!("[pc-04] {}", LedgerError::HeaderRejected { index: header.index, reason });
                    Vec::new()
                }
            }
        } else if header.index > next {
            debug!(
                "[pc-04] Header {} is ahead of tip {}, requesting chain",
                header.index, tip.index
            );
            vec![Envelope::new(Message::GetChain, request_target(origin))]
        } else {
            Vec::new()
        }
    }

    /// Answer a block request.
    pub fn get_block(&self, header: &Header, origin: Origin) -> Vec<Envelope> {
        match self.chain.block_for(header) {
            Some(block) => vec![Envelope::new(Message::NewBlock(block.clone()), origin.reply_to())],
            None => {
                debug!("[pc-04] No block for requested header {}", header.index);
                Vec::new()
            }
        }
    }

    // =========================================================================
    // FORK RESOLUTION
    // =========================================================================

    /// Start assembling a peer's longer chain and request its missing blocks.
    ///
    /// A shorter or equal list, a foreign genesis, or unlinked headers are
    /// ignored. A new list supersedes any fork being assembled.
    pub fn resolve_conflict(&mut self, headers: Vec<Header>, origin: Origin) -> Vec<Envelope> {
        if headers.len() <= self.chain.len() {
            debug!(
                "[pc-04] Ignoring header list of {} (local chain has {})",
                headers.len(),
                self.chain.len()
            );
            return Vec::new();
        }

        let shared = self
            .chain
            .blocks()
            .iter()
            .zip(&headers)
            .take_while(|(block, header)| block.header == **header)
            .count();
        let in_flight: Vec<Transaction> = self.chain.blocks()[shared..]
            .iter()
            .flat_map(|block| block.transactions.iter())
            .chain(self.pool.iter())
            .filter(|tx| !tx.is_reward())
            .cloned()
            .collect();

        let buffer = match ForkBuffer::new(headers, self.chain.blocks(), in_flight, origin) {
            Ok(buffer) => buffer,
            Err(reason) => {
                debug!("[pc-04] Ignoring header list: {}", reason);
                return Vec::new();
            }
        };

        let target = request_target(origin);
        let requests: Vec<Envelope> = buffer
            .pending_headers()
            .into_iter()
            .map(|header| Envelope::new(Message::GetBlock(header), target))
            .collect();
        info!(
            "[pc-04] Resolving fork: {} of {} blocks to fetch (diverges at {})",
            requests.len(),
            buffer.len(),
            shared
        );
        if self.fork.replace(buffer).is_some() {
            debug!("[pc-04] Superseded unfinished fork");
        }
        requests
    }

    fn offer_to_fork(&mut self, block: &Block) -> Vec<Envelope> {
        let Some(buffer) = self.fork.as_mut() else {
            return Vec::new();
        };
        if !buffer.offer(block) {
            debug!("[pc-04] Block {} does not match its fork slot", block.header.index);
            return Vec::new();
        }
        if !buffer.is_complete() {
            return Vec::new();
        }

        let Some((blocks, in_flight)) = self.fork.take().and_then(ForkBuffer::into_parts) else {
            return Vec::new();
        };
        match self.swap_chain(blocks, in_flight) {
            Ok(out) => out,
            Err(e) => {
                warn!("[pc-04] {}", e);
                Vec::new()
            }
        }
    }

    /// Revalidate a complete candidate chain and, if it is still longer,
    /// replace the canonical chain with it.
    fn swap_chain(&mut self, blocks: Vec<Block>, in_flight: Vec<Transaction>) -> LedgerResult<Vec<Envelope>> {
        if blocks.last().map(|b| &b.header) == Some(&self.chain.tip().header) {
            debug!("[pc-04] Fork already adopted block by block");
            return Ok(Vec::new());
        }
        let candidate = self
            .rules()
            .validate_chain(blocks)
            .map_err(|e| LedgerError::ForkRejected(e.to_string()))?;
        if candidate.len() <= self.chain.len() {
            return Err(LedgerError::ForkRejected(format!(
                "candidate has {} blocks, local chain has {}",
                candidate.len(),
                self.chain.len()
            )));
        }

        self.cancel_mining();
        let mut leftovers = in_flight;
        leftovers.extend(self.pool.drain());
        self.chain = candidate;
        self.readmit(leftovers);
        self.policy.on_chain_replaced(self.chain.blocks());

        let tip = self.chain.tip().header.clone();
        info!(
            "[pc-04] Chain replaced: new tip {} ({} pending transactions)",
            tip.index,
            self.pool.len()
        );
        Ok(vec![
            Envelope::broadcast(Message::NewHeader(tip.clone())),
            Envelope::notice(Notice::ChainReplaced { tip_index: tip.index }),
        ])
    }

    // =========================================================================
    // MINING
    // =========================================================================

    /// Snapshot the pool into a candidate block and pool its reward.
    ///
    /// The header's root is computed after the reward is appended. The
    /// returned job searches for the proof without touching the ledger.
    pub fn prepare_mining(&mut self) -> LedgerResult<MiningJob> {
        if let Some(active) = &self.mining {
            return Err(LedgerError::AlreadyMining(active.index));
        }

        let parent = self.chain.tip().header.clone();
        let index = parent.index + 1;
        let mut transactions = self.rules().select_for_block(&self.pool, &self.chain);
        let fees = transactions
            .iter()
            .fold(0u64, |acc, tx| acc.saturating_add(tx.fee));

        let now = self.clock.now();
        let reward = Transaction::reward(self.miner, self.pow.subsidy(index).saturating_add(fees), now);
        self.pool.insert_reward(reward.clone());
        transactions.push(reward);

        let header = Header {
            version: self.config.local_version,
            index,
            timestamp: now.max(parent.timestamp),
            previous_root_hash: parent.root_hash,
            root_hash: merkle_root(&transactions),
            proof: 0,
        };
        let difficulty = self.pow.difficulty(parent.index);
        let cancel = Arc::new(AtomicBool::new(false));
        self.mining = Some(ActiveMining {
            index,
            cancel: Arc::clone(&cancel),
        });

        info!(
            "[pc-04] Mining block {} with {} transactions at difficulty {}",
            index,
            transactions.len(),
            difficulty
        );
        Ok(MiningJob {
            template: Block {
                header,
                transactions,
            },
            previous_proof: parent.proof,
            miner: self.miner,
            difficulty,
            cancel,
            pow: Arc::clone(&self.pow),
        })
    }

    /// Mine synchronously on the calling thread.
    pub fn mine(&mut self) -> LedgerResult<Vec<Envelope>> {
        let job = self.prepare_mining()?;
        match job.run() {
            Some(block) => Ok(self.handle_mined(block)),
            None => {
                self.cancel_mining();
                Ok(Vec::new())
            }
        }
    }

    /// Submit a block sealed by a local mining job and withdraw its reward
    /// from the pool whatever the outcome.
    pub fn handle_mined(&mut self, block: Block) -> Vec<Envelope> {
        if self
            .mining
            .as_ref()
            .is_some_and(|active| active.index == block.header.index)
        {
            self.mining = None;
        }
        info!("[pc-04] Mined block {} (proof {})", block.header.index, block.header.proof);
        let out = self.submit_block(block);
        if self.mining.is_none() {
            self.pool.withdraw_rewards();
        }
        out
    }

    /// Abort the running mining job, if any, and withdraw its reward.
    pub fn cancel_mining(&mut self) {
        if let Some(active) = self.mining.take() {
            active.cancel.store(true, Ordering::Relaxed);
            info!("[pc-04] Cancelled mining of block {}", active.index);
        }
        self.pool.withdraw_rewards();
    }

    // =========================================================================
    // PERSISTENCE AND REPORTING
    // =========================================================================

    /// Persist the chain. Failures leave in-memory state untouched.
    pub fn save(&mut self) -> Envelope {
        match self.store.save(self.chain.blocks()) {
            Ok(()) => {
                info!("[pc-04] Saved {} blocks", self.chain.len());
                Envelope::notice(Notice::Saved {
                    blocks: self.chain.len(),
                })
            }
            Err(e) => {
                warn!("[pc-04] Save failed: {}", e);
                Envelope::notice(Notice::Failure(format!("save failed: {e}")))
            }
        }
    }

    /// Chain summary: every header with its transaction count.
    pub fn dump(&self) -> Envelope {
        Envelope::notice(Notice::ChainDump(
            self.chain
                .blocks()
                .iter()
                .map(|block| (block.header.clone(), block.transactions.len()))
                .collect(),
        ))
    }
}

/// Where follow-up requests go: back to the announcing peer, or to every
/// peer when the trigger was local.
fn request_target(origin: Origin) -> Destination {
    match origin {
        Origin::Peer(addr) => Destination::Peer(addr),
        Origin::Local => Destination::Broadcast,
    }
}

fn failure(error: LedgerError, origin: Origin) -> Vec<Envelope> {
    debug!("[pc-04] {}", error);
    match origin {
        Origin::Local => vec![Envelope::notice(Notice::Failure(error.to_string()))],
        Origin::Peer(_) => Vec::new(),
    }
}

