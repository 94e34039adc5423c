//! # Wallet
//!
//! Builds and signs transactions with a local keypair, and checks signatures
//! on transactions received from peers.

use crate::signatures::{verify_signature, Ed25519KeyPair};
use crate::CryptoError;
use shared_types::{Party, PublicKey, Transaction};

/// A keypair that signs transactions.
pub struct Wallet {
    keypair: Ed25519KeyPair,
}

impl Wallet {
    /// Wrap a keypair.
    pub fn new(keypair: Ed25519KeyPair) -> Self {
        Self { keypair }
    }

    /// Wallet with a fresh random key.
    pub fn generate() -> Self {
        Self::new(Ed25519KeyPair::generate())
    }

    /// The account identifier.
    pub fn public_key(&self) -> PublicKey {
        *self.keypair.public_key().as_bytes()
    }

    /// The account as a transaction party.
    pub fn party(&self) -> Party {
        Party::Key(self.public_key())
    }

    /// Access the underlying keypair (key export).
    pub fn keypair(&self) -> &Ed25519KeyPair {
        &self.keypair
    }

    /// Build and sign a transaction from this wallet.
    pub fn transfer(
        &self,
        recipient: Party,
        amount: u64,
        fee: u64,
        payload: Vec<u8>,
        timestamp: f64,
    ) -> Transaction {
        let mut tx = Transaction {
            sender: self.party(),
            recipient,
            amount,
            fee,
            timestamp,
            payload,
            signature: [0u8; 64],
        };
        tx.signature = *self.keypair.sign(&tx.signing_hash()).as_bytes();
        tx
    }
}

/// Check a non-reward transaction's signature against its sender key.
pub fn verify_transaction(tx: &Transaction) -> Result<(), CryptoError> {
    let key = tx.sender.key().ok_or(CryptoError::NotAKeyAccount)?;
    verify_signature(key, &tx.signing_hash(), &tx.signature)
}
