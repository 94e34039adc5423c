//! Node signing key.
//!
//! A key file holds the 32-byte Ed25519 seed as hex on one line. When the
//! configured file does not exist a fresh key is generated and written there,
//! so the node keeps its identity across restarts.

use anyhow::{Context, Result};
use shared_crypto::{Ed25519KeyPair, Wallet};
use std::fs;
use zeroize::Zeroize;
use std::path::Path;
use tracing::{info, warn};

/// Load the node wallet from `key_file`, or create an ephemeral one.
pub fn load_wallet(key_file: Option<&Path>) -> Result<Wallet> {
    let Some(path) = key_file else {
        let wallet = Wallet::generate();
        warn!(
            "Using an ephemeral key {}; configure a key file to keep it",
            hex::encode(wallet.public_key())
        );
        return Ok(wallet);
    };

    if path.exists() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read key file {}", path.display()))?;
        let keypair = Ed25519KeyPair::from_hex_seed(&text)
            .with_context(|| format!("invalid key file {}", path.display()))?;
        let wallet = Wallet::new(keypair);
        info!("Loaded key {} from {}", hex::encode(wallet.public_key()), path.display());
        return Ok(wallet);
    }

    let keypair = Ed25519KeyPair::generate();
    save_key(path, &keypair)?;
    let wallet = Wallet::new(keypair);
    info!("Generated key {} into {}", hex::encode(wallet.public_key()), path.display());
    Ok(wallet)
}

/// Write `keypair`'s seed to `path`, replacing any previous key.
pub fn save_key(path: &Path, keypair: &Ed25519KeyPair) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let mut seed = hex::encode(keypair.to_seed());
    seed.push('\n');
    let written = fs::write(path, &seed);
    seed.zeroize();
    written.with_context(|| format!("cannot write key file {}", path.display()))
}
