//! Bootstrap peer sources.
//!
//! The peer file holds one `host port` pair per line. Lines that do not parse
//! are skipped with a warning; a missing file is created with defaults.

use crate::domain::PeerDirectoryError;
use crate::ports::BootstrapProvider;
use std::fs;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Contents written to a freshly created peer file.
pub const DEFAULT_PEERS: &str = "127.0.0.1 6666\n";

/// Parse a single `host port` line.
///
/// Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_peer_line(line: &str) -> Result<Option<SocketAddr>, PeerDirectoryError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let (host, port) = match (parts.next(), parts.next(), parts.next()) {
        (Some(host), Some(port), None) => (host, port),
        _ => return Err(PeerDirectoryError::MalformedLine(line.to_string())),
    };

    let port: u32 = port
        .parse()
        .map_err(|_| PeerDirectoryError::InvalidPort(port.to_string()))?;
    let port = u16::try_from(port).map_err(|_| PeerDirectoryError::InvalidPort(port.to_string()))?;

    (host, port)
        .to_socket_addrs()
        .map_err(|_| PeerDirectoryError::UnresolvableHost(host.to_string()))?
        .next()
        .map(Some)
        .ok_or_else(|| PeerDirectoryError::UnresolvableHost(host.to_string()))
}

/// Parse a whole peer file, skipping malformed lines.
pub fn parse_peer_list(content: &str) -> Vec<SocketAddr> {
    content
        .lines()
        .filter_map(|line| match parse_peer_line(line) {
            Ok(addr) => addr,
            Err(e) => {
                warn!("[pc-01] Skipping peer entry: {}", e);
                None
            }
        })
        .collect()
}

// ============================================================================
// BootstrapFile - peers from a text file
// ============================================================================

/// Peer file adapter.
#[derive(Debug, Clone)]
pub struct BootstrapFile {
    path: PathBuf,
}

impl BootstrapFile {
    /// Use the peer file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the peer file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: std::io::Error) -> PeerDirectoryError {
        PeerDirectoryError::Io {
            path: self.path.display().to_string(),
            error: e.to_string(),
        }
    }
}

impl BootstrapProvider for BootstrapFile {
    fn bootstrap_peers(&self) -> Result<Vec<SocketAddr>, PeerDirectoryError> {
        if !self.path.exists() {
            info!("[pc-01] Creating default peer file at {}", self.path.display());
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
            fs::write(&self.path, DEFAULT_PEERS).map_err(|e| self.io_error(e))?;
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let peers = parse_peer_list(&content);
        debug!("[pc-01] Loaded {} bootstrap peers", peers.len());
        Ok(peers)
    }
}

// ============================================================================
// StaticBootstrap - fixed list for tests and embedding
// ============================================================================

/// Fixed bootstrap list.
#[derive(Debug, Clone, Default)]
pub struct StaticBootstrap {
    peers: Vec<SocketAddr>,
}

impl StaticBootstrap {
    /// Bootstrap from `peers`.
    pub fn new(peers: Vec<SocketAddr>) -> Self {
        Self { peers }
    }
}

impl BootstrapProvider for StaticBootstrap {
    fn bootstrap_peers(&self) -> Result<Vec<SocketAddr>, PeerDirectoryError> {
        Ok(self.peers.clone())
    }
}
