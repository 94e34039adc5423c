//! # Fragmentation Protocol
//!
//! Carries logical messages of any size over datagrams of at most `budget`
//! bytes. Every datagram starts with one control byte:
//!
//! | Byte | Meaning |
//! |------|---------|
//! | 0 | `single`: the whole message |
//! | 1 | `start`: first chunk, resets the sender's buffer |
//! | 2 | `middle`: appended chunk |
//! | 3 | `end`: last chunk, completes the message |
//!
//! No acknowledgement, retry or reordering. A lost fragment stalls the
//! sender's buffer until the next `start` or `single` replaces it.

use super::errors::TransportError;
use shared_types::MAX_MESSAGE_BYTES;
use std::collections::HashMap;
use std::net::SocketAddr;

/// Per-datagram control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ControlByte {
    /// Unfragmented message.
    Single = 0,
    /// First fragment.
    Start = 1,
    /// Intermediate fragment.
    Middle = 2,
    /// Final fragment.
    End = 3,
}

impl TryFrom<u8> for ControlByte {
    type Error = TransportError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Single),
            1 => Ok(Self::Start),
            2 => Ok(Self::Middle),
            3 => Ok(Self::End),
            other => Err(TransportError::UnknownControl(other)),
        }
    }
}

/// Split `payload` into datagrams of at most `budget` bytes.
pub fn fragment(payload: &[u8], budget: usize) -> Result<Vec<Vec<u8>>, TransportError> {
    if budget < 2 {
        return Err(TransportError::BudgetTooSmall(budget));
    }
    let chunk_size = budget - 1;

    if payload.len() <= chunk_size {
        return Ok(vec![datagram(ControlByte::Single, payload)]);
    }

    let chunks: Vec<&[u8]> = payload.chunks(chunk_size).collect();
    let last = chunks.len() - 1;
    Ok(chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let control = match i {
                0 => ControlByte::Start,
                i if i == last => ControlByte::End,
                _ => ControlByte::Middle,
            };
            datagram(control, chunk)
        })
        .collect())
}

fn datagram(control: ControlByte, chunk: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(chunk.len() + 1);
    out.push(control as u8);
    out.extend_from_slice(chunk);
    out
}

/// Per-sender reassembly buffers.
#[derive(Debug, Default)]
pub struct Reassembler {
    partial: HashMap<SocketAddr, Vec<u8>>,
}

impl Reassembler {
    /// Create an empty reassembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one datagram from `from`.
    ///
    /// Returns the completed message on `single`/`end`, `None` while a message
    /// is still being accumulated. Any anomaly clears the sender's buffer.
    pub fn push(&mut self, from: SocketAddr, datagram: &[u8]) -> Result<Option<Vec<u8>>, TransportError> {
        let (&first, body) = datagram
            .split_first()
            .ok_or(TransportError::EmptyDatagram)?;

        let control = match ControlByte::try_from(first) {
            Ok(control) => control,
            Err(e) => {
                self.partial.remove(&from);
                return Err(e);
            }
        };

        match control {
            ControlByte::Single => {
                self.partial.remove(&from);
                Ok(Some(body.to_vec()))
            }
            ControlByte::Start => {
                if self.partial.insert(from, body.to_vec()).is_some() {
                    tracing::debug!("[pc-03] Discarding unfinished message from {}", from);
                }
                Ok(None)
            }
            ControlByte::Middle => {
                self.append(from, body)?;
                Ok(None)
            }
            ControlByte::End => {
                self.append(from, body)?;
                Ok(self.partial.remove(&from))
            }
        }
    }

    /// True if a message from `from` is partially accumulated.
    pub fn is_pending(&self, from: &SocketAddr) -> bool {
        self.partial.contains_key(from)
    }

    fn append(&mut self, from: SocketAddr, body: &[u8]) -> Result<(), TransportError> {
        let buffer = self
            .partial
            .get_mut(&from)
            .ok_or(TransportError::OrphanFragment)?;
        if (buffer.len() + body.len()) as u64 > MAX_MESSAGE_BYTES {
            self.partial.remove(&from);
            return Err(TransportError::Oversize {
                limit: MAX_MESSAGE_BYTES,
            });
        }
        buffer.extend_from_slice(body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDGET: usize = 32;

    fn peer(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn reassemble(datagrams: &[Vec<u8>]) -> Option<Vec<u8>> {
        let mut reassembler = Reassembler::new();
        let mut out = None;
        for datagram in datagrams {
            out = reassembler.push(peer(1), datagram).unwrap();
        }
        out
    }

    #[test]
    fn test_round_trip_boundary_sizes() {
        for len in [0, BUDGET - 1, BUDGET, BUDGET + 1, 3 * BUDGET + 7] {
            let original = payload(len);
            let datagrams = fragment(&original, BUDGET).unwrap();

            assert!(datagrams.iter().all(|d| d.len() <= BUDGET), "len {len}");
            assert_eq!(reassemble(&datagrams), Some(original), "len {len}");
        }
    }

    #[test]
    fn test_control_byte_sequence() {
        assert_eq!(fragment(&payload(0), BUDGET).unwrap(), vec![vec![0]]);
        assert_eq!(fragment(&payload(BUDGET - 1), BUDGET).unwrap().len(), 1);

        let datagrams = fragment(&payload(3 * BUDGET + 7), BUDGET).unwrap();
        let controls: Vec<u8> = datagrams.iter().map(|d| d[0]).collect();
        assert_eq!(controls.first(), Some(&1));
        assert_eq!(controls.last(), Some(&3));
        assert!(controls[1..controls.len() - 1].iter().all(|c| *c == 2));

        let two = fragment(&payload(BUDGET), BUDGET).unwrap();
        assert_eq!(two.iter().map(|d| d[0]).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_budget_too_small() {
        assert_eq!(fragment(b"x", 1), Err(TransportError::BudgetTooSmall(1)));
    }

    #[test]
    fn test_new_start_discards_unfinished() {
        let mut reassembler = Reassembler::new();
        let first = fragment(&[1u8; 100], BUDGET).unwrap();
        let second = fragment(&[2u8; 40], BUDGET).unwrap();

        // Half of the first message, then the whole second one
        reassembler.push(peer(1), &first[0]).unwrap();
        reassembler.push(peer(1), &first[1]).unwrap();
        let mut out = None;
        for datagram in &second {
            out = reassembler.push(peer(1), datagram).unwrap();
        }

        assert_eq!(out, Some(vec![2u8; 40]));
        assert!(!reassembler.is_pending(&peer(1)));
    }

    #[test]
    fn test_senders_reassemble_independently() {
        let mut reassembler = Reassembler::new();
        let a = fragment(&[0xaa; 50], BUDGET).unwrap();
        let b = fragment(&[0xbb; 50], BUDGET).unwrap();

        reassembler.push(peer(1), &a[0]).unwrap();
        reassembler.push(peer(2), &b[0]).unwrap();
        assert_eq!(reassembler.push(peer(1), &a[1]).unwrap(), Some(vec![0xaa; 50]));
        assert_eq!(reassembler.push(peer(2), &b[1]).unwrap(), Some(vec![0xbb; 50]));
    }

    #[test]
    fn test_orphan_fragments_rejected() {
        let mut reassembler = Reassembler::new();
        assert_eq!(reassembler.push(peer(1), &[2, 9]), Err(TransportError::OrphanFragment));
        assert_eq!(reassembler.push(peer(1), &[3, 9]), Err(TransportError::OrphanFragment));
    }

    #[test]
    fn test_anomalies_clear_state() {
        let mut reassembler = Reassembler::new();
        reassembler.push(peer(1), &[1, 7, 7]).unwrap();

        assert_eq!(reassembler.push(peer(1), &[9]), Err(TransportError::UnknownControl(9)));
        assert!(!reassembler.is_pending(&peer(1)));
        assert_eq!(reassembler.push(peer(1), &[]), Err(TransportError::EmptyDatagram));
    }

    #[test]
    fn test_single_clears_unfinished() {
        let mut reassembler = Reassembler::new();
        reassembler.push(peer(1), &[1, 7, 7]).unwrap();
        assert_eq!(reassembler.push(peer(1), &[0, 5]).unwrap(), Some(vec![5]));
        assert!(!reassembler.is_pending(&peer(1)));
    }
}
