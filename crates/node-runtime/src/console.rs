//! # Console
//!
//! Line commands typed by the operator. Every command maps to exactly one
//! enqueued message: ledger intents go to the ledger inbound queue, peer
//! listing goes to the transport outbound queue. Key commands are answered
//! by the caller, which owns the wallet.

use anyhow::{anyhow, bail, Context, Result};
use shared_crypto::{short_hex, Ed25519KeyPair, Wallet};
use shared_types::{Destination, Envelope, Inbound, Message, NetworkMessage, Notice, Party, PublicKey};

pub const HELP: &str = "\
commands:
  send <key-hex> <amount> <fee>   sign and submit a transfer
  mine                            mine a block in the background
  balance [key-hex]               balance of a key (own key by default)
  peers                           list active and inactive peers
  save                            write the chain file
  dump                            print the chain
  key                             print this node's public key
  export-key                      print this node's secret seed as hex
  import-key <seed-hex>           sign and mine with another key
  exit                            stop the node";

/// Where a parsed command goes.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// Enqueue on the ledger inbound queue.
    Ledger(Inbound),
    /// Enqueue on the transport outbound queue.
    Transport(Envelope),
    /// Print the node's public key.
    ShowKey,
    /// Print the node's secret seed.
    ExportKey,
    /// Replace the node key.
    ImportKey(Ed25519KeyPair),
    /// Print the command list.
    Help,
}

impl Command {
    /// Whether this command stops the node.
    pub fn is_exit(&self) -> bool {
        matches!(self, Command::Ledger(inbound) if inbound.message == Message::Exit)
    }
}

/// Parse one line. Blank lines yield `None`.
///
/// `now` timestamps transfers built from `send`.
pub fn parse_command(line: &str, wallet: &Wallet, now: f64) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb, args.as_slice()) {
        ("send", [recipient, amount, fee]) => {
            let recipient = parse_key(recipient)?;
            let amount: u64 = amount.parse().context("amount must be a whole number")?;
            let fee: u64 = fee.parse().context("fee must be a whole number")?;
            let tx = wallet.transfer(Party::Key(recipient), amount, fee, Vec::new(), now);
            Command::Ledger(Inbound::local(Message::NewTransaction(tx)))
        }
        ("send", _) => bail!("usage: send <key-hex> <amount> <fee>"),
        ("mine", []) => Command::Ledger(Inbound::local(Message::Mine)),
        ("balance", []) => Command::Ledger(Inbound::local(Message::PrintBalance(None))),
        ("balance", [key]) => {
            Command::Ledger(Inbound::local(Message::PrintBalance(Some(parse_key(key)?))))
        }
        ("peers", []) => Command::Transport(Envelope::new(
            Message::Network(NetworkMessage::ListPeers),
            Destination::Local,
        )),
        ("save", []) => Command::Ledger(Inbound::local(Message::Save)),
        ("dump", []) => Command::Ledger(Inbound::local(Message::Dump)),
        ("key", []) => Command::ShowKey,
        ("export-key", []) => Command::ExportKey,
        ("import-key", [seed]) => Command::ImportKey(
            Ed25519KeyPair::from_hex_seed(seed).context("seed must be 32 bytes of hex")?,
        ),
        ("import-key", _) => bail!("usage: import-key <seed-hex>"),
        ("exit" | "quit", []) => Command::Ledger(Inbound::local(Message::Exit)),
        ("help" | "?", _) => Command::Help,
        (verb, _) => bail!("unknown command {:?}, type help", verb),
    };
    Ok(Some(command))
}

fn parse_key(text: &str) -> Result<PublicKey> {
    let raw = hex::decode(text).map_err(|_| anyhow!("key must be hex"))?;
    raw.try_into()
        .map_err(|raw: Vec<u8>| anyhow!("key must be 32 bytes, got {}", raw.len()))
}

/// Render a UI-bound message as text.
pub fn render(message: &Message) -> String {
    match message {
        Message::Notice(notice) => render_notice(notice),
        other => format!("{} received", other.tag()),
    }
}

fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::TransactionAccepted(tx) => format!(
            "transaction {} accepted: {} -> {} amount {} fee {}",
            short_hex(&tx.id()),
            tx.sender,
            tx.recipient,
            tx.amount,
            tx.fee
        ),
        Notice::BlockAccepted(header) => format!(
            "block {} accepted ({})",
            header.index,
            short_hex(&header.root_hash)
        ),
        Notice::ChainReplaced { tip_index } => {
            format!("chain replaced by a longer fork, tip is now {}", tip_index)
        }
        Notice::Balance { party, amount } => format!("balance of {}: {}", party, amount),
        Notice::ChainDump(entries) => {
            let mut out = format!("chain of {} blocks", entries.len());
            for (header, tx_count) in entries {
                out.push_str(&format!(
                    "\n  #{} ts {:.3} root {} prev {} proof {} txs {}",
                    header.index,
                    header.timestamp,
                    short_hex(&header.root_hash),
                    short_hex(&header.previous_root_hash),
                    header.proof,
                    tx_count
                ));
            }
            out
        }
        Notice::Peers { active, inactive } => {
            let list = |peers: &[std::net::SocketAddr]| {
                peers
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!(
                "active peers ({}): {}\ninactive peers ({}): {}",
                active.len(),
                list(active),
                inactive.len(),
                list(inactive)
            )
        }
        Notice::MinerChanged(key) => format!("mining rewards now go to {}", Party::Key(*key)),
        Notice::Saved { blocks } => format!("saved {} blocks", blocks),
        Notice::Failure(reason) => format!("error: {}", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Header;

    fn wallet() -> Wallet {
        Wallet::new(shared_crypto::Ed25519KeyPair::from_seed([1u8; 32]))
    }

    #[test]
    fn test_blank_line_ignored() {
        assert_eq!(parse_command("   ", &wallet(), 0.0).unwrap(), None);
    }

    #[test]
    fn test_send_builds_signed_transfer() {
        let wallet = wallet();
        let recipient = [2u8; 32];
        let line = format!("send {} 10 1", hex::encode(recipient));

        let Some(Command::Ledger(inbound)) = parse_command(&line, &wallet, 1_700_000_000.5).unwrap()
        else {
            panic!("expected a ledger command");
        };
        let Message::NewTransaction(tx) = inbound.message else {
            panic!("expected a transaction");
        };
        assert_eq!(tx.sender, wallet.party());
        assert_eq!(tx.recipient, Party::Key(recipient));
        assert_eq!((tx.amount, tx.fee), (10, 1));
        assert_eq!(tx.timestamp, 1_700_000_000.5);
        assert!(shared_crypto::verify_transaction(&tx).is_ok());
    }

    #[test]
    fn test_send_argument_errors() {
        let wallet = wallet();
        assert!(parse_command("send", &wallet, 0.0).is_err());
        assert!(parse_command("send zz 1 1", &wallet, 0.0).is_err());
        assert!(parse_command("send abcd 1 1", &wallet, 0.0).is_err());
        let key = hex::encode([2u8; 32]);
        assert!(parse_command(&format!("send {} -1 0", key), &wallet, 0.0).is_err());
    }

    #[test]
    fn test_command_routing() {
        let wallet = wallet();
        let parse = |line: &str| parse_command(line, &wallet, 0.0).unwrap().unwrap();

        assert_eq!(parse("mine"), Command::Ledger(Inbound::local(Message::Mine)));
        assert_eq!(
            parse("balance"),
            Command::Ledger(Inbound::local(Message::PrintBalance(None)))
        );
        assert_eq!(
            parse(&format!("balance {}", hex::encode([3u8; 32]))),
            Command::Ledger(Inbound::local(Message::PrintBalance(Some([3u8; 32]))))
        );
        assert_eq!(
            parse("peers"),
            Command::Transport(Envelope::new(
                Message::Network(NetworkMessage::ListPeers),
                Destination::Local
            ))
        );
        assert_eq!(parse("save"), Command::Ledger(Inbound::local(Message::Save)));
        assert_eq!(parse("dump"), Command::Ledger(Inbound::local(Message::Dump)));
        assert_eq!(parse("key"), Command::ShowKey);
        assert_eq!(parse("help"), Command::Help);
        assert!(parse("exit").is_exit());
        assert!(!parse("mine").is_exit());
    }

    #[test]
    fn test_key_commands() {
        let wallet = wallet();
        assert_eq!(parse_command("export-key", &wallet, 0.0).unwrap(), Some(Command::ExportKey));

        let seed = hex::encode([5u8; 32]);
        let Some(Command::ImportKey(keypair)) =
            parse_command(&format!("import-key {}", seed), &wallet, 0.0).unwrap()
        else {
            panic!("expected an import");
        };
        assert_eq!(keypair, shared_crypto::Ed25519KeyPair::from_seed([5u8; 32]));

        assert!(parse_command("import-key", &wallet, 0.0).is_err());
        assert!(parse_command("import-key abcd", &wallet, 0.0).is_err());
        assert!(parse_command("export-key now", &wallet, 0.0).is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(parse_command("fly", &wallet(), 0.0).is_err());
        assert!(parse_command("mine now", &wallet(), 0.0).is_err());
    }

    #[test]
    fn test_render_notices() {
        let balance = Message::Notice(Notice::Balance {
            party: Party::Key([0xab; 32]),
            amount: 42,
        });
        assert!(render(&balance).ends_with(": 42"));

        let dump = Message::Notice(Notice::ChainDump(vec![(Header::genesis(), 0)]));
        let text = render(&dump);
        assert!(text.starts_with("chain of 1 blocks"));
        assert!(text.contains("#0"));

        let peers = Message::Notice(Notice::Peers {
            active: vec!["127.0.0.1:7000".parse().unwrap()],
            inactive: vec![],
        });
        assert!(render(&peers).contains("127.0.0.1:7000"));

        let miner = render(&Message::Notice(Notice::MinerChanged([0xcd; 32])));
        assert!(miner.contains(&hex::encode([0xcd_u8; 32])));

        assert_eq!(
            render(&Message::Notice(Notice::Failure("nope".into()))),
            "error: nope"
        );
    }
}
