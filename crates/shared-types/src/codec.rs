//! # Wire Codec
//!
//! Encodes messages as a bincode-serialized `Message`. The enum discriminant is
//! the type tag, so an unknown tag fails `decode` instead of reaching a handler.

use crate::errors::CodecError;
use crate::messages::Message;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Upper bound on a single decoded logical message (16 MiB).
pub const MAX_MESSAGE_BYTES: u64 = 16 * 1024 * 1024;

fn options() -> impl bincode::Options {
    use bincode::Options;
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_MESSAGE_BYTES)
        .reject_trailing_bytes()
}

/// Serialize any entity with the wire options.
pub fn encode_entity<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    use bincode::Options;
    options()
        .serialize(value)
        .map_err(|e| CodecError::Encode(e.to_string()))
}

/// Deserialize any entity with the wire options.
pub fn decode_entity<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    use bincode::Options;
    options()
        .deserialize(bytes)
        .map_err(|e| CodecError::Decode(e.to_string()))
}

/// Encode a message for the wire.
pub fn encode(message: &Message) -> Result<Vec<u8>, CodecError> {
    encode_entity(message)
}

/// Decode a message from the wire.
pub fn decode(bytes: &[u8]) -> Result<Message, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::Empty);
    }
    decode_entity(bytes)
}
