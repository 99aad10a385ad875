//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The hosting layer doesn't care HOW messages become bytes; it goes
//! through the [`Codec`] trait, and [`JsonCodec`] is the implementation
//! the browser client speaks. A binary codec could be swapped in without
//! touching the room or server code.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode protocol types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec is shared by every
/// connection-handler task on the Tokio runtime. The methods are generic
/// so one codec instance serves both [`ClientMessage`](crate::ClientMessage)
/// and [`ServerMessage`](crate::ServerMessage).
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is the wire format of the game protocol: human-readable, easy to
/// inspect in browser DevTools, and directly consumable from JavaScript.
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use chitpass_protocol::{ClientMessage, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let msg = ClientMessage::PassChit { chit_index: 1 };
///
/// let bytes = codec.encode(&msg).unwrap();
/// assert_eq!(bytes, br#"{"type":"pass_chit","chitIndex":1}"#);
///
/// let decoded: ClientMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, msg);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
