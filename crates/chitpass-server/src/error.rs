//! Unified error type for the chitpass server.

use chitpass_protocol::ProtocolError;
use chitpass_transport::TransportError;

/// Top-level error for the hosting layer.
///
/// Game rejections never appear here; they travel to the offending
/// client as `error` messages and leave the server healthy. This type
/// covers the plumbing: sockets and codecs, plus a room actor vanishing
/// mid-conversation.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The room actor is gone (its channel closed).
    #[error("room {0} is unavailable")]
    RoomUnavailable(String),
}
