//! Wire protocol for chitpass.
//!
//! This crate defines the "language" that clients and the game server
//! speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`RoomStateView`],
//!   [`RoomSettings`], etc.): the message structures that travel on the
//!   wire, plus the [`Recipient`] routing tag used server-side.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes on a room-scoped
//! connection) and the room authority (game rules). It doesn't know about
//! sockets or rooms; it only knows how to represent and serialize
//! messages.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Room (state machine)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, GamePhase, PassMode, Player, PlayerId, Recipient,
    RoomSettings, RoomStateView, ServerMessage, SettingsPatch,
    DEFAULT_ENTITIES,
};
