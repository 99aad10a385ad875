//! Hosting substrate for chitpass rooms.
//!
//! The room state machine (`chitpass-room`) is synchronous and
//! transport-free; this crate is everything around it:
//!
//! - [`ChitpassServer`] / [`ChitpassServerBuilder`]: bind and run the
//!   WebSocket accept loop
//! - [`RoomRegistry`]: lazily creates a room actor per room code and
//!   tears it down when its last connection leaves
//! - [`RoomHandle`]: the command channel into one room actor; events
//!   sent through it are processed strictly in arrival order, which is
//!   the serialization guarantee the game rules assume
//! - [`ServerError`]: plumbing failures (game rejections go to clients
//!   as `error` messages instead)

mod actor;
mod error;
mod handler;
mod registry;
mod server;

pub use actor::{OutboundSender, RoomHandle};
pub use error::ServerError;
pub use registry::RoomRegistry;
pub use server::{ChitpassServer, ChitpassServerBuilder};
