//! Per-room game state machine for chitpass.
//!
//! One [`RoomSession`] is the single authority for one room code. It is
//! deliberately synchronous and transport-free: the hosting layer feeds
//! it protocol events one at a time and delivers whatever it returns.
//! All game rules live here, split by sub-responsibility:
//!
//! - roster and lifecycle: [`RoomSession`] itself
//! - settings negotiation: `settings`
//! - dealing: `dealer` (pool building and the Fisher–Yates shuffle)
//! - turn engine: `turn` (fixed clockwise order, pass rounds)
//! - win validation: [`winning_entity`], a pure function over a hand
//!
//! # Key types
//!
//! - [`RoomSession`]: the per-room authority
//! - [`Outbound`]: routed messages a handled event produces
//! - [`GameError`]: every way an action can be rejected

mod dealer;
mod error;
mod session;
mod settings;
mod turn;
mod win;

pub use dealer::HAND_SIZE;
pub use error::GameError;
pub use session::{Outbound, RoomSession};
pub use win::winning_entity;
