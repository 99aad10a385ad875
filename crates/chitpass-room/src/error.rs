//! Error types for the room layer.
//!
//! Every variant maps to exactly one way an action can be rejected. A
//! rejected action never mutates room state; the hosting layer reports
//! the error back to the originating connection only.

use chitpass_protocol::GamePhase;

/// Ways a player action can be rejected.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// A non-owner attempted an owner-only action.
    #[error("only the room owner can {0}")]
    Unauthorized(&'static str),

    /// The action is not valid in the room's current phase.
    #[error("cannot {action} while the room is {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: GamePhase,
    },

    /// The room has no free player slot.
    #[error("room is full")]
    RoomFull,

    /// Malformed settings or otherwise invalid input.
    #[error("{0}")]
    Validation(String),

    /// Acting outside the sender's turn.
    #[error("it's not your turn")]
    OutOfTurn,

    /// The claimed hand is not four matching chits.
    #[error("invalid win claim: hand is not four matching chits")]
    ClaimRejected,
}
