//! Turn engine: the fixed clockwise order and the pass pointer.

use chitpass_protocol::PlayerId;

/// Turn bookkeeping for one playing phase.
///
/// The order is fixed at deal time and never changes while the phase
/// lasts, even if a member disconnects: a disconnected player keeps
/// their slot so passes still route through it. Only a fresh deal
/// replaces the whole thing.
#[derive(Debug, Clone)]
pub(crate) struct TurnState {
    order: Vec<PlayerId>,
    current: usize,
    pass_round: u32,
}

impl TurnState {
    /// Locks in the clockwise order. The pointer starts at the first
    /// slot and the pass round at 1.
    pub(crate) fn new(order: Vec<PlayerId>) -> Self {
        debug_assert!(order.len() >= 2, "a deal needs at least 2 players");
        Self { order, current: 0, pass_round: 1 }
    }

    pub(crate) fn order(&self) -> &[PlayerId] {
        &self.order
    }

    pub(crate) fn pass_round(&self) -> u32 {
        self.pass_round
    }

    /// The only player allowed to pass right now.
    pub(crate) fn current_player(&self) -> PlayerId {
        self.order[self.current]
    }

    /// The player the current chit goes to: the next slot clockwise.
    pub(crate) fn receiver(&self) -> PlayerId {
        self.order[(self.current + 1) % self.order.len()]
    }

    /// Moves the pointer to the receiver's slot. Completing a full lap
    /// back to slot 0 bumps the pass round, and only then.
    pub(crate) fn advance(&mut self) {
        self.current = (self.current + 1) % self.order.len();
        if self.current == 0 {
            self.pass_round += 1;
        }
    }
}
