//! Win validation: the four-matching-chits rule.

use crate::dealer::HAND_SIZE;

/// Decides whether a hand wins, returning the matched entity if so.
///
/// A hand wins iff it holds exactly [`HAND_SIZE`] chits and all of them
/// carry the same entity value. Pure over the hand alone; turn and
/// phase gating live in the session, not here.
pub fn winning_entity(hand: &[String]) -> Option<&str> {
    let [first, rest @ ..] = hand else { return None };
    if hand.len() != HAND_SIZE || !rest.iter().all(|c| c == first) {
        return None;
    }
    Some(first.as_str())
}
