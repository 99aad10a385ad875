//! The room session: single authority for one room's canonical state.
//!
//! A `RoomSession` mutates only in response to inbound protocol events
//! and returns the messages those events produce, each paired with a
//! [`Recipient`]. It never talks to the network itself; the hosting
//! layer feeds it events one at a time (strictly serialized per room)
//! and fans the returned messages out to connections. That serialization
//! is what makes turn enforcement and win-claim races correct without
//! any locking in here.
//!
//! Every handler is all-or-nothing: a rejected action produces a single
//! [`ServerMessage::Error`] for the offender and leaves state untouched.

use chitpass_protocol::{
    ClientMessage, GamePhase, Player, PlayerId, Recipient, RoomSettings,
    RoomStateView, ServerMessage, SettingsPatch,
};

use crate::turn::TurnState;
use crate::{dealer, settings, win, GameError};

/// Outbound messages produced by one handled event, in delivery order.
pub type Outbound = Vec<(Recipient, ServerMessage)>;

/// Minimum connected players required to start a deal.
const MIN_PLAYERS_TO_START: usize = 2;

/// Canonical state of one room, addressed by its room code.
#[derive(Debug)]
pub struct RoomSession {
    room_id: String,
    settings: RoomSettings,
    /// Roster in join order. Join order is load-bearing: it is the
    /// owner-transfer tie-break and the order hands are dealt in.
    players: Vec<Player>,
    phase: GamePhase,
    winner: Option<PlayerId>,
    winner_name: Option<String>,
    winner_entity: Option<String>,
    round: u32,
    owner_id: Option<PlayerId>,
    /// Turn bookkeeping for the current (or most recent) deal. `None`
    /// until the first deal; left stale after a round finishes and
    /// rebuilt wholesale by the next deal.
    turn: Option<TurnState>,
}

impl RoomSession {
    /// Creates an empty lobby for the given room code.
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            settings: RoomSettings::default(),
            players: Vec::new(),
            phase: GamePhase::Lobby,
            winner: None,
            winner_name: None,
            winner_entity: None,
            round: 1,
            owner_id: None,
            turn: None,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    /// The authoritative roster, hands included. Not for broadcast;
    /// use [`snapshot`](Self::snapshot) for anything client-facing.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// The broadcastable projection: every hand redacted to empty.
    pub fn snapshot(&self) -> RoomStateView {
        RoomStateView {
            room_id: self.room_id.clone(),
            settings: self.settings.clone(),
            players: self
                .players
                .iter()
                .map(|p| Player { hand: Vec::new(), ..p.clone() })
                .collect(),
            phase: self.phase,
            winner: self.winner,
            winner_name: self.winner_name.clone(),
            winner_entity: self.winner_entity.clone(),
            round: self.round,
            owner_id: self.owner_id,
            player_order: self
                .turn
                .as_ref()
                .map(|t| t.order().to_vec())
                .unwrap_or_default(),
            current_turn_player_id: self
                .turn
                .as_ref()
                .map(|t| t.current_player()),
            pass_round: self.turn.as_ref().map(|t| t.pass_round()).unwrap_or(0),
        }
    }

    // -----------------------------------------------------------------
    // Connection lifecycle
    // -----------------------------------------------------------------

    /// A connection opened on this room. The newcomer gets the current
    /// snapshot immediately so a spectator sees the room before joining.
    pub fn connection_opened(&self, id: PlayerId) -> Outbound {
        vec![(
            Recipient::Player(id),
            ServerMessage::RoomState { state: self.snapshot() },
        )]
    }

    /// A connection closed. Unknown ids (connections that never joined)
    /// are a silent no-op.
    ///
    /// A known player is marked disconnected; if they were the owner,
    /// ownership moves to the first remaining connected player in roster
    /// order, or stays stale when nobody is left. Lobby records are
    /// deleted outright (freeing the slot); mid-game records are
    /// retained so score and turn slot stay addressable.
    pub fn connection_closed(&mut self, id: PlayerId) -> Outbound {
        let Some(idx) = self.players.iter().position(|p| p.id == id) else {
            return Vec::new();
        };

        self.players[idx].is_connected = false;

        if self.owner_id == Some(id) {
            let next = self.players.iter().find(|p| p.is_connected).map(|p| p.id);
            match next {
                Some(next_id) => {
                    self.set_owner(next_id);
                    tracing::info!(
                        room = %self.room_id,
                        from = %id,
                        to = %next_id,
                        "ownership transferred"
                    );
                }
                // Nobody left to promote: owner_id stays stale and the
                // next join claims it.
                None => {}
            }
        }

        if self.phase == GamePhase::Lobby {
            self.players.remove(idx);
        }

        tracing::info!(room = %self.room_id, player = %id, "player disconnected");
        self.broadcast_snapshot()
    }

    // -----------------------------------------------------------------
    // Message dispatch
    // -----------------------------------------------------------------

    /// Processes one inbound message from `sender`.
    ///
    /// Rejections come back as a single `error` message addressed to the
    /// sender; nothing else observes a failed action.
    pub fn handle_message(
        &mut self,
        sender: PlayerId,
        msg: ClientMessage,
    ) -> Outbound {
        let result = match msg {
            ClientMessage::Join { name } => self.join(sender, &name),
            ClientMessage::UpdateSettings { settings } => {
                self.update_settings(sender, settings)
            }
            ClientMessage::StartGame => self.start_game(sender),
            ClientMessage::PassChit { chit_index } => {
                self.pass_chit(sender, chit_index)
            }
            ClientMessage::ClaimWin => self.claim_win(sender),
            ClientMessage::PlayAgain => self.play_again(sender),
        };

        match result {
            Ok(out) => out,
            Err(e) => {
                tracing::debug!(
                    room = %self.room_id,
                    player = %sender,
                    error = %e,
                    "action rejected"
                );
                vec![(
                    Recipient::Player(sender),
                    ServerMessage::Error { message: e.to_string() },
                )]
            }
        }
    }

    // -----------------------------------------------------------------
    // Roster
    // -----------------------------------------------------------------

    fn join(&mut self, id: PlayerId, name: &str) -> Result<Outbound, GameError> {
        if self.phase != GamePhase::Lobby {
            return Err(GameError::InvalidPhase {
                action: "join",
                phase: self.phase,
            });
        }
        if self.players.iter().any(|p| p.id == id) {
            return Err(GameError::Validation(
                "already joined this room".into(),
            ));
        }
        if self.connected_count() >= self.settings.max_players {
            return Err(GameError::RoomFull);
        }

        let becomes_owner = !self.has_connected_owner();
        self.players.push(Player {
            id,
            name: sanitize_name(name),
            is_owner: false,
            is_connected: true,
            hand: Vec::new(),
            score: 0,
        });
        if becomes_owner {
            self.set_owner(id);
        }

        tracing::info!(
            room = %self.room_id,
            player = %id,
            players = self.players.len(),
            "player joined"
        );
        Ok(self.broadcast_snapshot())
    }

    // -----------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------

    fn update_settings(
        &mut self,
        sender: PlayerId,
        patch: SettingsPatch,
    ) -> Result<Outbound, GameError> {
        if self.owner_id != Some(sender) {
            return Err(GameError::Unauthorized("change settings"));
        }
        if self.phase != GamePhase::Lobby {
            return Err(GameError::InvalidPhase {
                action: "change settings",
                phase: self.phase,
            });
        }

        settings::apply_patch(&mut self.settings, patch)?;
        Ok(self.broadcast_snapshot())
    }

    // -----------------------------------------------------------------
    // Dealing
    // -----------------------------------------------------------------

    fn start_game(&mut self, sender: PlayerId) -> Result<Outbound, GameError> {
        if self.owner_id != Some(sender) {
            return Err(GameError::Unauthorized("start the game"));
        }
        if self.phase != GamePhase::Lobby {
            return Err(GameError::InvalidPhase {
                action: "start the game",
                phase: self.phase,
            });
        }

        // The deal covers connected players only; retained records from
        // an earlier round sit out until they are gone or rejoin a slot.
        let seated: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.is_connected)
            .map(|p| p.id)
            .collect();
        if seated.len() < MIN_PLAYERS_TO_START {
            return Err(GameError::Validation(format!(
                "need at least {MIN_PLAYERS_TO_START} players to start"
            )));
        }

        dealer::ensure_entities(&mut self.settings.entity_names, seated.len());
        let hands = dealer::deal(
            &self.settings.entity_names,
            seated.len(),
            &mut rand::rng(),
        );
        for (id, hand) in seated.iter().zip(hands) {
            if let Some(p) = self.player_mut(*id) {
                p.hand = hand;
            }
        }

        self.turn = Some(TurnState::new(seated.clone()));
        self.winner = None;
        self.winner_name = None;
        self.winner_entity = None;
        self.phase = GamePhase::Playing;

        tracing::info!(
            room = %self.room_id,
            players = seated.len(),
            round = self.round,
            "game started"
        );

        let mut out = self.broadcast_snapshot();
        out.push((Recipient::All, ServerMessage::GameStarted));
        for id in &seated {
            let hand = self
                .player(*id)
                .map(|p| p.hand.clone())
                .unwrap_or_default();
            out.push((
                Recipient::Player(*id),
                ServerMessage::YourHand { hand },
            ));
        }
        Ok(out)
    }

    // -----------------------------------------------------------------
    // Passing
    // -----------------------------------------------------------------

    fn pass_chit(
        &mut self,
        sender: PlayerId,
        chit_index: usize,
    ) -> Result<Outbound, GameError> {
        // Out-of-phase, unknown-sender, and out-of-range passes are
        // silently dropped: they are stale messages, not violations.
        if self.phase != GamePhase::Playing {
            return Ok(Vec::new());
        }
        let Some(sender_idx) =
            self.players.iter().position(|p| p.id == sender)
        else {
            return Ok(Vec::new());
        };
        if chit_index >= self.players[sender_idx].hand.len() {
            return Ok(Vec::new());
        }

        let (current, receiver) = {
            let turn = self
                .turn
                .as_ref()
                .expect("playing phase implies a dealt turn order");
            (turn.current_player(), turn.receiver())
        };
        if sender != current {
            return Err(GameError::OutOfTurn);
        }

        // Move the chit. The receiver slot always exists, even when that
        // player is disconnected: their retained record keeps
        // accumulating state for later reconciliation.
        let chit = self.players[sender_idx].hand.remove(chit_index);
        let receiver_hand = {
            let p = self
                .player_mut(receiver)
                .expect("turn order only holds roster ids");
            p.hand.push(chit);
            p.hand.clone()
        };
        let sender_hand = self.players[sender_idx].hand.clone();

        let pass_round = {
            let turn = self
                .turn
                .as_mut()
                .expect("playing phase implies a dealt turn order");
            turn.advance();
            turn.pass_round()
        };
        tracing::debug!(
            room = %self.room_id,
            from = %sender,
            to = %receiver,
            pass_round,
            "chit passed"
        );

        let mut out = vec![
            (
                Recipient::Player(sender),
                ServerMessage::YourHand { hand: sender_hand },
            ),
            (
                Recipient::Player(receiver),
                ServerMessage::YourHand { hand: receiver_hand },
            ),
        ];
        out.extend(self.broadcast_snapshot());
        Ok(out)
    }

    // -----------------------------------------------------------------
    // Win claims
    // -----------------------------------------------------------------

    fn claim_win(&mut self, sender: PlayerId) -> Result<Outbound, GameError> {
        // Claims outside the playing phase (including any claim after
        // the first valid one) are stale, not violations.
        if self.phase != GamePhase::Playing {
            return Ok(Vec::new());
        }
        let (entity, name) = {
            let Some(player) = self.player(sender) else {
                return Ok(Vec::new());
            };
            match win::winning_entity(&player.hand) {
                Some(e) => (e.to_string(), player.name.clone()),
                None => return Err(GameError::ClaimRejected),
            }
        };

        self.phase = GamePhase::Finished;
        self.winner = Some(sender);
        self.winner_name = Some(name.clone());
        self.winner_entity = Some(entity.clone());
        if let Some(p) = self.player_mut(sender) {
            p.score += 1;
        }

        tracing::info!(
            room = %self.room_id,
            winner = %sender,
            %entity,
            "win claim validated"
        );

        let mut out = vec![(
            Recipient::All,
            ServerMessage::Winner {
                player_id: sender,
                player_name: name,
                entity,
            },
        )];
        out.extend(self.broadcast_snapshot());
        Ok(out)
    }

    // -----------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------

    fn play_again(&mut self, sender: PlayerId) -> Result<Outbound, GameError> {
        if self.owner_id != Some(sender) {
            return Err(GameError::Unauthorized("start a new round"));
        }
        if self.phase != GamePhase::Finished {
            return Ok(Vec::new());
        }

        self.phase = GamePhase::Lobby;
        self.winner = None;
        self.winner_name = None;
        self.winner_entity = None;
        self.round += 1;
        for p in &mut self.players {
            p.hand.clear();
        }
        // Scores persist across rounds. Turn state is left stale; the
        // next deal rebuilds it wholesale.

        tracing::info!(room = %self.room_id, round = self.round, "room reset to lobby");
        Ok(self.broadcast_snapshot())
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_connected).count()
    }

    /// Whether the recorded owner is still a connected roster member.
    fn has_connected_owner(&self) -> bool {
        self.owner_id.is_some_and(|oid| {
            self.players.iter().any(|p| p.id == oid && p.is_connected)
        })
    }

    fn set_owner(&mut self, id: PlayerId) {
        self.owner_id = Some(id);
        for p in &mut self.players {
            p.is_owner = p.id == id;
        }
    }

    fn broadcast_snapshot(&self) -> Outbound {
        vec![(
            Recipient::All,
            ServerMessage::RoomState { state: self.snapshot() },
        )]
    }
}

fn sanitize_name(name: &str) -> String {
    let trimmed: String =
        name.trim().chars().take(settings::MAX_NAME_LEN).collect();
    if trimmed.is_empty() {
        "Player".to_string()
    } else {
        trimmed
    }
}

// =========================================================================
// Tests
// =========================================================================
