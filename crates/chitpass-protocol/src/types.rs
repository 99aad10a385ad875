//! Core protocol types for the chitpass wire format.
//!
//! Everything in this module travels on the wire as JSON. Client and
//! server messages are internally tagged objects such as `{"type":
//! "join", "name": "Ada"}`, with snake_case kinds and camelCase field
//! names,
//! which is what the browser client expects to parse.
//!
//! The one exception is [`Recipient`]: it never leaves the server. Game
//! handlers return `(Recipient, ServerMessage)` pairs and the hosting
//! layer fans them out to the right connections.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Player identity IS connection identity: the hosting layer mints a
/// `PlayerId` from the transport's connection id, and it stays valid for
/// as long as the player's roster record exists (which can outlive the
/// connection mid-game).
///
/// `#[serde(transparent)]` makes a `PlayerId(42)` serialize as just `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient: who should receive a message?
// ---------------------------------------------------------------------------

/// Specifies who should receive a server message.
///
/// Room handlers return `(Recipient, ServerMessage)` pairs; this enum
/// tells the hosting layer WHERE to deliver each one. Hand contents only
/// ever travel under [`Recipient::Player`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Send to every connected player in the room.
    All,

    /// Send to one specific player.
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// Game phase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a room.
///
/// A closed variant: every handler checks it at entry, so the full set
/// of legal transitions is auditable from the handlers alone:
///
/// ```text
/// lobby ──(start_game)──→ playing ──(claim_win)──→ finished
///   ↑                                                  │
///   └──────────────────(play_again)────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Lobby,
    Playing,
    Finished,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "lobby"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Entity list a fresh room starts with.
pub const DEFAULT_ENTITIES: [&str; 4] = ["Lion", "Tiger", "Elephant", "Monkey"];

/// How passing proceeds. `Auto` is persisted and broadcast but no handler
/// consults it; there is no server-side auto-advance timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassMode {
    #[default]
    Manual,
    Auto,
}

/// Room configuration negotiated in the lobby by the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    /// Display name for the room.
    pub room_name: String,
    /// Maximum concurrently-connected players, kept within 2..=8.
    pub max_players: usize,
    /// Entity names in play. Each entity contributes 4 matching chits
    /// per deal. The dealer may append placeholders if there are fewer
    /// names than players.
    pub entity_names: Vec<String>,
    /// Latent pass-mode flag (see [`PassMode`]).
    pub pass_mode: PassMode,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            room_name: "Char-Chitti Room".to_string(),
            max_players: 4,
            entity_names: DEFAULT_ENTITIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            pass_mode: PassMode::Manual,
        }
    }
}

/// A partial [`RoomSettings`] sent by the owner. Absent fields leave the
/// current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub room_name: Option<String>,
    pub max_players: Option<usize>,
    pub entity_names: Option<Vec<String>>,
    pub pass_mode: Option<PassMode>,
}

// ---------------------------------------------------------------------------
// Roster and snapshot
// ---------------------------------------------------------------------------

/// A player as seen in room snapshots.
///
/// The room keeps this same shape internally; the snapshot projection
/// redacts `hand` to empty before anything is broadcast. Hands reach
/// their owner only through [`ServerMessage::YourHand`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_owner: bool,
    pub is_connected: bool,
    pub hand: Vec<String>,
    pub score: u32,
}

/// The broadcastable projection of room state.
///
/// Same shape as the authoritative state except every hand is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStateView {
    pub room_id: String,
    pub settings: RoomSettings,
    pub players: Vec<Player>,
    pub phase: GamePhase,
    pub winner: Option<PlayerId>,
    pub winner_name: Option<String>,
    pub winner_entity: Option<String>,
    /// Round counter, starting at 1 and bumped by each `play_again`.
    pub round: u32,
    pub owner_id: Option<PlayerId>,
    /// Clockwise order fixed at deal time; empty before the first deal.
    pub player_order: Vec<PlayerId>,
    /// `player_order[current_turn_index]`, or null before any deal.
    pub current_turn_player_id: Option<PlayerId>,
    pub pass_round: u32,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Messages a client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Take a seat in the lobby under a display name.
    Join { name: String },

    /// Owner-only: merge a partial settings update.
    UpdateSettings { settings: SettingsPatch },

    /// Owner-only: shuffle, deal, and enter the playing phase.
    StartGame,

    /// Pass the chit at `chit_index` in the sender's hand to the next
    /// player clockwise.
    PassChit { chit_index: usize },

    /// Claim that the sender's hand is four matching chits.
    ClaimWin,

    /// Owner-only: return a finished room to the lobby.
    PlayAgain,
}

/// Messages the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Broadcast snapshot of the room with hands redacted.
    RoomState { state: RoomStateView },

    /// Unicast only: the recipient's own current hand.
    YourHand { hand: Vec<String> },

    /// A rejected action, reported only to the offender.
    Error { message: String },

    /// Advisory broadcast that a deal just happened.
    GameStarted,

    /// Broadcast when a win claim is validated.
    Winner {
        player_id: PlayerId,
        player_name: String,
        entity: String,
    },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Wire-shape tests.
    //!
    //! The browser client parses these messages by exact field name, so
    //! each kind gets a test pinning its JSON representation. A passing
    //! round trip is not enough; the tag and field spellings must match.

    use super::*;
    use serde_json::json;

    // =====================================================================
    // PlayerId
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_deserializes_from_plain_number() {
        let pid: PlayerId = serde_json::from_str("42").unwrap();
        assert_eq!(pid, PlayerId(42));
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    // =====================================================================
    // GamePhase / PassMode
    // =====================================================================

    #[test]
    fn test_game_phase_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&GamePhase::Lobby).unwrap(),
            "\"lobby\""
        );
        assert_eq!(
            serde_json::to_string(&GamePhase::Playing).unwrap(),
            "\"playing\""
        );
        assert_eq!(
            serde_json::to_string(&GamePhase::Finished).unwrap(),
            "\"finished\""
        );
    }

    #[test]
    fn test_pass_mode_serializes_lowercase_and_defaults_to_manual() {
        assert_eq!(
            serde_json::to_string(&PassMode::Manual).unwrap(),
            "\"manual\""
        );
        assert_eq!(serde_json::to_string(&PassMode::Auto).unwrap(), "\"auto\"");
        assert_eq!(PassMode::default(), PassMode::Manual);
    }

    // =====================================================================
    // Settings
    // =====================================================================

    #[test]
    fn test_room_settings_default_values() {
        let settings = RoomSettings::default();
        assert_eq!(settings.room_name, "Char-Chitti Room");
        assert_eq!(settings.max_players, 4);
        assert_eq!(
            settings.entity_names,
            vec!["Lion", "Tiger", "Elephant", "Monkey"]
        );
        assert_eq!(settings.pass_mode, PassMode::Manual);
    }

    #[test]
    fn test_room_settings_uses_camel_case_fields() {
        let json: serde_json::Value =
            serde_json::to_value(RoomSettings::default()).unwrap();
        assert_eq!(json["roomName"], "Char-Chitti Room");
        assert_eq!(json["maxPlayers"], 4);
        assert!(json["entityNames"].is_array());
        assert_eq!(json["passMode"], "manual");
    }

    #[test]
    fn test_settings_patch_missing_fields_deserialize_as_none() {
        let patch: SettingsPatch =
            serde_json::from_value(json!({ "maxPlayers": 6 })).unwrap();
        assert_eq!(patch.max_players, Some(6));
        assert_eq!(patch.room_name, None);
        assert_eq!(patch.entity_names, None);
        assert_eq!(patch.pass_mode, None);
    }

    // =====================================================================
    // ClientMessage: one shape test per kind
    // =====================================================================

    #[test]
    fn test_client_join_json_format() {
        let msg: ClientMessage =
            serde_json::from_value(json!({ "type": "join", "name": "Ada" }))
                .unwrap();
        assert_eq!(msg, ClientMessage::Join { name: "Ada".into() });

        let back: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(back["type"], "join");
        assert_eq!(back["name"], "Ada");
    }

    #[test]
    fn test_client_update_settings_json_format() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "update_settings",
            "settings": { "entityNames": ["Lion", "Tiger"] }
        }))
        .unwrap();
        match msg {
            ClientMessage::UpdateSettings { settings } => {
                assert_eq!(
                    settings.entity_names,
                    Some(vec!["Lion".to_string(), "Tiger".to_string()])
                );
            }
            other => panic!("expected UpdateSettings, got {other:?}"),
        }
    }

    #[test]
    fn test_client_start_game_json_format() {
        let msg: ClientMessage =
            serde_json::from_value(json!({ "type": "start_game" })).unwrap();
        assert_eq!(msg, ClientMessage::StartGame);
    }

    #[test]
    fn test_client_pass_chit_uses_camel_case_index() {
        let msg: ClientMessage = serde_json::from_value(
            json!({ "type": "pass_chit", "chitIndex": 2 }),
        )
        .unwrap();
        assert_eq!(msg, ClientMessage::PassChit { chit_index: 2 });

        let back: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(back["type"], "pass_chit");
        assert_eq!(back["chitIndex"], 2);
    }

    #[test]
    fn test_client_claim_win_and_play_again_round_trip() {
        for (msg, tag) in [
            (ClientMessage::ClaimWin, "claim_win"),
            (ClientMessage::PlayAgain, "play_again"),
        ] {
            let value: serde_json::Value = serde_json::to_value(&msg).unwrap();
            assert_eq!(value["type"], tag);
            let decoded: ClientMessage =
                serde_json::from_value(value).unwrap();
            assert_eq!(decoded, msg);
        }
    }

    // =====================================================================
    // ServerMessage
    // =====================================================================

    fn sample_view() -> RoomStateView {
        RoomStateView {
            room_id: "den-7".into(),
            settings: RoomSettings::default(),
            players: vec![Player {
                id: PlayerId(1),
                name: "Ada".into(),
                is_owner: true,
                is_connected: true,
                hand: vec![],
                score: 0,
            }],
            phase: GamePhase::Lobby,
            winner: None,
            winner_name: None,
            winner_entity: None,
            round: 1,
            owner_id: Some(PlayerId(1)),
            player_order: vec![],
            current_turn_player_id: None,
            pass_round: 0,
        }
    }

    #[test]
    fn test_server_room_state_json_format() {
        let msg = ServerMessage::RoomState { state: sample_view() };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "room_state");
        assert_eq!(json["state"]["roomId"], "den-7");
        assert_eq!(json["state"]["phase"], "lobby");
        assert_eq!(json["state"]["ownerId"], 1);
        assert!(json["state"]["winner"].is_null());
        assert!(json["state"]["currentTurnPlayerId"].is_null());
        assert_eq!(json["state"]["passRound"], 0);
        assert_eq!(json["state"]["round"], 1);
        assert_eq!(json["state"]["playerOrder"], json!([]));
        // Roster entries use camelCase too.
        assert_eq!(json["state"]["players"][0]["isOwner"], true);
        assert_eq!(json["state"]["players"][0]["isConnected"], true);
        assert_eq!(json["state"]["players"][0]["hand"], json!([]));
    }

    #[test]
    fn test_server_your_hand_json_format() {
        let msg = ServerMessage::YourHand {
            hand: vec!["Lion".into(), "Tiger".into()],
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "your_hand");
        assert_eq!(json["hand"], json!(["Lion", "Tiger"]));
    }

    #[test]
    fn test_server_error_json_format() {
        let msg = ServerMessage::Error { message: "room is full".into() };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "room is full");
    }

    #[test]
    fn test_server_game_started_json_format() {
        let json: serde_json::Value =
            serde_json::to_value(ServerMessage::GameStarted).unwrap();
        assert_eq!(json, json!({ "type": "game_started" }));
    }

    #[test]
    fn test_server_winner_json_format() {
        let msg = ServerMessage::Winner {
            player_id: PlayerId(3),
            player_name: "Bo".into(),
            entity: "Tiger".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "winner");
        assert_eq!(json["playerId"], 3);
        assert_eq!(json["playerName"], "Bo");
        assert_eq!(json["entity"], "Tiger");
    }

    #[test]
    fn test_server_message_round_trips() {
        let messages = vec![
            ServerMessage::RoomState { state: sample_view() },
            ServerMessage::YourHand { hand: vec!["Lion".into()] },
            ServerMessage::Error { message: "nope".into() },
            ServerMessage::GameStarted,
            ServerMessage::Winner {
                player_id: PlayerId(9),
                player_name: "Cy".into(),
                entity: "Monkey".into(),
            },
        ];
        for msg in messages {
            let bytes = serde_json::to_vec(&msg).unwrap();
            let decoded: ServerMessage =
                serde_json::from_slice(&bytes).unwrap();
            assert_eq!(decoded, msg);
        }
    }

    // =====================================================================
    // Error cases: malformed input
    // =====================================================================

    #[test]
    fn test_decode_garbage_returns_error() {
        let garbage = b"not json at all";
        let result: Result<ClientMessage, _> =
            serde_json::from_slice(garbage);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_kind_returns_error() {
        let unknown = r#"{"type": "teleport", "to": "the moon"}"#;
        let result: Result<ClientMessage, _> =
            serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_required_field_returns_error() {
        // pass_chit without its index must not decode.
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type": "pass_chit"}"#);
        assert!(result.is_err());
    }
}
