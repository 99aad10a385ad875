//! Room actor: an isolated Tokio task that owns one `RoomSession`.
//!
//! Each room runs in its own task and the outside world reaches it only
//! through an mpsc channel. The channel IS the concurrency model: events
//! for a room are processed one at a time, strictly in arrival order,
//! which is exactly the serialization the game rules rely on for turn
//! enforcement and first-claim-wins. Different rooms are independent
//! tasks and run concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use chitpass_protocol::{ClientMessage, PlayerId, Recipient, ServerMessage};
use chitpass_room::{Outbound, RoomSession};
use tokio::sync::mpsc;

use crate::ServerError;

/// Channel sender delivering outbound messages to one connection's
/// writer task.
pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

/// Events sent to a room actor through its channel, one per substrate
/// notification the core expects.
pub(crate) enum RoomEvent {
    /// A connection addressed to this room opened.
    Opened {
        player: PlayerId,
        outbound: OutboundSender,
    },
    /// A connection closed (cleanly or not).
    Closed { player: PlayerId },
    /// A decoded inbound message from a connection.
    Inbound {
        player: PlayerId,
        msg: ClientMessage,
    },
}

/// Handle to a running room actor. Cheap to clone; the registry and
/// every connection handler for the room hold one.
#[derive(Clone)]
pub struct RoomHandle {
    code: Arc<str>,
    sender: mpsc::Sender<RoomEvent>,
}

impl RoomHandle {
    /// The room code this handle addresses.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Announces an opened connection and registers its outbound channel.
    pub async fn opened(
        &self,
        player: PlayerId,
        outbound: OutboundSender,
    ) -> Result<(), ServerError> {
        self.send(RoomEvent::Opened { player, outbound }).await
    }

    /// Announces a closed connection.
    pub async fn closed(&self, player: PlayerId) -> Result<(), ServerError> {
        self.send(RoomEvent::Closed { player }).await
    }

    /// Delivers a decoded inbound message.
    pub async fn deliver(
        &self,
        player: PlayerId,
        msg: ClientMessage,
    ) -> Result<(), ServerError> {
        self.send(RoomEvent::Inbound { player, msg }).await
    }

    async fn send(&self, event: RoomEvent) -> Result<(), ServerError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| ServerError::RoomUnavailable(self.code.to_string()))
    }
}

/// The actor state: the authoritative session plus the outbound channel
/// of every live connection in the room.
struct RoomActor {
    session: RoomSession,
    senders: HashMap<PlayerId, OutboundSender>,
    receiver: mpsc::Receiver<RoomEvent>,
}

impl RoomActor {
    /// Processes events until every handle is dropped.
    async fn run(mut self) {
        tracing::info!(room = %self.session.room_id(), "room actor started");

        while let Some(event) = self.receiver.recv().await {
            match event {
                RoomEvent::Opened { player, outbound } => {
                    self.senders.insert(player, outbound);
                    let out = self.session.connection_opened(player);
                    self.dispatch(out);
                }
                RoomEvent::Closed { player } => {
                    self.senders.remove(&player);
                    let out = self.session.connection_closed(player);
                    self.dispatch(out);
                }
                RoomEvent::Inbound { player, msg } => {
                    let out = self.session.handle_message(player, msg);
                    self.dispatch(out);
                }
            }
        }

        tracing::info!(room = %self.session.room_id(), "room actor stopped");
    }

    /// Fans a batch of routed messages out to connection writers.
    /// Channels of connections that died mid-dispatch are silently
    /// skipped; their Closed event is already in the queue.
    fn dispatch(&self, msgs: Outbound) {
        for (recipient, msg) in msgs {
            match recipient {
                Recipient::All => {
                    for tx in self.senders.values() {
                        let _ = tx.send(msg.clone());
                    }
                }
                Recipient::Player(player) => {
                    if let Some(tx) = self.senders.get(&player) {
                        let _ = tx.send(msg);
                    }
                }
            }
        }
    }
}

/// Spawns the actor task for a room and returns a handle to it.
///
/// `channel_size` bounds the command queue: when a room falls behind,
/// senders wait instead of growing the queue without limit.
pub(crate) fn spawn_room(code: &str, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        session: RoomSession::new(code),
        senders: HashMap::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RoomHandle { code: Arc::from(code), sender: tx }
}
