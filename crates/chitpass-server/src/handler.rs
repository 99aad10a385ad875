//! Per-connection handler: ties one WebSocket to one room actor.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Mint the player id from the connection id
//!   2. Register with the room named by the upgrade path (creating it
//!      on first contact)
//!   3. Spawn a writer task that drains room output onto the socket
//!   4. Loop: receive frames → decode → deliver to the room actor
//!
//! Undecodable payloads never reach the room: they come straight back
//! to the sender as an `error` message and the connection lives on.

use std::sync::Arc;

use chitpass_protocol::{ClientMessage, Codec, JsonCodec, PlayerId, ServerMessage};
use chitpass_transport::{Connection, WebSocketConnection};

use crate::registry::RoomRegistry;
use crate::ServerError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    registry: Arc<RoomRegistry>,
    codec: JsonCodec,
) -> Result<(), ServerError> {
    let player_id = PlayerId(conn.id().into_inner());
    let room_code = conn.room_code().to_string();
    tracing::debug!(%player_id, room = %room_code, "handling new connection");

    let handle = registry.connect(&room_code).await;
    let (out_tx, mut out_rx) =
        tokio::sync::mpsc::unbounded_channel::<ServerMessage>();

    // Writer task: encodes and sends everything the room addresses to
    // this connection. Ends when the channel closes (room actor dropped
    // its sender and out_tx is gone) or the socket breaks.
    let writer_conn = conn.clone();
    let writer = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let bytes = match codec.encode(&msg) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode outbound message");
                    continue;
                }
            };
            if writer_conn.send(&bytes).await.is_err() {
                break;
            }
        }
    });

    if handle.opened(player_id, out_tx.clone()).await.is_err() {
        registry.disconnect(&room_code).await;
        writer.abort();
        return Err(ServerError::RoomUnavailable(room_code));
    }

    // Read loop: one decoded message per frame, delivered in order.
    loop {
        match conn.recv().await {
            Ok(Some(data)) => {
                match codec.decode::<ClientMessage>(&data) {
                    Ok(msg) => {
                        if handle.deliver(player_id, msg).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(
                            %player_id,
                            error = %e,
                            "undecodable payload"
                        );
                        let _ = out_tx.send(ServerMessage::Error {
                            message: format!("invalid message: {e}"),
                        });
                    }
                }
            }
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        }
    }

    // Tell the room, release the registry slot, then let the writer
    // flush whatever the close produced before dropping the socket.
    let _ = handle.closed(player_id).await;
    registry.disconnect(&room_code).await;
    drop(out_tx);
    drop(handle);
    let _ = writer.await;
    let _ = conn.close().await;

    Ok(())
}
