//! WebSocket transport implementation using `tokio-tungstenite`.
//!
//! The room code a client wants to join rides on the upgrade request:
//! connections are accepted on `/room/{code}` and rejected otherwise.
//! Send and receive halves are split so one task can drain outbound
//! messages while another blocks on inbound frames.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::handshake::server::{
    ErrorResponse, Request, Response,
};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// Extracts the room code from an upgrade-request path.
///
/// Accepts exactly `/room/{code}` with a non-empty code. Anything else
/// (no code, extra segments, wrong prefix) is rejected so a typo never
/// lands a player in an accidental room.
fn room_code_from_path(path: &str) -> Option<&str> {
    let mut parts = path.trim_matches('/').split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("room"), Some(code), None) if !code.is_empty() => Some(code),
        _ => None,
    }
}

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self { listener })
    }

    /// Returns the local address the listener is bound to.
    ///
    /// Useful when binding to port 0 and needing the assigned port.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        // The header callback runs during the upgrade handshake. It is
        // the only point where the request path is visible, so the room
        // code must be captured here.
        let mut room_code: Option<String> = None;
        let ws = tokio_tungstenite::accept_hdr_async(
            stream,
            |req: &Request, resp: Response| {
                match room_code_from_path(req.uri().path()) {
                    Some(code) => {
                        room_code = Some(code.to_string());
                        Ok(resp)
                    }
                    None => {
                        let mut err = ErrorResponse::new(Some(
                            "expected path /room/{code}".to_string(),
                        ));
                        *err.status_mut() = StatusCode::BAD_REQUEST;
                        Err(err)
                    }
                }
            },
        )
        .await
        .map_err(|e| match e {
            tokio_tungstenite::tungstenite::Error::Http(_) => {
                TransportError::BadRequest(
                    "upgrade request did not match /room/{code}".into(),
                )
            }
            e => TransportError::AcceptFailed(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                e,
            )),
        })?;

        let room_code = room_code.ok_or_else(|| {
            TransportError::BadRequest("missing room code".into())
        })?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, room = %room_code, "accepted WebSocket connection");

        let (sink, stream) = ws.split();
        Ok(WebSocketConnection {
            id,
            room_code: Arc::from(room_code),
            sink: Arc::new(Mutex::new(sink)),
            stream: Arc::new(Mutex::new(stream)),
        })
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A single room-scoped WebSocket connection.
///
/// Cloning is cheap and clones share the underlying socket: the send and
/// receive halves sit behind separate locks, so a writer task can push
/// frames while a reader task is parked in [`recv`](Connection::recv).
#[derive(Clone)]
pub struct WebSocketConnection {
    id: ConnectionId,
    room_code: Arc<str>,
    sink: Arc<Mutex<SplitSink<WsStream, Message>>>,
    stream: Arc<Mutex<SplitStream<WsStream>>>,
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = Message::Binary(data.to_vec().into());
        self.sink.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        loop {
            let msg = self.stream.lock().await.next().await;
            match msg {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn room_code(&self) -> &str {
        &self.room_code
    }
}
