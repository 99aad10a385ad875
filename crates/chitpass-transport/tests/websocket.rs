//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener and client to verify that bytes flow
//! both ways, that the room code is extracted from the upgrade path,
//! and that malformed upgrade requests are rejected.

#[cfg(feature = "websocket")]
mod websocket {
    use chitpass_transport::{Connection, Transport, TransportError, WebSocketTransport};
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds a transport on a random port and returns it with its address.
    async fn bind_transport() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport
            .local_addr()
            .expect("should have local addr")
            .to_string();
        (transport, addr)
    }

    async fn connect_client(addr: &str, room: &str) -> ClientWs {
        let url = format!("ws://{addr}/room/{room}");
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("client should connect");
        ws
    }

    #[tokio::test]
    async fn test_accept_extracts_room_code_and_moves_bytes() {
        let (mut transport, addr) = bind_transport().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });
        let mut client = connect_client(&addr, "tiger-den").await;
        let conn = server_handle.await.expect("task should complete");

        assert!(conn.id().into_inner() > 0);
        assert_eq!(conn.room_code(), "tiger-den");

        // Server sends, client receives.
        conn.send(b"hello from server").await.expect("send");
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"hello from server");

        // Client sends, server receives.
        client
            .send(Message::Binary(b"hello from client".to_vec().into()))
            .await
            .expect("client send");
        let received = conn.recv().await.expect("recv");
        assert_eq!(received.as_deref(), Some(&b"hello from client"[..]));
    }

    #[tokio::test]
    async fn test_text_frames_are_received_as_bytes() {
        // Browser clients send JSON as text frames; the transport must
        // hand them up as bytes just like binary frames.
        let (mut transport, addr) = bind_transport().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });
        let mut client = connect_client(&addr, "r1").await;
        let conn = server_handle.await.unwrap();

        client
            .send(Message::Text(r#"{"type":"claim_win"}"#.into()))
            .await
            .expect("client send");
        let received = conn.recv().await.expect("recv").expect("some");
        assert_eq!(received, br#"{"type":"claim_win"}"#);
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_clean_close() {
        let (mut transport, addr) = bind_transport().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });
        let mut client = connect_client(&addr, "r2").await;
        let conn = server_handle.await.unwrap();

        client.close(None).await.expect("client close");
        let received = conn.recv().await.expect("recv should not error");
        assert!(received.is_none(), "clean close should yield None");
    }

    #[tokio::test]
    async fn test_upgrade_without_room_code_is_rejected() {
        let (mut transport, addr) = bind_transport().await;

        let server_handle =
            tokio::spawn(async move { transport.accept().await });

        // No /room/{code} path, so the handshake must fail on both ends.
        let client_result =
            tokio_tungstenite::connect_async(format!("ws://{addr}/nope"))
                .await;
        assert!(client_result.is_err(), "client handshake should fail");

        let server_result = server_handle.await.unwrap();
        assert!(
            matches!(server_result, Err(TransportError::BadRequest(_))),
            "server should report a bad request"
        );
    }
}
