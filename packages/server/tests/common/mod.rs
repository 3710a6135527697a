//! Helpers for end-to-end tests against an in-process server.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use doodlerush_server::{
    config::GameConfig,
    infrastructure::message_pusher::WebSocketMessagePusher,
    ui::{AppState, Server},
};
use doodlerush_shared::time::SystemClock;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Server bound to an ephemeral port, stopped on drop
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(GameConfig::default()).await
    }

    pub async fn start_with(config: GameConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let state = AppState::in_memory(
            config,
            Arc::new(WebSocketMessagePusher::default()),
            Arc::new(SystemClock),
        );
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(Server::new(state).serve(listener, async {
            let _ = rx.await;
        }));

        TestServer {
            addr,
            shutdown: Some(tx),
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// WebSocket client speaking the `{event, payload}` protocol
pub struct TestClient {
    pub player_id: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect and wait for `connection.ready`
    pub async fn connect(server: &TestServer) -> Self {
        let (stream, _) = connect_async(server.ws_url())
            .await
            .expect("Failed to connect");
        let mut client = TestClient {
            player_id: String::new(),
            stream,
        };
        let ready = client.expect("connection.ready").await;
        client.player_id = ready["playerId"]
            .as_str()
            .expect("connection.ready without playerId")
            .to_string();
        client
    }

    pub async fn send(&mut self, event: &str, payload: Value) {
        let frame = json!({ "event": event, "payload": payload });
        self.send_raw(&frame.to_string()).await;
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.stream
            .send(Message::text(text.to_string()))
            .await
            .expect("Failed to send frame");
    }

    /// Next event as `{event, payload}`
    pub async fn recv(&mut self) -> Value {
        loop {
            let next = tokio::time::timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("Timed out waiting for a frame")
                .expect("Connection closed")
                .expect("WebSocket error");
            if let Message::Text(text) = next {
                return serde_json::from_str(text.as_str()).expect("Server sent invalid JSON");
            }
        }
    }

    /// Skip frames until `event` arrives and return its payload
    pub async fn expect(&mut self, event: &str) -> Value {
        loop {
            let frame = self.recv().await;
            if frame["event"] == event {
                return frame["payload"].clone();
            }
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

/// Host creates a room and the others join it; returns the room code
pub async fn open_room(host: &mut TestClient, guests: &mut [&mut TestClient]) -> String {
    host.send("room.create", json!({ "name": "host" })).await;
    let created = host.expect("room.created").await;
    let code = created["roomCode"].as_str().expect("roomCode").to_string();

    for (index, guest) in guests.iter_mut().enumerate() {
        guest
            .send(
                "room.join",
                json!({ "code": code, "name": format!("guest{}", index + 1) }),
            )
            .await;
        guest.expect("room.joined").await;
    }
    code
}
