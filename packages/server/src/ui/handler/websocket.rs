//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{PlayerId, ServerEvent},
    ui::state::AppState,
};

use super::command::handle_client_text;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // 接続ごとに新しいハンドルを発行する（再接続も別プレイヤー扱い）
    let player_id = PlayerId::generate();
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    state
        .message_pusher
        .register_client(player_id.clone(), tx)
        .await;
    tracing::info!("Client '{}' connected", player_id);

    if let Err(e) = state
        .message_pusher
        .push_to(
            &player_id,
            &ServerEvent::ConnectionReady {
                player_id: player_id.clone(),
            },
        )
        .await
    {
        tracing::warn!("Failed to send connection.ready to '{}': {}", player_id, e);
    }

    let mut send_task = pusher_loop(rx, sender);

    let recv_state = state.clone();
    let recv_player = player_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    handle_client_text(&recv_state, &recv_player, text.as_str()).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", recv_player);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // 切断は退出と同じ扱い
    state.leave_room_usecase.execute(&player_id).await;
    state.message_pusher.unregister_client(&player_id).await;
    tracing::info!("Client '{}' disconnected", player_id);
}
