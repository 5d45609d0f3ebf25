use crate::game_manager::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use gambit_core::session::SessionConfig;
use shared::{ClientMessage, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Forward queued server messages to the socket
    let forward = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(err) => {
                    tracing::error!(error = %err, "Failed to encode server message");
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let player_id = uuid::Uuid::new_v4().to_string();
    state.add_player(player_id.clone(), tx);

    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        if !state.check_rate_limit(&player_id) {
            tracing::warn!(player_id = %player_id, "Rate limit exceeded, dropping message");
            continue;
        }
        match serde_json::from_str::<ClientMessage>(&text) {
            Ok(client_msg) => dispatch(&state, &player_id, client_msg).await,
            Err(err) => {
                tracing::debug!(player_id = %player_id, error = %err, "Unparseable client message");
                state.send(&player_id, ServerMessage::Error(format!("bad message: {err}")));
            }
        }
    }

    // Client disconnected
    state.remove_player(&player_id).await;
    forward.abort();
}

pub async fn dispatch(state: &Arc<AppState>, player_id: &str, msg: ClientMessage) {
    match msg {
        ClientMessage::NewGame {
            color,
            difficulty,
            time_control,
            fen,
        } => {
            let config = SessionConfig {
                user_color: color,
                difficulty,
                time_control,
                start_fen: fen,
            };
            state.new_game(player_id, config).await;
        }
        ClientMessage::MakeMove { from, to } => state.handle_move(player_id, &from, &to).await,
        ClientMessage::Resign => state.handle_resign(player_id).await,
        ClientMessage::OfferDraw => state.handle_draw_offer(player_id).await,
        ClientMessage::LeaveGame => state.leave_game(player_id).await,
        ClientMessage::History => state.handle_history(player_id).await,
    }
}
