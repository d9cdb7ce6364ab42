use crate::app_state::AppState;
use crate::game::handlers::{
    handle_get_active_game, handle_get_game, handle_get_stats, handle_join_game, handle_make_move,
    handle_set_paused, handle_start_game,
};
use crate::game::message::ClientMessage;
use crate::game::models::GameId;

use anyhow::Result;
use axum::extract::{State, WebSocketUpgrade};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

#[axum::debug_handler]
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl axum::response::IntoResponse {
    info!("🔗 WebSocket connection attempt received!");

    ws.on_upgrade(move |socket| async move {
        info!("✅ WebSocket upgrade successful.");
        if let Err(e) = handle_socket(socket, state).await {
            error!("❌ WebSocket processing failed: {}", e);
        }
    })
}

async fn handle_socket(
    mut socket: axum::extract::ws::WebSocket,
    state: Arc<AppState>,
) -> Result<()> {
    let mut rx = state.tx.subscribe();
    // Updates are forwarded only for the game this socket last touched.
    let mut subscribed_game_id: Option<GameId> = None;

    info!("✅ WebSocket connection established.");

    loop {
        tokio::select! {
            Some(Ok(msg)) = socket.recv() => {
                match msg {
                    axum::extract::ws::Message::Text(text) => {
                        info!("📩 Received WebSocket message: {}", text);

                        let parsed: ClientMessage = match serde_json::from_str(&text) {
                            Ok(message) => message,
                            Err(e) => {
                                error!("❌ Failed to parse WebSocket message: {}", e);
                                let reply = json!({
                                    "type": "ERROR",
                                    "code": "BAD_MESSAGE",
                                    "message": e.to_string()
                                });
                                socket
                                    .send(axum::extract::ws::Message::Text(reply.to_string().into()))
                                    .await?;
                                continue;
                            }
                        };

                        match parsed {
                            ClientMessage::StartGame { player_id } => {
                                if let Some(game_id) =
                                    handle_start_game(player_id, &state, &mut socket).await?
                                {
                                    subscribed_game_id = Some(game_id);
                                }
                            }
                            ClientMessage::JoinGame { game_id, player_id } => {
                                if let Some(game_id) =
                                    handle_join_game(game_id, player_id, &state, &mut socket).await?
                                {
                                    subscribed_game_id = Some(game_id);
                                }
                            }
                            ClientMessage::MakeMove { game_id, player_id, row, col } => {
                                let handled = handle_make_move(
                                    game_id, player_id, row, col, &state, &mut socket,
                                )
                                .await?;
                                if subscribed_game_id.is_none() {
                                    subscribed_game_id = handled;
                                }
                            }
                            ClientMessage::SetPaused { player_id } => {
                                handle_set_paused(player_id, &state, &mut socket).await?;
                            }
                            ClientMessage::GetGame { game_id } => {
                                if let Some(game_id) =
                                    handle_get_game(game_id, &state, &mut socket).await?
                                {
                                    subscribed_game_id = Some(game_id);
                                }
                            }
                            ClientMessage::GetActiveGame { player_id } => {
                                handle_get_active_game(player_id, &state, &mut socket).await?;
                            }
                            ClientMessage::GetStats => {
                                handle_get_stats(&state, &mut socket).await?;
                            }
                        }
                    }
                    axum::extract::ws::Message::Ping(data) => {
                        socket.send(axum::extract::ws::Message::Pong(data)).await?;
                    }
                    axum::extract::ws::Message::Pong(_) => {}
                    axum::extract::ws::Message::Close(reason) => {
                        info!("❌ WebSocket closed: {:?}", reason);
                        break;
                    }
                    _ => error!("⚠️ Received unexpected WebSocket message."),
                }
            }

            Ok((game_id, game)) = rx.recv() => {
                if subscribed_game_id == Some(game_id) {
                    let game_update = json!({
                        "type": "UPDATE_STATE",
                        "game_id": game_id,
                        "game": game
                    });

                    info!("📤 Sending WebSocket update for game {}", game_id);
                    if let Err(e) = socket
                        .send(axum::extract::ws::Message::Text(game_update.to_string().into()))
                        .await
                    {
                        error!("❌ Failed to send game update: {}", e);
                    }
                }
            }
            else => {
                error!("❌ WebSocket connection lost unexpectedly.");
                break;
            }
        }
    }

    info!("WebSocket closed. Cleaning up.");
    Ok(())
}
