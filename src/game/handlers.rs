use anyhow::Result;
use serde_json::json;

use crate::app_state::AppState;
use crate::game::error::GameError;
use crate::game::models::{GameId, PlayerId};

use axum::extract::ws::{Message, WebSocket};
use std::sync::Arc;
use tracing::{error, info};

async fn send_json(socket: &mut WebSocket, value: serde_json::Value) -> Result<()> {
    socket.send(Message::Text(value.to_string().into())).await?;
    Ok(())
}

async fn send_error(socket: &mut WebSocket, err: GameError) -> Result<()> {
    error!("❌ Request rejected: {}", err);
    send_json(
        socket,
        json!({ "type": "ERROR", "code": err.code(), "message": err.to_string() }),
    )
    .await
}

/// Broadcasts the current snapshot of a game to every subscribed socket.
async fn broadcast_update(state: &Arc<AppState>, game_id: GameId) {
    let registry = state.registry.read().await;
    if let Some(game) = registry.game(game_id) {
        let _ = state.tx.send((game_id, game.clone()));
    }
}

pub async fn handle_start_game(
    player_id: PlayerId,
    state: &Arc<AppState>,
    socket: &mut WebSocket,
) -> Result<Option<GameId>> {
    info!("📥 START_GAME request - Player: {}", player_id);

    let started = state.registry.write().await.start_new_game(player_id);
    match started {
        Ok(game_id) => {
            info!("✅ Game {} started by {}", game_id, player_id);
            send_json(socket, json!({ "type": "GAME_STARTED", "game_id": game_id })).await?;
            broadcast_update(state, game_id).await;
            Ok(Some(game_id))
        }
        Err(err) => {
            send_error(socket, err).await?;
            Ok(None)
        }
    }
}

pub async fn handle_join_game(
    game_id: GameId,
    player_id: PlayerId,
    state: &Arc<AppState>,
    socket: &mut WebSocket,
) -> Result<Option<GameId>> {
    info!("📥 JOIN_GAME request - Game ID: {}, Player: {}", game_id, player_id);

    let joined = state.registry.write().await.join_game(game_id, player_id);
    match joined {
        Ok(()) => {
            info!("✅ Player {} joined game {}", player_id, game_id);
            send_json(
                socket,
                json!({ "type": "JOIN_SUCCESS", "game_id": game_id, "player_id": player_id }),
            )
            .await?;
            broadcast_update(state, game_id).await;
            Ok(Some(game_id))
        }
        Err(err) => {
            send_error(socket, err).await?;
            Ok(None)
        }
    }
}

pub async fn handle_make_move(
    game_id: GameId,
    player_id: PlayerId,
    row: usize,
    col: usize,
    state: &Arc<AppState>,
    socket: &mut WebSocket,
) -> Result<Option<GameId>> {
    info!(
        "📥 MAKE_MOVE request - Game ID: {}, Player: {}, Position: ({}, {})",
        game_id, player_id, row, col
    );

    let moved = state
        .registry
        .write()
        .await
        .make_move(game_id, row, col, player_id);
    match moved {
        Ok(()) => {
            info!(
                "✅ Move applied: {} at ({}, {}) in game {}",
                player_id, row, col, game_id
            );
            broadcast_update(state, game_id).await;
            Ok(Some(game_id))
        }
        Err(err) => {
            send_error(socket, err).await?;
            Ok(None)
        }
    }
}

pub async fn handle_set_paused(
    player_id: PlayerId,
    state: &Arc<AppState>,
    socket: &mut WebSocket,
) -> Result<()> {
    info!("📥 SET_PAUSED request - Player: {}", player_id);

    let mut registry = state.registry.write().await;
    match registry.set_is_paused(player_id) {
        Ok(()) => {
            let is_paused = registry.is_paused();
            info!("✅ Pause flag toggled, now {}", is_paused);
            drop(registry);
            send_json(socket, json!({ "type": "PAUSE_TOGGLED", "is_paused": is_paused })).await
        }
        Err(err) => {
            drop(registry);
            send_error(socket, err).await
        }
    }
}

pub async fn handle_get_game(
    game_id: GameId,
    state: &Arc<AppState>,
    socket: &mut WebSocket,
) -> Result<Option<GameId>> {
    let registry = state.registry.read().await;
    match registry.game(game_id) {
        Some(game) => {
            let snapshot = json!({ "type": "UPDATE_STATE", "game_id": game_id, "game": game });
            drop(registry);
            send_json(socket, snapshot).await?;
            Ok(Some(game_id))
        }
        None => {
            drop(registry);
            send_error(socket, GameError::GameNotFound).await?;
            Ok(None)
        }
    }
}

pub async fn handle_get_active_game(
    player_id: PlayerId,
    state: &Arc<AppState>,
    socket: &mut WebSocket,
) -> Result<()> {
    let game_id = state.registry.read().await.active_game_of(player_id);
    send_json(
        socket,
        json!({ "type": "ACTIVE_GAME", "player_id": player_id, "game_id": game_id }),
    )
    .await
}

pub async fn handle_get_stats(state: &Arc<AppState>, socket: &mut WebSocket) -> Result<()> {
    let registry = state.registry.read().await;
    let stats = json!({
        "type": "STATS",
        "game_count": registry.game_count(),
        "is_paused": registry.is_paused(),
        "owner": registry.owner(),
    });
    drop(registry);
    send_json(socket, stats).await
}
