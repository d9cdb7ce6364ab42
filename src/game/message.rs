use serde::Deserialize;

use super::models::{GameId, PlayerId};

/// Incoming WebSocket messages, tagged by "type". The player_id is the
/// opaque caller identity the engine trusts as-is.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    StartGame {
        player_id: PlayerId,
    },
    JoinGame {
        game_id: GameId,
        player_id: PlayerId,
    },
    MakeMove {
        game_id: GameId,
        player_id: PlayerId,
        row: usize,
        col: usize,
    },
    SetPaused {
        player_id: PlayerId,
    },
    GetGame {
        game_id: GameId,
    },
    GetActiveGame {
        player_id: PlayerId,
    },
    GetStats,
}
