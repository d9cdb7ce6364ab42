use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::board::{Board, Mark};

/// Opaque participant identifier supplied by the boundary. The engine never
/// interprets it beyond equality.
pub type PlayerId = Uuid;

/// Positive, strictly increasing in creation order. Minted by the registry.
pub type GameId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    InProgress,
    Player1Won,
    Player2Won,
    Tie,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// One match between two participants. Created by `start_new_game`, mutated
/// by `join_game` and `make_move`, never deleted: a finished game stays
/// queryable as a historical record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub player1: PlayerId,
    pub player2: Option<PlayerId>,
    pub board: Board,
    pub status: GameStatus,
    /// Undetermined until a second player joins; fixed for the rest of the
    /// game once drawn.
    pub is_player1_first: Option<bool>,
    pub ply_count: u8,
}

impl Game {
    pub(crate) fn new(id: GameId, player1: PlayerId) -> Self {
        Game {
            id,
            player1,
            player2: None,
            board: Board::new(),
            status: GameStatus::InProgress,
            is_player1_first: None,
            ply_count: 0,
        }
    }

    /// The mark a participant plays with, if they are seated in this game.
    pub fn mark_of(&self, player: PlayerId) -> Option<Mark> {
        if player == self.player1 {
            Some(Mark::X)
        } else if self.player2 == Some(player) {
            Some(Mark::O)
        } else {
            None
        }
    }

    /// Whose move it is. None unless the game is in progress with both
    /// players seated. player1 moves on even plies exactly when they were
    /// drawn as first mover.
    pub fn turn_owner(&self) -> Option<PlayerId> {
        if self.status.is_terminal() {
            return None;
        }
        let player2 = self.player2?;
        let is_player1_first = self.is_player1_first?;
        if (self.ply_count % 2 == 0) == is_player1_first {
            Some(self.player1)
        } else {
            Some(player2)
        }
    }
}
