use thiserror::Error;

/// Every way a registry operation can be rejected. Each variant corresponds
/// to exactly one violated precondition, and a rejected operation leaves all
/// registry and game state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("registry is paused")]
    Paused,
    #[error("must be owner to do this op")]
    NotOwner,
    #[error("player already has an active game")]
    AlreadyInGame,
    #[error("game not found")]
    GameNotFound,
    #[error("game already has two players")]
    GameFull,
    #[error("cannot join your own game")]
    CannotJoinOwnGame,
    #[error("game is already finished")]
    GameFinished,
    #[error("waiting for a second player")]
    GameNotStarted,
    #[error("not your turn")]
    NotYourTurn,
    #[error("coordinates out of bounds")]
    OutOfRange,
    #[error("cell already taken")]
    CellOccupied,
}

impl GameError {
    /// Stable machine-readable code surfaced in ERROR messages.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Paused => "PAUSED",
            GameError::NotOwner => "NOT_OWNER",
            GameError::AlreadyInGame => "ALREADY_IN_GAME",
            GameError::GameNotFound => "GAME_NOT_FOUND",
            GameError::GameFull => "GAME_FULL",
            GameError::CannotJoinOwnGame => "CANNOT_JOIN_OWN_GAME",
            GameError::GameFinished => "GAME_FINISHED",
            GameError::GameNotStarted => "GAME_NOT_STARTED",
            GameError::NotYourTurn => "NOT_YOUR_TURN",
            GameError::OutOfRange => "OUT_OF_RANGE",
            GameError::CellOccupied => "CELL_OCCUPIED",
        }
    }
}
