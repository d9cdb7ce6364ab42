use std::collections::HashMap;

use rand::rngs::OsRng;
use rand::Rng;
use tracing::debug;

use crate::game::board::{Mark, Outcome};
use crate::game::error::GameError;
use crate::game::models::{Game, GameId, GameStatus, PlayerId};

/// Source of the first-mover coin flip drawn once per game at join time.
/// Injected at registry construction so tests can fix the outcome.
pub trait FirstMoverSource: Send + Sync {
    fn coin_flip(&mut self) -> bool;
}

/// Default source backed by the operating-system RNG.
pub struct OsFirstMover;

impl FirstMoverSource for OsFirstMover {
    fn coin_flip(&mut self) -> bool {
        OsRng.gen()
    }
}

/// Owns every game plus the cross-cutting bookkeeping: the participant to
/// active-game mapping, the id counter, the pause flag and the owner
/// identity. All mutation goes through the four operations below, each of
/// which either fully applies or rejects with a single error and no effects.
pub struct GameRegistry {
    owner: PlayerId,
    games: HashMap<GameId, Game>,
    active_game: HashMap<PlayerId, GameId>,
    game_count: u64,
    is_paused: bool,
    first_mover: Box<dyn FirstMoverSource>,
}

impl GameRegistry {
    pub fn new(owner: PlayerId) -> Self {
        Self::with_first_mover(owner, Box::new(OsFirstMover))
    }

    pub fn with_first_mover(owner: PlayerId, first_mover: Box<dyn FirstMoverSource>) -> Self {
        GameRegistry {
            owner,
            games: HashMap::new(),
            active_game: HashMap::new(),
            game_count: 0,
            is_paused: false,
            first_mover,
        }
    }

    /// Creates a fresh game with the caller seated as player1 and returns
    /// its id. Ids start at 1 and increase by one per game ever created.
    pub fn start_new_game(&mut self, caller: PlayerId) -> Result<GameId, GameError> {
        self.ensure_not_paused()?;
        if self.active_game.contains_key(&caller) {
            debug!(%caller, "start rejected: caller already has an active game");
            return Err(GameError::AlreadyInGame);
        }

        self.game_count += 1;
        let game_id = self.game_count;
        self.games.insert(game_id, Game::new(game_id, caller));
        self.active_game.insert(caller, game_id);

        debug!(%caller, game_id, "new game started");
        Ok(game_id)
    }

    /// Seats the caller as player2 and draws which side moves first. The
    /// coin flip happens only after every precondition has passed, so a
    /// rejected join observes nothing.
    pub fn join_game(&mut self, game_id: GameId, caller: PlayerId) -> Result<(), GameError> {
        self.ensure_not_paused()?;
        let game = self.games.get_mut(&game_id).ok_or(GameError::GameNotFound)?;
        if game.player2.is_some() {
            debug!(%caller, game_id, "join rejected: game already has two players");
            return Err(GameError::GameFull);
        }
        if game.player1 == caller {
            debug!(%caller, game_id, "join rejected: caller created this game");
            return Err(GameError::CannotJoinOwnGame);
        }
        if self.active_game.contains_key(&caller) {
            debug!(%caller, game_id, "join rejected: caller already has an active game");
            return Err(GameError::AlreadyInGame);
        }

        game.player2 = Some(caller);
        game.is_player1_first = Some(self.first_mover.coin_flip());
        self.active_game.insert(caller, game_id);

        debug!(%caller, game_id, "player joined");
        Ok(())
    }

    /// Places the caller's mark, advances the ply counter and evaluates the
    /// board. A win or tie moves the game to its terminal status and frees
    /// both participants for new games.
    pub fn make_move(
        &mut self,
        game_id: GameId,
        row: usize,
        col: usize,
        caller: PlayerId,
    ) -> Result<(), GameError> {
        self.ensure_not_paused()?;
        let game = self.games.get_mut(&game_id).ok_or(GameError::GameNotFound)?;
        if game.status.is_terminal() {
            debug!(%caller, game_id, "move rejected: game is finished");
            return Err(GameError::GameFinished);
        }
        let player2 = game.player2.ok_or(GameError::GameNotStarted)?;
        if game.turn_owner() != Some(caller) {
            debug!(%caller, game_id, "move rejected: not this caller's turn");
            return Err(GameError::NotYourTurn);
        }

        // Turn check guarantees the caller is seated, so the mark is known.
        let mark = if caller == game.player1 { Mark::X } else { Mark::O };
        game.board.place(row, col, mark)?;
        game.ply_count += 1;

        let finished = match game.board.evaluate() {
            Outcome::Win(Mark::X) => {
                game.status = GameStatus::Player1Won;
                true
            }
            Outcome::Win(Mark::O) => {
                game.status = GameStatus::Player2Won;
                true
            }
            Outcome::Tie => {
                game.status = GameStatus::Tie;
                true
            }
            Outcome::None => false,
        };

        if finished {
            let status = game.status;
            let player1 = game.player1;
            self.active_game.remove(&player1);
            self.active_game.remove(&player2);
            debug!(game_id, ?status, "game finished, both players released");
        }

        Ok(())
    }

    /// Toggles the global pause flag. Owner only. Deliberately not gated on
    /// the flag itself, otherwise a paused registry could never be resumed.
    pub fn set_is_paused(&mut self, caller: PlayerId) -> Result<(), GameError> {
        if caller != self.owner {
            debug!(%caller, "pause toggle rejected: caller is not the owner");
            return Err(GameError::NotOwner);
        }
        self.is_paused = !self.is_paused;
        debug!(is_paused = self.is_paused, "pause flag toggled");
        Ok(())
    }

    pub fn game(&self, game_id: GameId) -> Option<&Game> {
        self.games.get(&game_id)
    }

    pub fn active_game_of(&self, player: PlayerId) -> Option<GameId> {
        self.active_game.get(&player).copied()
    }

    pub fn game_count(&self) -> u64 {
        self.game_count
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    fn ensure_not_paused(&self) -> Result<(), GameError> {
        if self.is_paused {
            return Err(GameError::Paused);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Always seats player1 (or player2) as first mover.
    struct FixedFlip(bool);

    impl FirstMoverSource for FixedFlip {
        fn coin_flip(&mut self) -> bool {
            self.0
        }
    }

    fn registry_p1_first() -> (GameRegistry, PlayerId) {
        let owner = Uuid::new_v4();
        (
            GameRegistry::with_first_mover(owner, Box::new(FixedFlip(true))),
            owner,
        )
    }

    fn player() -> PlayerId {
        Uuid::new_v4()
    }

    /// Starts and joins a game with player1 drawn as first mover.
    fn started_game(registry: &mut GameRegistry) -> (GameId, PlayerId, PlayerId) {
        let (p1, p2) = (player(), player());
        let game_id = registry.start_new_game(p1).unwrap();
        registry.join_game(game_id, p2).unwrap();
        (game_id, p1, p2)
    }

    #[test]
    fn start_mints_increasing_ids_and_maps_creator() {
        let (mut registry, _) = registry_p1_first();
        let (p1, p2) = (player(), player());

        assert_eq!(registry.start_new_game(p1), Ok(1));
        assert_eq!(registry.start_new_game(p2), Ok(2));
        assert_eq!(registry.game_count(), 2);
        assert_eq!(registry.active_game_of(p1), Some(1));
        assert_eq!(registry.active_game_of(p2), Some(2));

        let game = registry.game(1).unwrap();
        assert_eq!(game.player1, p1);
        assert_eq!(game.player2, None);
        assert_eq!(game.status, GameStatus::InProgress);
        assert_eq!(game.is_player1_first, None);
    }

    #[test]
    fn start_rejects_caller_with_active_game() {
        let (mut registry, _) = registry_p1_first();
        let p1 = player();
        registry.start_new_game(p1).unwrap();
        assert_eq!(registry.start_new_game(p1), Err(GameError::AlreadyInGame));
        assert_eq!(registry.game_count(), 1);
    }

    #[test]
    fn join_seats_player2_and_fixes_first_mover() {
        let (mut registry, _) = registry_p1_first();
        let (game_id, p1, p2) = started_game(&mut registry);

        let game = registry.game(game_id).unwrap();
        assert_eq!(game.player2, Some(p2));
        assert_eq!(game.is_player1_first, Some(true));
        assert_eq!(game.turn_owner(), Some(p1));
        assert_eq!(game.mark_of(p1), Some(Mark::X));
        assert_eq!(game.mark_of(p2), Some(Mark::O));
        assert_eq!(game.mark_of(Uuid::new_v4()), None);
        assert_eq!(registry.active_game_of(p2), Some(game_id));
    }

    #[test]
    fn join_errors_are_specific() {
        let (mut registry, _) = registry_p1_first();
        let (p1, p2, p3) = (player(), player(), player());
        let game_id = registry.start_new_game(p1).unwrap();

        assert_eq!(registry.join_game(42, p2), Err(GameError::GameNotFound));
        assert_eq!(registry.join_game(game_id, p1), Err(GameError::CannotJoinOwnGame));

        registry.join_game(game_id, p2).unwrap();
        assert_eq!(registry.join_game(game_id, p3), Err(GameError::GameFull));

        // p3 starts their own game, then tries to join a second one.
        let other = registry.start_new_game(p3).unwrap();
        let p4 = player();
        registry.start_new_game(p4).unwrap();
        assert_eq!(registry.join_game(other, p4), Err(GameError::AlreadyInGame));
    }

    #[test]
    fn move_requires_both_players() {
        let (mut registry, _) = registry_p1_first();
        let p1 = player();
        let game_id = registry.start_new_game(p1).unwrap();
        assert_eq!(
            registry.make_move(game_id, 0, 0, p1),
            Err(GameError::GameNotStarted)
        );
    }

    #[test]
    fn move_rejects_missing_game_wrong_turn_and_outsiders() {
        let (mut registry, _) = registry_p1_first();
        let (game_id, _p1, p2) = started_game(&mut registry);

        assert_eq!(registry.make_move(99, 0, 0, p2), Err(GameError::GameNotFound));
        // player1 was drawn first, so p2 must wait.
        assert_eq!(registry.make_move(game_id, 0, 0, p2), Err(GameError::NotYourTurn));
        let outsider = player();
        assert_eq!(
            registry.make_move(game_id, 0, 0, outsider),
            Err(GameError::NotYourTurn)
        );
    }

    #[test]
    fn move_propagates_board_errors_without_advancing_the_turn() {
        let (mut registry, _) = registry_p1_first();
        let (game_id, p1, p2) = started_game(&mut registry);

        assert_eq!(registry.make_move(game_id, 5, 0, p1), Err(GameError::OutOfRange));
        registry.make_move(game_id, 1, 1, p1).unwrap();
        assert_eq!(
            registry.make_move(game_id, 1, 1, p2),
            Err(GameError::CellOccupied)
        );

        let game = registry.game(game_id).unwrap();
        assert_eq!(game.ply_count, 1);
        assert_eq!(game.turn_owner(), Some(p2));
    }

    #[test]
    fn top_row_win_finishes_game_and_releases_players() {
        let (mut registry, _) = registry_p1_first();
        let (game_id, p1, p2) = started_game(&mut registry);

        registry.make_move(game_id, 0, 0, p1).unwrap();
        registry.make_move(game_id, 1, 0, p2).unwrap();
        registry.make_move(game_id, 0, 1, p1).unwrap();
        registry.make_move(game_id, 1, 1, p2).unwrap();
        registry.make_move(game_id, 0, 2, p1).unwrap();

        let game = registry.game(game_id).unwrap();
        assert_eq!(game.status, GameStatus::Player1Won);
        assert_eq!(registry.active_game_of(p1), None);
        assert_eq!(registry.active_game_of(p2), None);

        assert_eq!(
            registry.make_move(game_id, 2, 2, p2),
            Err(GameError::GameFinished)
        );
    }

    #[test]
    fn second_player_can_win_when_drawn_first() {
        let owner = Uuid::new_v4();
        let mut registry = GameRegistry::with_first_mover(owner, Box::new(FixedFlip(false)));
        let (p1, p2) = (player(), player());
        let game_id = registry.start_new_game(p1).unwrap();
        registry.join_game(game_id, p2).unwrap();

        assert_eq!(registry.game(game_id).unwrap().turn_owner(), Some(p2));
        registry.make_move(game_id, 2, 0, p2).unwrap();
        registry.make_move(game_id, 0, 0, p1).unwrap();
        registry.make_move(game_id, 2, 1, p2).unwrap();
        registry.make_move(game_id, 0, 1, p1).unwrap();
        registry.make_move(game_id, 2, 2, p2).unwrap();

        assert_eq!(registry.game(game_id).unwrap().status, GameStatus::Player2Won);
    }

    #[test]
    fn full_board_without_line_ties_and_releases_players() {
        let (mut registry, _) = registry_p1_first();
        let (game_id, p1, p2) = started_game(&mut registry);

        // Row-major fill with no three in a row:
        //   O X O
        //   X O X
        //   X O X
        let moves = [
            (0, 1, p1),
            (0, 0, p2),
            (1, 0, p1),
            (0, 2, p2),
            (1, 2, p1),
            (1, 1, p2),
            (2, 0, p1),
            (2, 1, p2),
            (2, 2, p1),
        ];
        for (row, col, who) in moves {
            registry.make_move(game_id, row, col, who).unwrap();
        }

        let game = registry.game(game_id).unwrap();
        assert_eq!(game.status, GameStatus::Tie);
        assert_eq!(game.ply_count, 9);
        assert_eq!(registry.active_game_of(p1), None);
        assert_eq!(registry.active_game_of(p2), None);
    }

    #[test]
    fn finished_players_can_start_again() {
        let (mut registry, _) = registry_p1_first();
        let (game_id, p1, p2) = started_game(&mut registry);

        registry.make_move(game_id, 0, 0, p1).unwrap();
        registry.make_move(game_id, 1, 0, p2).unwrap();
        registry.make_move(game_id, 0, 1, p1).unwrap();
        registry.make_move(game_id, 1, 1, p2).unwrap();
        registry.make_move(game_id, 0, 2, p1).unwrap();

        let next = registry.start_new_game(p1).unwrap();
        assert_eq!(next, game_id + 1);
        assert_eq!(registry.active_game_of(p1), Some(next));
    }

    #[test]
    fn concurrent_games_do_not_interfere() {
        let (mut registry, _) = registry_p1_first();
        let (game1, a1, a2) = started_game(&mut registry);
        let (game2, b1, b2) = started_game(&mut registry);

        registry.make_move(game1, 0, 0, a1).unwrap();
        registry.make_move(game2, 0, 0, b1).unwrap();
        registry.make_move(game1, 1, 0, a2).unwrap();
        registry.make_move(game2, 1, 0, b2).unwrap();

        let g1 = registry.game(game1).unwrap();
        let g2 = registry.game(game2).unwrap();
        assert_eq!(g1.ply_count, 2);
        assert_eq!(g2.ply_count, 2);
        assert_eq!(g1.player1, a1);
        assert_eq!(g2.player1, b1);
        assert_eq!(registry.active_game_of(a1), Some(game1));
        assert_eq!(registry.active_game_of(b2), Some(game2));

        // The same cell in each game holds each game's own mark.
        assert!(g1.board.cell(0, 0).is_some());
        assert!(g2.board.cell(0, 0).is_some());
    }

    #[test]
    fn pause_gates_game_operations_but_not_reads() {
        let (mut registry, owner) = registry_p1_first();
        let (game_id, p1, p2) = started_game(&mut registry);
        registry.make_move(game_id, 0, 1, p1).unwrap();

        registry.set_is_paused(owner).unwrap();
        assert!(registry.is_paused());

        assert_eq!(registry.make_move(game_id, 0, 0, p2), Err(GameError::Paused));
        assert_eq!(registry.start_new_game(player()), Err(GameError::Paused));
        assert_eq!(registry.join_game(game_id, player()), Err(GameError::Paused));

        // Accessors still answer while paused.
        assert_eq!(registry.game(game_id).unwrap().ply_count, 1);
        assert_eq!(registry.active_game_of(p1), Some(game_id));

        // Owner can resume, after which play continues.
        registry.set_is_paused(owner).unwrap();
        assert!(!registry.is_paused());
        registry.make_move(game_id, 0, 0, p2).unwrap();
    }

    #[test]
    fn only_owner_toggles_pause() {
        let (mut registry, owner) = registry_p1_first();
        let stranger = player();

        assert_eq!(registry.set_is_paused(stranger), Err(GameError::NotOwner));
        assert!(!registry.is_paused());
        assert_eq!(registry.owner(), owner);
    }
}
