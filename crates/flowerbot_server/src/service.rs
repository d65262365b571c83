//! Game service: validation, per-game serialization and outcome mapping.

use crate::authority::{MoveLimit, NeverUnwinnable, RuleAuthority};
use crate::config::ServerConfig;
use crate::error::{GameError, GameErrorKind};
use crate::store::{GameRecord, GameStore};
use crate::strategy::{GreedyStrategy, Strategy};
use crate::validation::{validate_board_size, validate_game_id, validate_name};
use flowerbot_core::{
    ActionError, ActionType, BoardGenerator, Direction, Game, GameBoard, GameId, GameStatus,
    RandomBoardGenerator,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Autoplay gives up after this many illegal proposals in a row.
pub const MAX_CONSECUTIVE_FAILURES: usize = 3;

/// The six game operations, shared by every transport.
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct GameService {
    store: GameStore,
    generator: Arc<dyn BoardGenerator>,
    strategy: Arc<dyn Strategy>,
    authority: Arc<dyn RuleAuthority>,
    autoplay_max_steps: usize,
    default_board_size: u32,
}

impl std::fmt::Debug for GameService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("games", &self.store.len())
            .field("strategy", &self.strategy.name())
            .field("autoplay_max_steps", &self.autoplay_max_steps)
            .finish()
    }
}

impl GameService {
    /// Creates a service wired from configuration.
    #[instrument(skip(config))]
    pub fn new(config: &ServerConfig) -> Self {
        let generator = match *config.seed() {
            Some(seed) => RandomBoardGenerator::seeded(*config.generator(), seed),
            None => RandomBoardGenerator::new(*config.generator()),
        };
        let authority: Arc<dyn RuleAuthority> = match *config.move_limit() {
            Some(limit) => Arc::new(MoveLimit::new(limit)),
            None => Arc::new(NeverUnwinnable),
        };
        info!(
            seed = ?config.seed(),
            move_limit = ?config.move_limit(),
            autoplay_max_steps = config.autoplay_max_steps(),
            "Creating game service"
        );

        Self {
            store: GameStore::new(),
            generator: Arc::new(generator),
            strategy: Arc::new(GreedyStrategy),
            authority,
            autoplay_max_steps: *config.autoplay_max_steps(),
            default_board_size: *config.default_board_size(),
        }
    }

    /// Board size used when a caller does not choose one.
    pub fn default_board_size(&self) -> u32 {
        self.default_board_size
    }

    /// Replaces the board generator.
    pub fn with_generator(mut self, generator: impl BoardGenerator + 'static) -> Self {
        self.generator = Arc::new(generator);
        self
    }

    /// Replaces the autoplay strategy.
    pub fn with_strategy(mut self, strategy: impl Strategy + 'static) -> Self {
        self.strategy = Arc::new(strategy);
        self
    }

    /// Replaces the rule authority.
    pub fn with_authority(mut self, authority: impl RuleAuthority + 'static) -> Self {
        self.authority = Arc::new(authority);
        self
    }

    /// Creates a game on a freshly generated `board_size × board_size` board.
    ///
    /// # Errors
    ///
    /// Validation errors for a blank name or an out-of-range size.
    #[instrument(skip(self))]
    pub fn create_game(&self, name: &str, board_size: u32) -> Result<Game, GameError> {
        validate_name(name)?;
        validate_board_size(board_size)?;

        let board = self
            .generator
            .generate(board_size)
            .map_err(|e| GameError::server(format!("Board generation failed: {e}")))?;
        self.create_game_with_board(name, board)
    }

    /// Creates a game on a given board.
    ///
    /// # Errors
    ///
    /// Validation error for a blank name.
    #[instrument(skip(self, board), fields(width = board.width(), height = board.height()))]
    pub fn create_game_with_board(&self, name: &str, board: GameBoard) -> Result<Game, GameError> {
        validate_name(name)?;

        let game = Game::new(new_game_id(), name.trim(), board.clone());
        self.store.insert(GameRecord::new(board, game.clone()))?;
        info!(game_id = %game.id(), "Game created");
        Ok(game)
    }

    /// All games, oldest first.
    #[instrument(skip(self))]
    pub fn list_games(&self) -> Result<Vec<Game>, GameError> {
        let mut games = self.store.games()?;
        games.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        debug!(count = games.len(), "Listed games");
        Ok(games)
    }

    /// One game by id.
    ///
    /// # Errors
    ///
    /// Validation error for a blank id, not-found for unknown ids.
    #[instrument(skip(self))]
    pub fn get_game(&self, id: &str) -> Result<Game, GameError> {
        validate_game_id(id)?;
        self.store.with_record(id, |record| record.game().clone())
    }

    /// Performs one action and returns the updated game.
    ///
    /// # Errors
    ///
    /// - illegal action on a game still playing: the attempt is logged and
    ///   [`GameErrorKind::IllegalAction`] is returned;
    /// - finished game: [`GameErrorKind::GameFinished`], nothing changes.
    ///
    /// An illegal action after which the rule authority ends the game is
    /// reported as the updated (lost) game rather than an error.
    #[instrument(skip(self))]
    pub fn execute_action(
        &self,
        id: &str,
        action: ActionType,
        direction: Direction,
    ) -> Result<Game, GameError> {
        validate_game_id(id)?;

        self.store.with_record(id, |record| {
            let game = record.game_mut();
            let outcome = game.perform(action, direction);
            self.consult_authority(game);

            match outcome {
                Ok(()) => Ok(game.clone()),
                Err(ActionError::Finished(status)) => {
                    Err(GameError::new(GameErrorKind::GameFinished(status)))
                }
                Err(ActionError::Illegal(failure)) if game.status() == GameStatus::Playing => {
                    warn!(code = failure.code(), "Illegal action");
                    Err(GameError::new(GameErrorKind::IllegalAction(failure)))
                }
                Err(ActionError::Illegal(failure)) => {
                    info!(
                        code = failure.code(),
                        status = %game.status(),
                        "Illegal action ended the game"
                    );
                    Ok(game.clone())
                }
            }
        })?
    }

    /// Lets the strategy play until the game ends or the step bound is hit.
    ///
    /// # Errors
    ///
    /// Validation error for a blank id, not-found for unknown ids.
    pub fn auto_play(&self, id: &str) -> Result<Game, GameError> {
        self.auto_play_bounded(id, self.autoplay_max_steps)
    }

    /// [`Self::auto_play`] with a caller-supplied step bound.
    ///
    /// The bound never exceeds the configured maximum. The game stays locked
    /// for the whole run. A finished game is returned unchanged.
    #[instrument(skip(self), fields(strategy = self.strategy.name()))]
    pub fn auto_play_bounded(&self, id: &str, max_steps: usize) -> Result<Game, GameError> {
        validate_game_id(id)?;
        let max_steps = max_steps.min(self.autoplay_max_steps);

        self.store.with_record(id, |record| {
            let game = record.game_mut();
            let mut steps = 0;
            let mut consecutive_failures = 0;

            while game.status() == GameStatus::Playing && steps < max_steps {
                let Some(planned) = self.strategy.decide(game) else {
                    debug!("Strategy stopped");
                    break;
                };
                steps += 1;

                match game.perform(planned.action, planned.direction) {
                    Ok(()) => consecutive_failures = 0,
                    Err(ActionError::Illegal(failure)) => {
                        consecutive_failures += 1;
                        warn!(
                            code = failure.code(),
                            consecutive_failures,
                            "Strategy proposed an illegal action"
                        );
                    }
                    Err(ActionError::Finished(_)) => break,
                }
                self.consult_authority(game);

                if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                    warn!("Autoplay giving up after repeated illegal actions");
                    break;
                }
            }

            info!(
                steps,
                status = %game.status(),
                actions = game.actions().len(),
                "Autoplay finished"
            );
            game.clone()
        })
    }

    /// Board snapshots after every successful action, oldest first.
    ///
    /// # Errors
    ///
    /// Validation error for a blank id, not-found for unknown ids, server
    /// error if the stored log cannot be replayed.
    #[instrument(skip(self))]
    pub fn replay(&self, id: &str) -> Result<Vec<GameBoard>, GameError> {
        validate_game_id(id)?;
        let (initial, actions) = self.store.with_record(id, |record| {
            (record.initial_board().clone(), record.game().actions().to_vec())
        })?;

        let snapshots = flowerbot_core::replay(&initial, &actions)
            .map_err(|e| GameError::server(e.to_string()))?;
        debug!(snapshots = snapshots.len(), "Replayed game");
        Ok(snapshots)
    }

    fn consult_authority(&self, game: &mut Game) {
        if game.status() == GameStatus::Playing && self.authority.is_unwinnable(game) {
            game.declare_game_over();
        }
    }
}

/// Random 16-digit hex id.
fn new_game_id() -> GameId {
    format!("{:016x}", rand::random::<u64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_hex() {
        let id = new_game_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(new_game_id(), id);
    }
}
