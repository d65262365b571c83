//! Rule authorities decide when a game that is still playing is lost.

use flowerbot_core::Game;
use tracing::{debug, instrument};

/// Judges whether a playing game can no longer be won.
pub trait RuleAuthority: Send + Sync {
    /// True if the game should be declared over.
    fn is_unwinnable(&self, game: &Game) -> bool;
}

/// Never declares a game over. Every board can be finished by cleaning.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverUnwinnable;

impl RuleAuthority for NeverUnwinnable {
    fn is_unwinnable(&self, _game: &Game) -> bool {
        false
    }
}

/// Declares a game over once its log reaches `max_actions` entries.
#[derive(Debug, Clone, Copy)]
pub struct MoveLimit {
    max_actions: usize,
}

impl MoveLimit {
    /// Creates a limit of `max_actions` logged attempts, failed ones included.
    pub fn new(max_actions: usize) -> Self {
        Self { max_actions }
    }

    /// The configured limit.
    pub fn max_actions(&self) -> usize {
        self.max_actions
    }
}

impl RuleAuthority for MoveLimit {
    #[instrument(skip_all, fields(game_id = %game.id(), max = self.max_actions))]
    fn is_unwinnable(&self, game: &Game) -> bool {
        let exhausted = !game.is_finished() && game.actions().len() >= self.max_actions;
        if exhausted {
            debug!(logged = game.actions().len(), "Move limit reached");
        }
        exhausted
    }
}
