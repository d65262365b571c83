//! In-memory game storage with one lock per game.

use crate::error::GameError;
use derive_getters::Getters;
use derive_new::new;
use flowerbot_core::{Game, GameBoard, GameId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// A stored game together with the board it started from.
///
/// The initial board is kept so the log can be replayed.
#[derive(Debug, Clone, new, Getters)]
pub struct GameRecord {
    /// Board at creation time.
    initial_board: GameBoard,
    /// Current game state.
    game: Game,
}

impl GameRecord {
    /// Mutable access to the game.
    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }
}

/// Stores all games.
///
/// The map lock is only held to look up or insert an entry. Each game has
/// its own mutex, so operations on one id are serialized while different
/// ids proceed in parallel.
#[derive(Debug, Clone, Default)]
pub struct GameStore {
    games: Arc<RwLock<HashMap<GameId, Arc<Mutex<GameRecord>>>>>,
}

impl GameStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating game store");
        Self::default()
    }

    /// Adds a new record.
    ///
    /// # Errors
    ///
    /// Returns a server error if the id is already taken or a lock is poisoned.
    #[instrument(skip(self, record), fields(game_id = %record.game().id()))]
    pub fn insert(&self, record: GameRecord) -> Result<(), GameError> {
        let mut games = self
            .games
            .write()
            .map_err(|_| GameError::server("Game store lock poisoned"))?;

        let id = record.game().id().to_string();
        if games.contains_key(&id) {
            warn!("Game id already exists");
            return Err(GameError::server(format!("Duplicate game id {id}")));
        }
        games.insert(id, Arc::new(Mutex::new(record)));
        debug!(count = games.len(), "Game stored");
        Ok(())
    }

    /// Runs `f` with exclusive access to one game.
    ///
    /// # Errors
    ///
    /// Returns not-found for unknown ids and a server error for poisoned locks.
    #[instrument(skip(self, f))]
    pub fn with_record<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut GameRecord) -> R,
    ) -> Result<R, GameError> {
        let entry = self.entry(id)?;
        let mut record = entry.lock().map_err(|_| {
            warn!(game_id = id, "Game lock poisoned");
            GameError::server(format!("Game {id} lock poisoned"))
        })?;
        Ok(f(&mut record))
    }

    /// Clones every stored game.
    ///
    /// # Errors
    ///
    /// Returns a server error for poisoned locks.
    #[instrument(skip(self))]
    pub fn games(&self) -> Result<Vec<Game>, GameError> {
        let entries: Vec<_> = self
            .games
            .read()
            .map_err(|_| GameError::server("Game store lock poisoned"))?
            .values()
            .cloned()
            .collect();

        entries
            .iter()
            .map(|entry| {
                entry
                    .lock()
                    .map(|record| record.game().clone())
                    .map_err(|_| GameError::server("Game lock poisoned"))
            })
            .collect()
    }

    /// Number of stored games.
    pub fn len(&self) -> usize {
        self.games.read().map(|g| g.len()).unwrap_or(0)
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, id: &str) -> Result<Arc<Mutex<GameRecord>>, GameError> {
        let games = self
            .games
            .read()
            .map_err(|_| GameError::server("Game store lock poisoned"))?;
        games.get(id).cloned().ok_or_else(|| {
            debug!(game_id = id, "Game not found");
            GameError::not_found(id)
        })
    }
}
