//! Game aggregate: board, status machine and append-only action log.

use crate::board::GameBoard;
use crate::engine::{self, ActionFailure};
use crate::types::{ActionType, Direction, GameStatus};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game.
pub type GameId = String;

/// One attempted action, successful or not.
///
/// Entries are appended in chronological order and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAction {
    /// What was attempted.
    #[serde(rename = "type")]
    action_type: ActionType,
    /// Direction the action was aimed at.
    direction: Direction,
    /// When the attempt happened.
    timestamp: DateTime<Utc>,
    /// Whether the engine accepted it.
    success: bool,
    /// `CODE: message` for rejected attempts, e.g.
    /// `OUT_OF_BOUNDS: Target cell is outside the board`.
    error_message: Option<String>,
}

impl GameAction {
    /// Records an accepted action.
    pub fn succeeded(action_type: ActionType, direction: Direction) -> Self {
        Self {
            action_type,
            direction,
            timestamp: Utc::now(),
            success: true,
            error_message: None,
        }
    }

    /// Records a rejected action.
    pub fn failed(action_type: ActionType, direction: Direction, failure: ActionFailure) -> Self {
        Self {
            action_type,
            direction,
            timestamp: Utc::now(),
            success: false,
            error_message: Some(format!("{}: {}", failure.code(), failure)),
        }
    }

    /// The failure recorded for a rejected attempt.
    pub fn failure(&self) -> Option<ActionFailure> {
        let message = self.error_message.as_deref()?;
        let (code, _) = message.split_once(':')?;
        code.parse().ok()
    }
}

/// Why [`Game::perform`] did not apply an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ActionError {
    /// The engine rejected the action. The attempt was logged.
    #[display("Illegal action: {}", _0)]
    Illegal(#[error(not(source))] ActionFailure),

    /// The game already ended. Nothing was logged.
    #[display("Game is already finished ({})", _0)]
    Finished(#[error(not(source))] GameStatus),
}

/// A single game: its board, lifecycle status and history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    id: GameId,
    name: String,
    board: GameBoard,
    status: GameStatus,
    actions: Vec<GameAction>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Creates a game on `board`.
    ///
    /// A board with nothing left to deliver starts out won.
    #[instrument(skip_all)]
    pub fn new(id: impl Into<GameId>, name: impl Into<String>, board: GameBoard) -> Self {
        let id = id.into();
        let name = name.into();
        let status = if board.is_complete() {
            GameStatus::Won
        } else {
            GameStatus::Playing
        };
        info!(
            game_id = %id,
            %name,
            ?status,
            total_flowers = board.total_flowers(),
            "Creating game"
        );

        Self {
            id,
            name,
            board,
            status,
            actions: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Game identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current board.
    pub fn board(&self) -> &GameBoard {
        &self.board
    }

    /// Lifecycle status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Every attempted action, oldest first.
    pub fn actions(&self) -> &[GameAction] {
        &self.actions
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last logged attempt, if any.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// True once won or lost.
    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// Attempts one action.
    ///
    /// On success the board is replaced and the game is won as soon as the
    /// last flower is delivered. On an illegal action the board is kept and
    /// the failed attempt is logged.
    ///
    /// # Errors
    ///
    /// [`ActionError::Finished`] if the game already ended (nothing is
    /// logged), [`ActionError::Illegal`] if the engine rejected the action.
    #[instrument(skip(self), fields(game_id = %self.id, status = ?self.status))]
    pub fn perform(&mut self, action: ActionType, direction: Direction) -> Result<(), ActionError> {
        if self.is_finished() {
            warn!("Action on finished game refused");
            return Err(ActionError::Finished(self.status));
        }

        let outcome = engine::apply(&self.board, action, direction);
        self.updated_at = Some(Utc::now());

        match outcome {
            Ok(board) => {
                self.board = board;
                self.actions.push(GameAction::succeeded(action, direction));
                if self.board.is_complete() {
                    self.status = GameStatus::Won;
                    info!(
                        delivered = self.board.flowers_delivered(),
                        actions = self.actions.len(),
                        "Game won"
                    );
                }
                Ok(())
            }
            Err(failure) => {
                debug!(code = failure.code(), "Illegal action logged");
                self.actions
                    .push(GameAction::failed(action, direction, failure));
                Err(ActionError::Illegal(failure))
            }
        }
    }

    /// Ends a playing game as lost. Finished games are left alone.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn declare_game_over(&mut self) {
        if self.status == GameStatus::Playing {
            info!(actions = self.actions.len(), "Game declared over");
            self.status = GameStatus::GameOver;
            self.updated_at = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Robot;
    use crate::types::Position;

    fn game() -> Game {
        let board = GameBoard::new(
            3,
            3,
            Robot::new(Position::new(0, 0), Direction::North),
            Position::new(2, 0),
        )
        .and_then(|b| b.with_flower(Position::new(1, 1)))
        .expect("valid board");
        Game::new("g1", "tiny", board)
    }

    #[test]
    fn test_new_game_is_playing() {
        let game = game();
        assert_eq!(game.status(), GameStatus::Playing);
        assert!(game.actions().is_empty());
        assert!(game.updated_at().is_none());
    }

    #[test]
    fn test_empty_board_starts_won() {
        let board = GameBoard::new(
            3,
            3,
            Robot::new(Position::new(0, 0), Direction::North),
            Position::new(2, 2),
        )
        .unwrap();
        assert_eq!(Game::new("g", "done", board).status(), GameStatus::Won);
    }

    #[test]
    fn test_failed_attempt_is_logged() {
        let mut game = game();
        let before = game.board().clone();
        let err = game.perform(ActionType::Move, Direction::North).unwrap_err();
        assert_eq!(err, ActionError::Illegal(ActionFailure::OutOfBounds));
        assert_eq!(game.board(), &before);
        assert_eq!(game.actions().len(), 1);
        assert!(!game.actions()[0].success());
        assert_eq!(
            game.actions()[0].error_message().as_deref(),
            Some("OUT_OF_BOUNDS: Target cell is outside the board")
        );
        assert_eq!(game.actions()[0].failure(), Some(ActionFailure::OutOfBounds));
        assert!(game.updated_at().is_some());
        assert_eq!(game.status(), GameStatus::Playing);
    }

    #[test]
    fn test_win_then_refuse() {
        let mut game = game();
        game.perform(ActionType::Move, Direction::East).unwrap();
        game.perform(ActionType::PickFlower, Direction::South).unwrap();
        game.perform(ActionType::GiveFlower, Direction::East).unwrap();
        assert_eq!(game.status(), GameStatus::Won);

        let board = game.board().clone();
        let logged = game.actions().len();
        assert_eq!(
            game.perform(ActionType::Rotate, Direction::South),
            Err(ActionError::Finished(GameStatus::Won))
        );
        assert_eq!(game.board(), &board);
        assert_eq!(game.actions().len(), logged);
    }

    #[test]
    fn test_declare_game_over_only_from_playing() {
        let mut game = game();
        game.declare_game_over();
        assert_eq!(game.status(), GameStatus::GameOver);
        assert_eq!(
            game.perform(ActionType::Rotate, Direction::East),
            Err(ActionError::Finished(GameStatus::GameOver))
        );
    }

    #[test]
    fn test_json_shape() {
        let mut game = game();
        game.perform(ActionType::Rotate, Direction::East).unwrap();
        let json = serde_json::to_value(&game).unwrap();
        assert_eq!(json["id"], "g1");
        assert_eq!(json["status"], "playing");
        assert_eq!(json["actions"][0]["type"], "rotate");
        assert_eq!(json["actions"][0]["direction"], "EAST");
        assert_eq!(json["actions"][0]["success"], true);
        assert!(json["actions"][0]["errorMessage"].is_null());
        assert!(json["createdAt"].is_string());
        assert!(json["updatedAt"].is_string());

        let back: Game = serde_json::from_value(json).unwrap();
        assert_eq!(back, game);
    }
}
