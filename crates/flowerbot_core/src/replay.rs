//! Deterministic replay of a game's action log.

use crate::board::GameBoard;
use crate::engine::{self, ActionFailure};
use crate::game::GameAction;
use tracing::{instrument, warn};

/// A logged success that the engine no longer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Corrupt action log at entry {}: {}", index, failure)]
pub struct ReplayError {
    /// Index of the offending entry in the log.
    pub index: usize,
    /// What the engine reported.
    pub failure: ActionFailure,
}

/// Re-applies every successful entry of `actions` to `initial`.
///
/// Returns the board after each successful entry, in order. Failed entries
/// contribute nothing and `initial` itself is not included.
///
/// # Errors
///
/// Returns [`ReplayError`] if a logged success is rejected on replay.
#[instrument(skip_all, fields(entries = actions.len()))]
pub fn replay(initial: &GameBoard, actions: &[GameAction]) -> Result<Vec<GameBoard>, ReplayError> {
    let mut snapshots = Vec::new();
    let mut board = initial.clone();

    for (index, entry) in actions.iter().enumerate() {
        if !entry.success() {
            continue;
        }
        board = engine::apply(&board, *entry.action_type(), *entry.direction()).map_err(
            |failure| {
                warn!(index, code = failure.code(), "Logged success rejected on replay");
                ReplayError { index, failure }
            },
        )?;
        snapshots.push(board.clone());
    }

    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Robot;
    use crate::types::{ActionType, Direction, Position};

    fn board() -> GameBoard {
        GameBoard::new(
            4,
            4,
            Robot::new(Position::new(0, 0), Direction::North),
            Position::new(3, 3),
        )
        .and_then(|b| b.with_flower(Position::new(1, 0)))
        .expect("valid board")
    }

    #[test]
    fn test_skips_failed_entries() {
        let log = vec![
            GameAction::failed(ActionType::Move, Direction::North, ActionFailure::OutOfBounds),
            GameAction::succeeded(ActionType::PickFlower, Direction::East),
            GameAction::succeeded(ActionType::Rotate, Direction::South),
        ];
        let snapshots = replay(&board(), &log).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].robot().flowers_held(), 1);
        assert_eq!(snapshots[1].robot().orientation(), Direction::South);
    }

    #[test]
    fn test_empty_log_yields_nothing() {
        assert!(replay(&board(), &[]).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_log_reports_index() {
        let log = vec![
            GameAction::succeeded(ActionType::Rotate, Direction::East),
            GameAction::succeeded(ActionType::GiveFlower, Direction::East),
        ];
        assert_eq!(
            replay(&board(), &log),
            Err(ReplayError {
                index: 1,
                failure: ActionFailure::NotPrincess
            })
        );
    }
}
