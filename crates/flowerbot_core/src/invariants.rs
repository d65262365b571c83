//! First-class board invariants.
//!
//! Invariants are logical properties that must hold for every board the
//! engine produces. They are checked when boards are built or decoded, and
//! after every engine step in debug builds.

use crate::board::{GameBoard, Robot};
use crate::types::CellType;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for tuples of [`Invariant`]s.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    ///
    /// Returns every violation, not just the first.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

macro_rules! impl_invariant_set {
    ($($inv:ident),+) => {
        impl<S, $($inv),+> InvariantSet<S> for ($($inv,)+)
        where
            $($inv: Invariant<S>),+
        {
            fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
                let mut violations = Vec::new();
                $(
                    if !<$inv as Invariant<S>>::holds(state) {
                        violations.push(InvariantViolation::new(
                            <$inv as Invariant<S>>::description(),
                        ));
                    }
                )+
                if violations.is_empty() {
                    Ok(())
                } else {
                    Err(violations)
                }
            }
        }
    };
}

impl_invariant_set!(I1, I2, I3, I4, I5, I6);

/// Invariant: robot, princess and every stored cell lie on the board.
pub struct PositionsInBounds;

impl Invariant<GameBoard> for PositionsInBounds {
    fn holds(board: &GameBoard) -> bool {
        board.in_bounds(board.robot().position())
            && board.in_bounds(board.princess_position())
            && board.cells().all(|cell| board.in_bounds(cell.position))
    }

    fn description() -> &'static str {
        "Robot, princess and cells lie within the board"
    }
}

/// Invariant: nothing is stored on the princess's cell.
pub struct PrincessCellClear;

impl Invariant<GameBoard> for PrincessCellClear {
    fn holds(board: &GameBoard) -> bool {
        board.cell_at(board.princess_position()) == CellType::Empty
    }

    fn description() -> &'static str {
        "No cell content coincides with the princess"
    }
}

/// Invariant: the robot never stands on an obstacle.
pub struct RobotOffObstacles;

impl Invariant<GameBoard> for RobotOffObstacles {
    fn holds(board: &GameBoard) -> bool {
        board.cell_at(board.robot().position()) != CellType::Obstacle
    }

    fn description() -> &'static str {
        "Robot does not stand on an obstacle"
    }
}

/// Invariant: the robot carries at most [`Robot::CAPACITY`] flowers.
pub struct CapacityRespected;

impl Invariant<GameBoard> for CapacityRespected {
    fn holds(board: &GameBoard) -> bool {
        board.robot().flowers_held() <= Robot::CAPACITY
    }

    fn description() -> &'static str {
        "Robot carries no more than 12 flowers"
    }
}

/// Invariant: deliveries never exceed the flower total.
pub struct DeliveriesWithinTotal;

impl Invariant<GameBoard> for DeliveriesWithinTotal {
    fn holds(board: &GameBoard) -> bool {
        board.flowers_delivered() <= board.total_flowers()
    }

    fn description() -> &'static str {
        "Flowers delivered never exceed total flowers"
    }
}

/// Invariant: every flower is on the board, held, or delivered.
///
/// Picking, dropping and giving move flowers between those three places;
/// nothing creates or destroys one.
pub struct FlowerConservation;

impl Invariant<GameBoard> for FlowerConservation {
    fn holds(board: &GameBoard) -> bool {
        board.flowers_on_board() + board.robot().flowers_held() + board.flowers_delivered()
            == board.total_flowers()
    }

    fn description() -> &'static str {
        "Flowers on board, held and delivered add up to the total"
    }
}

/// Every invariant a [`GameBoard`] must satisfy.
pub type BoardInvariants = (
    PositionsInBounds,
    PrincessCellClear,
    RobotOffObstacles,
    CapacityRespected,
    DeliveriesWithinTotal,
    FlowerConservation,
);

/// Asserts that all board invariants hold (panics on violation in debug builds).
pub fn assert_invariants(board: &GameBoard) {
    debug_assert!(
        BoardInvariants::check_all(board).is_ok(),
        "Board invariants violated: {:?}",
        BoardInvariants::check_all(board)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, Position};

    fn board() -> GameBoard {
        GameBoard::new(
            4,
            4,
            Robot::new(Position::new(0, 0), Direction::East),
            Position::new(3, 3),
        )
        .and_then(|b| b.with_flower(Position::new(2, 0)))
        .expect("valid board")
    }

    #[test]
    fn test_fresh_board_holds_all() {
        assert!(BoardInvariants::check_all(&board()).is_ok());
    }

    #[test]
    fn test_conservation_detects_vanished_flower() {
        let mut b = board();
        b.set_cell(Position::new(2, 0), CellType::Empty);
        assert!(!FlowerConservation::holds(&b));
        assert!(DeliveriesWithinTotal::holds(&b));
    }

    #[test]
    fn test_collects_every_violation() {
        let mut b = board();
        b.set_cell(Position::new(3, 3), CellType::Obstacle);
        b.set_cell(Position::new(0, 0), CellType::Obstacle);
        let violations = BoardInvariants::check_all(&b).unwrap_err();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].description, PrincessCellClear::description());
        assert_eq!(violations[1].description, RobotOffObstacles::description());
    }
}
