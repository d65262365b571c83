//! Action engine: decides whether an action is legal and produces the next board.
//!
//! The engine is a pure function of `(board, action, direction)`. Every
//! directional action targets the cell adjacent to the robot in the given
//! direction, independent of the robot's orientation; only
//! [`ActionType::Rotate`] changes orientation.

use crate::board::GameBoard;
use crate::invariants::assert_invariants;
use crate::types::{ActionType, CellType, Direction, Position};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{debug, instrument};

/// Why the engine refused an action.
///
/// Illegal actions are an expected outcome, not an exceptional one: the
/// board is left untouched and the caller may try something else.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::Error,
    strum::IntoStaticStr,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionFailure {
    /// The target cell lies outside the board.
    #[display("Target cell is outside the board")]
    OutOfBounds,

    /// MOVE onto an obstacle.
    #[display("Movement blocked by an obstacle")]
    Blocked,

    /// PICK_FLOWER on a cell without a flower.
    #[display("No flower here to pick")]
    NoFlowerHere,

    /// PICK_FLOWER while already carrying the maximum.
    #[display("Robot capacity full (12 flowers)")]
    CapacityFull,

    /// DROP_FLOWER on a cell that is not empty.
    #[display("Cell is occupied")]
    CellOccupied,

    /// DROP_FLOWER or GIVE_FLOWER with empty hands.
    #[display("Robot holds no flower")]
    NoFlowerHeld,

    /// GIVE_FLOWER towards a cell without the princess.
    #[display("Princess is not there")]
    NotPrincess,

    /// CLEAN on a cell without an obstacle.
    #[display("Nothing to clean there")]
    NotObstacle,
}

impl ActionFailure {
    /// Stable machine-readable code, e.g. `"NO_FLOWER_HERE"`.
    pub fn code(self) -> &'static str {
        self.into()
    }
}

// ─────────────────────────────────────────────────────────────
//  Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the target cell is on the board.
pub struct TargetInBounds;

impl TargetInBounds {
    /// Returns the target position.
    pub fn check(board: &GameBoard, direction: Direction) -> Result<Position, ActionFailure> {
        board
            .neighbor(board.robot().position(), direction)
            .ok_or(ActionFailure::OutOfBounds)
    }
}

/// Precondition: the target cell stores `expected`.
pub struct TargetHolds;

impl TargetHolds {
    /// Fails with `failure` when the target holds anything else.
    pub fn check(
        board: &GameBoard,
        target: Position,
        expected: CellType,
        failure: ActionFailure,
    ) -> Result<(), ActionFailure> {
        if board.cell_at(target) == expected {
            Ok(())
        } else {
            Err(failure)
        }
    }
}

/// Precondition: the robot has room for another flower.
pub struct RobotHasRoom;

impl RobotHasRoom {
    /// Fails with [`ActionFailure::CapacityFull`] at capacity.
    pub fn check(board: &GameBoard) -> Result<(), ActionFailure> {
        if board.robot().can_pick_more() {
            Ok(())
        } else {
            Err(ActionFailure::CapacityFull)
        }
    }
}

/// Precondition: the robot carries at least one flower.
pub struct RobotHasFlower;

impl RobotHasFlower {
    /// Fails with [`ActionFailure::NoFlowerHeld`] when empty-handed.
    pub fn check(board: &GameBoard) -> Result<(), ActionFailure> {
        if board.robot().has_flowers() {
            Ok(())
        } else {
            Err(ActionFailure::NoFlowerHeld)
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Engine
// ─────────────────────────────────────────────────────────────

/// Applies one action, returning the resulting board.
///
/// # Errors
///
/// Returns the [`ActionFailure`] naming the first precondition that failed.
/// The input board is never modified.
#[instrument(skip(board), fields(robot = %board.robot().position()))]
pub fn apply(
    board: &GameBoard,
    action: ActionType,
    direction: Direction,
) -> Result<GameBoard, ActionFailure> {
    let mut next = board.clone();

    if action == ActionType::Rotate {
        next.robot_mut().set_orientation(direction);
        debug!(orientation = %direction, "Robot rotated");
        return Ok(next);
    }

    let target = TargetInBounds::check(board, direction)?;

    match action {
        ActionType::Rotate => {}
        ActionType::Move => {
            if board.cell_at(target) == CellType::Obstacle {
                return Err(ActionFailure::Blocked);
            }
            next.robot_mut().set_position(target);
        }
        ActionType::PickFlower => {
            TargetHolds::check(board, target, CellType::Flower, ActionFailure::NoFlowerHere)?;
            RobotHasRoom::check(board)?;
            next.set_cell(target, CellType::Empty);
            next.robot_mut().take_flower();
        }
        ActionType::DropFlower => {
            if target == board.princess_position() {
                return Err(ActionFailure::CellOccupied);
            }
            TargetHolds::check(board, target, CellType::Empty, ActionFailure::CellOccupied)?;
            RobotHasFlower::check(board)?;
            next.set_cell(target, CellType::Flower);
            next.robot_mut().release_flower();
        }
        ActionType::GiveFlower => {
            if target != board.princess_position() {
                return Err(ActionFailure::NotPrincess);
            }
            RobotHasFlower::check(board)?;
            next.robot_mut().release_flower();
            next.record_delivery();
        }
        ActionType::Clean => {
            TargetHolds::check(board, target, CellType::Obstacle, ActionFailure::NotObstacle)?;
            next.set_cell(target, CellType::Empty);
        }
    }

    assert_invariants(&next);
    debug!(
        %target,
        held = next.robot().flowers_held(),
        delivered = next.flowers_delivered(),
        "Action applied"
    );
    Ok(next)
}

/// Returns true if `action` towards `direction` would succeed.
pub fn is_legal(board: &GameBoard, action: ActionType, direction: Direction) -> bool {
    apply(board, action, direction).is_ok()
}

/// Every `(action, direction)` pair that would succeed on `board`.
#[instrument(skip(board))]
pub fn legal_actions(board: &GameBoard) -> Vec<(ActionType, Direction)> {
    ActionType::iter()
        .flat_map(|action| Direction::ALL.into_iter().map(move |d| (action, d)))
        .filter(|(action, direction)| is_legal(board, *action, *direction))
        .collect()
}
