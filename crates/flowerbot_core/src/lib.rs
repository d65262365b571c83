//! Flowerbot core - the robot, flower and princess puzzle as pure logic.
//!
//! A robot moves around a bounded grid, picks up flowers and hands them to
//! a princess, cleaning obstacles out of its way when needed. This crate
//! holds everything that does not need I/O:
//!
//! - **Types**: positions, directions, cells, actions and statuses
//! - **Board**: the sparse grid with robot, princess and flower bookkeeping
//! - **Engine**: legality rules and state transition for each action
//! - **Invariants**: properties every board must satisfy
//! - **Game**: the status machine and the append-only action log
//! - **Replay**: deterministic reconstruction of a game from its log
//! - **Generator**: random boards for new games
//!
//! # Example
//!
//! ```
//! use flowerbot_core::{ActionType, Direction, Game, GameBoard, GameStatus, Position, Robot};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let robot = Robot::new(Position::new(0, 0), Direction::North);
//! let board = GameBoard::new(3, 3, robot, Position::new(2, 0))?
//!     .with_flower(Position::new(1, 1))?;
//! let mut game = Game::new("demo", "Demo", board);
//!
//! game.perform(ActionType::Move, Direction::East)?;
//! game.perform(ActionType::PickFlower, Direction::South)?;
//! game.perform(ActionType::GiveFlower, Direction::East)?;
//! assert_eq!(game.status(), GameStatus::Won);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod engine;
mod game;
mod generator;
mod invariants;
mod replay;
mod types;

pub use board::{BoardError, Cell, GameBoard, MAX_BOARD_SIZE, MIN_BOARD_SIZE, Robot};
pub use engine::{
    ActionFailure, RobotHasFlower, RobotHasRoom, TargetHolds, TargetInBounds, apply, is_legal,
    legal_actions,
};
pub use game::{ActionError, Game, GameAction, GameId};
pub use generator::{BoardGenerator, GeneratorSettings, RandomBoardGenerator};
pub use invariants::{
    BoardInvariants, CapacityRespected, DeliveriesWithinTotal, FlowerConservation, Invariant,
    InvariantSet, InvariantViolation, PositionsInBounds, PrincessCellClear, RobotOffObstacles,
    assert_invariants,
};
pub use replay::{ReplayError, replay};
pub use types::{ActionType, CellType, CellView, Direction, GameStatus, Position};
