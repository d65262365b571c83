//! Core value types for the flower-delivery board.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A coordinate on the board.
///
/// `x` grows to the east and `y` grows to the south, so `(0, 0)` is the
/// north-west corner.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("({}, {})", x, y)]
pub struct Position {
    /// Column, counted from the west edge.
    pub x: u32,
    /// Row, counted from the north edge.
    pub y: u32,
}

impl Position {
    /// Creates a position.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Returns the adjacent position in `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant
    /// (west of column 0 or north of row 0). Upper bounds are the board's
    /// concern.
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.offset();
        Some(Self {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }

    /// Returns the direction leading from `self` to an orthogonally adjacent `other`.
    #[instrument]
    pub fn direction_to(self, other: Position) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| self.step(*d) == Some(other))
    }
}

/// Compass direction an action is aimed at.
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
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Direction {
    /// Towards row 0.
    #[display("NORTH")]
    North,
    /// Towards the last column.
    #[display("EAST")]
    East,
    /// Towards the last row.
    #[display("SOUTH")]
    South,
    /// Towards column 0.
    #[display("WEST")]
    West,
}

impl Direction {
    /// All four directions, clockwise from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit offset `(dx, dy)` of one step in this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

/// Content stored for a board cell.
///
/// The robot and the princess are never stored; they are derived from
/// their positions (see [`CellView`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    /// Nothing here. Never materialized in the cell map.
    Empty,
    /// A flower that can be picked.
    Flower,
    /// An obstacle that blocks movement until cleaned.
    Obstacle,
}

/// What occupies a position once the robot and princess are taken into account.
///
/// This is also the vocabulary of the `type` field of a cell on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellView {
    /// Empty ground.
    Empty,
    /// The robot is standing here.
    Robot,
    /// The princess is waiting here.
    Princess,
    /// A flower.
    Flower,
    /// An obstacle.
    Obstacle,
}

impl CellView {
    /// Single-character symbol used by the ASCII board rendering.
    pub fn symbol(self) -> char {
        match self {
            CellView::Empty => '.',
            CellView::Robot => 'R',
            CellView::Princess => 'P',
            CellView::Flower => 'F',
            CellView::Obstacle => '#',
        }
    }
}

impl From<CellType> for CellView {
    fn from(cell: CellType) -> Self {
        match cell {
            CellType::Empty => CellView::Empty,
            CellType::Flower => CellView::Flower,
            CellType::Obstacle => CellView::Obstacle,
        }
    }
}

/// An action the robot can be asked to perform.
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
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum ActionType {
    /// Turn to face a direction.
    #[display("rotate")]
    Rotate,
    /// Step onto the adjacent cell.
    #[display("move")]
    Move,
    /// Pick the flower on the adjacent cell.
    #[display("pickFlower")]
    PickFlower,
    /// Drop a held flower onto the adjacent cell.
    #[display("dropFlower")]
    DropFlower,
    /// Hand a held flower to the adjacent princess.
    #[display("giveFlower")]
    GiveFlower,
    /// Remove the obstacle on the adjacent cell.
    #[display("clean")]
    Clean,
}

/// Lifecycle status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    /// Actions are accepted.
    #[display("playing")]
    Playing,
    /// Every flower has been delivered.
    #[display("won")]
    Won,
    /// The rule authority declared the game lost.
    #[display("game over")]
    GameOver,
}

impl GameStatus {
    /// Returns true for the terminal statuses.
    pub fn is_finished(self) -> bool {
        matches!(self, GameStatus::Won | GameStatus::GameOver)
    }
}
