//! Board model: robot, sparse cell map and flower bookkeeping.

use crate::invariants::{BoardInvariants, InvariantSet};
use crate::types::{CellType, CellView, Direction, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{instrument, warn};

/// Smallest accepted board side.
pub const MIN_BOARD_SIZE: u32 = 3;

/// Largest accepted board side.
pub const MAX_BOARD_SIZE: u32 = 50;

/// The robot: where it stands, where it faces, and how many flowers it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Robot {
    position: Position,
    orientation: Direction,
    flowers_held: u32,
}

impl Robot {
    /// Maximum number of flowers the robot can carry at once.
    pub const CAPACITY: u32 = 12;

    /// Creates an empty-handed robot.
    pub fn new(position: Position, orientation: Direction) -> Self {
        Self {
            position,
            orientation,
            flowers_held: 0,
        }
    }

    /// Returns the robot carrying `flowers` flowers.
    ///
    /// Capacity is enforced when the robot is placed on a board.
    pub fn with_flowers(mut self, flowers: u32) -> Self {
        self.flowers_held = flowers;
        self
    }

    /// Current position.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Direction the robot is drawn facing.
    pub fn orientation(&self) -> Direction {
        self.orientation
    }

    /// Number of flowers carried.
    pub fn flowers_held(&self) -> u32 {
        self.flowers_held
    }

    /// True when carrying at least one flower.
    pub fn has_flowers(&self) -> bool {
        self.flowers_held > 0
    }

    /// True while below capacity.
    pub fn can_pick_more(&self) -> bool {
        self.flowers_held < Self::CAPACITY
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn set_orientation(&mut self, orientation: Direction) {
        self.orientation = orientation;
    }

    pub(crate) fn take_flower(&mut self) {
        self.flowers_held += 1;
    }

    pub(crate) fn release_flower(&mut self) {
        self.flowers_held -= 1;
    }
}

/// A materialized (non-empty) cell, as exchanged on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Where the cell is.
    pub position: Position,
    /// What occupies it.
    #[serde(rename = "type")]
    pub cell_type: CellView,
}

/// Errors raised while constructing or decoding a board.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardError {
    /// Width or height outside the accepted range.
    #[display("Board dimensions {}x{} outside {}..={}", _0, _1, MIN_BOARD_SIZE, MAX_BOARD_SIZE)]
    Dimensions(u32, u32),

    /// A cell was placed outside the board.
    #[display("Position {} is outside the board", _0)]
    OutOfBounds(#[error(not(source))] Position),

    /// A cell was placed on the princess.
    #[display("Position {} holds the princess and cannot store content", _0)]
    PrincessCell(#[error(not(source))] Position),

    /// Not enough free cells for the requested content.
    #[display("Board too small: {}", _0)]
    Crowded(#[error(not(source))] String),

    /// One or more board invariants do not hold.
    #[display("Board invariant violated: {}", _0)]
    Invariant(#[error(not(source))] String),
}

/// Full board state: grid bounds, stored cells, robot, princess and counters.
///
/// Only flowers and obstacles are stored. Every other in-bounds position is
/// empty, and the robot and princess are derived from their positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardRepr", into = "BoardRepr")]
pub struct GameBoard {
    width: u32,
    height: u32,
    cells: BTreeMap<Position, CellType>,
    robot: Robot,
    princess_position: Position,
    total_flowers: u32,
    flowers_delivered: u32,
}

impl GameBoard {
    /// Creates a board with no flowers or obstacles.
    ///
    /// Flowers the robot already carries count towards the total.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the dimensions are out of range or the
    /// robot/princess are misplaced.
    #[instrument(skip(robot), fields(robot = %robot.position()))]
    pub fn new(
        width: u32,
        height: u32,
        robot: Robot,
        princess_position: Position,
    ) -> Result<Self, BoardError> {
        let board = Self {
            width,
            height,
            cells: BTreeMap::new(),
            robot,
            princess_position,
            total_flowers: robot.flowers_held(),
            flowers_delivered: 0,
        };
        board.validate()?;
        Ok(board)
    }

    /// Returns the board with `cell` stored at `position`.
    ///
    /// Storing [`CellType::Empty`] clears the position. Flowers added or
    /// removed here adjust `total_flowers`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the position is off the board, holds the
    /// princess, or would leave the robot on an obstacle.
    pub fn with_cell(mut self, position: Position, cell: CellType) -> Result<Self, BoardError> {
        if !self.in_bounds(position) {
            return Err(BoardError::OutOfBounds(position));
        }
        if position == self.princess_position && cell != CellType::Empty {
            return Err(BoardError::PrincessCell(position));
        }
        if self.cells.get(&position) == Some(&CellType::Flower) {
            self.total_flowers -= 1;
        }
        if cell == CellType::Flower {
            self.total_flowers += 1;
        }
        self.set_cell(position, cell);
        self.validate()?;
        Ok(self)
    }

    /// Shorthand for storing a flower.
    pub fn with_flower(self, position: Position) -> Result<Self, BoardError> {
        self.with_cell(position, CellType::Flower)
    }

    /// Shorthand for storing an obstacle.
    pub fn with_obstacle(self, position: Position) -> Result<Self, BoardError> {
        self.with_cell(position, CellType::Obstacle)
    }

    /// Checks dimensions and every board invariant.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Dimensions`] or [`BoardError::Invariant`].
    pub fn validate(&self) -> Result<(), BoardError> {
        let side = MIN_BOARD_SIZE..=MAX_BOARD_SIZE;
        if !side.contains(&self.width) || !side.contains(&self.height) {
            return Err(BoardError::Dimensions(self.width, self.height));
        }
        BoardInvariants::check_all(self).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(%descriptions, "Board failed validation");
            BoardError::Invariant(descriptions)
        })
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The robot.
    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    /// Where the princess waits.
    pub fn princess_position(&self) -> Position {
        self.princess_position
    }

    /// Flowers that exist in this game, wherever they currently are.
    pub fn total_flowers(&self) -> u32 {
        self.total_flowers
    }

    /// Flowers handed to the princess so far.
    pub fn flowers_delivered(&self) -> u32 {
        self.flowers_delivered
    }

    /// Flowers still to be delivered.
    pub fn remaining_flowers(&self) -> u32 {
        self.total_flowers.saturating_sub(self.flowers_delivered)
    }

    /// True once every flower has been delivered.
    pub fn is_complete(&self) -> bool {
        self.flowers_delivered >= self.total_flowers
    }

    /// True if `position` lies on the board.
    pub fn in_bounds(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// The in-bounds neighbour of `position` in `direction`.
    pub fn neighbor(&self, position: Position, direction: Direction) -> Option<Position> {
        position.step(direction).filter(|p| self.in_bounds(*p))
    }

    /// Stored content at `position` (empty by default).
    pub fn cell_at(&self, position: Position) -> CellType {
        self.cells
            .get(&position)
            .copied()
            .unwrap_or(CellType::Empty)
    }

    /// Occupancy at `position`, with the robot and princess drawn on top.
    pub fn view_at(&self, position: Position) -> CellView {
        if self.robot.position() == position {
            CellView::Robot
        } else if self.princess_position == position {
            CellView::Princess
        } else {
            self.cell_at(position).into()
        }
    }

    /// Iterates the stored (non-empty) cells in position order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().map(|(position, cell)| Cell {
            position: *position,
            cell_type: (*cell).into(),
        })
    }

    /// Positions currently holding a flower.
    pub fn flower_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions_of(CellType::Flower)
    }

    /// Positions currently holding an obstacle.
    pub fn obstacle_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions_of(CellType::Obstacle)
    }

    /// Number of flowers lying on the board.
    pub fn flowers_on_board(&self) -> u32 {
        self.flower_positions().count() as u32
    }

    fn positions_of(&self, wanted: CellType) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .filter(move |(_, cell)| **cell == wanted)
            .map(|(position, _)| *position)
    }

    /// Formats the board as a human-readable grid.
    ///
    /// `R` robot, `P` princess, `F` flower, `#` obstacle, `.` empty.
    pub fn display(&self) -> String {
        let mut result = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                result.push(self.view_at(Position::new(x, y)).symbol());
            }
            if y + 1 < self.height {
                result.push('\n');
            }
        }
        result
    }

    pub(crate) fn robot_mut(&mut self) -> &mut Robot {
        &mut self.robot
    }

    pub(crate) fn set_cell(&mut self, position: Position, cell: CellType) {
        match cell {
            CellType::Empty => {
                self.cells.remove(&position);
            }
            other => {
                self.cells.insert(position, other);
            }
        }
    }

    pub(crate) fn record_delivery(&mut self) {
        self.flowers_delivered += 1;
    }
}

/// Wire representation of a [`GameBoard`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardRepr {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    robot: Robot,
    princess_position: Position,
    total_flowers: u32,
    #[serde(default)]
    flowers_delivered: u32,
}

impl From<GameBoard> for BoardRepr {
    fn from(board: GameBoard) -> Self {
        Self {
            width: board.width,
            height: board.height,
            cells: board.cells().collect(),
            robot: board.robot,
            princess_position: board.princess_position,
            total_flowers: board.total_flowers,
            flowers_delivered: board.flowers_delivered,
        }
    }
}

impl TryFrom<BoardRepr> for GameBoard {
    type Error = BoardError;

    fn try_from(repr: BoardRepr) -> Result<Self, Self::Error> {
        // Robot, princess and empty entries are derived views, not content.
        let cells = repr
            .cells
            .into_iter()
            .filter_map(|cell| match cell.cell_type {
                CellView::Flower => Some((cell.position, CellType::Flower)),
                CellView::Obstacle => Some((cell.position, CellType::Obstacle)),
                CellView::Empty | CellView::Robot | CellView::Princess => None,
            })
            .collect();

        let board = Self {
            width: repr.width,
            height: repr.height,
            cells,
            robot: repr.robot,
            princess_position: repr.princess_position,
            total_flowers: repr.total_flowers,
            flowers_delivered: repr.flowers_delivered,
        };
        board.validate()?;
        Ok(board)
    }
}
