//! Random board generation.

use crate::board::{BoardError, GameBoard, MAX_BOARD_SIZE, MIN_BOARD_SIZE, Robot};
use crate::types::{Direction, Position};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, instrument};

/// Produces fresh square boards for new games.
pub trait BoardGenerator: Send + Sync {
    /// Builds a `size × size` board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] if no valid board of that size can be built.
    fn generate(&self, size: u32) -> Result<GameBoard, BoardError>;
}

/// Content density of generated boards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Upper bound on flowers per board.
    #[serde(default = "default_max_flowers")]
    pub max_flowers: u32,
    /// Share of cells that hold a flower, before clamping.
    #[serde(default = "default_flower_ratio")]
    pub flower_ratio: f64,
    /// Share of cells that hold an obstacle.
    #[serde(default = "default_obstacle_ratio")]
    pub obstacle_ratio: f64,
}

fn default_max_flowers() -> u32 {
    12
}

fn default_flower_ratio() -> f64 {
    0.10
}

fn default_obstacle_ratio() -> f64 {
    0.30
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            max_flowers: default_max_flowers(),
            flower_ratio: default_flower_ratio(),
            obstacle_ratio: default_obstacle_ratio(),
        }
    }
}

impl GeneratorSettings {
    /// Flowers placed on a board with `cells` cells.
    ///
    /// Always at least one, so no generated game starts already won.
    pub fn flower_count(&self, cells: u32) -> u32 {
        let wanted = (f64::from(cells) * self.flower_ratio.clamp(0.0, 1.0)).floor() as u32;
        wanted.clamp(1, self.max_flowers.max(1))
    }

    /// Obstacles placed on a board with `cells` cells, before capping by free space.
    pub fn obstacle_count(&self, cells: u32) -> u32 {
        (f64::from(cells) * self.obstacle_ratio.clamp(0.0, 1.0)).round() as u32
    }
}

/// Shuffles every cell and deals robot, princess, flowers and obstacles from the top.
///
/// Placements are pairwise distinct. The board is always solvable: any
/// obstacle can be cleaned, so every cell is reachable.
#[derive(Debug)]
pub struct RandomBoardGenerator {
    settings: GeneratorSettings,
    rng: Mutex<SmallRng>,
}

impl RandomBoardGenerator {
    /// Generator seeded from the operating system.
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            settings,
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    /// Reproducible generator.
    pub fn seeded(settings: GeneratorSettings, seed: u64) -> Self {
        Self {
            settings,
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    #[instrument(skip(self))]
    fn generate(&self, size: u32) -> Result<GameBoard, BoardError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(BoardError::Dimensions(size, size));
        }

        let cells = size * size;
        let flowers = self.settings.flower_count(cells);
        if flowers + 2 > cells {
            return Err(BoardError::Crowded(format!(
                "{flowers} flowers do not fit on {size}x{size}"
            )));
        }
        let obstacles = self.settings.obstacle_count(cells).min(cells - 2 - flowers);

        let mut positions: Vec<Position> = (0..size)
            .flat_map(|y| (0..size).map(move |x| Position::new(x, y)))
            .collect();
        {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            positions.shuffle(&mut *rng);
        }

        let mut dealt = positions.into_iter();
        let (Some(robot), Some(princess)) = (dealt.next(), dealt.next()) else {
            return Err(BoardError::Crowded(format!("{size}x{size} has no room")));
        };

        let mut board = GameBoard::new(size, size, Robot::new(robot, Direction::North), princess)?;
        for position in dealt.by_ref().take(flowers as usize) {
            board = board.with_flower(position)?;
        }
        for position in dealt.take(obstacles as usize) {
            board = board.with_obstacle(position)?;
        }

        debug!(flowers, obstacles, robot = %robot, princess = %princess, "Generated board");
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellType;
    use std::collections::HashSet;

    #[test]
    fn test_counts_follow_ratios() {
        let settings = GeneratorSettings::default();
        assert_eq!(settings.flower_count(100), 10);
        assert_eq!(settings.obstacle_count(100), 30);
        assert_eq!(settings.flower_count(9), 1);
        assert_eq!(settings.flower_count(2500), 12);
    }

    #[test]
    fn test_generated_board_shape() {
        let generator = RandomBoardGenerator::seeded(GeneratorSettings::default(), 7);
        for size in [3, 4, 10, 50] {
            let board = generator.generate(size).unwrap();
            let cells = size * size;
            assert_eq!(board.width(), size);
            assert_eq!(board.height(), size);
            assert_eq!(board.robot().orientation(), Direction::North);
            assert_eq!(board.robot().flowers_held(), 0);
            assert_eq!(board.flowers_delivered(), 0);
            assert_eq!(board.total_flowers(), GeneratorSettings::default().flower_count(cells));
            assert_eq!(board.flowers_on_board(), board.total_flowers());
            assert!(!board.is_complete());

            let mut occupied: HashSet<Position> = board.cells().map(|c| c.position).collect();
            assert!(occupied.insert(board.robot().position()));
            assert!(occupied.insert(board.princess_position()));
        }
    }

    #[test]
    fn test_obstacles_capped_by_free_cells() {
        let settings = GeneratorSettings {
            obstacle_ratio: 1.0,
            ..GeneratorSettings::default()
        };
        let board = RandomBoardGenerator::seeded(settings, 1).generate(3).unwrap();
        assert_eq!(board.obstacle_positions().count(), 6);
        assert_eq!(board.cell_at(board.robot().position()), CellType::Empty);
    }

    #[test]
    fn test_same_seed_same_board() {
        let a = RandomBoardGenerator::seeded(GeneratorSettings::default(), 42);
        let b = RandomBoardGenerator::seeded(GeneratorSettings::default(), 42);
        assert_eq!(a.generate(12).unwrap(), b.generate(12).unwrap());
    }

    #[test]
    fn test_rejects_sizes_out_of_range() {
        let generator = RandomBoardGenerator::new(GeneratorSettings::default());
        assert_eq!(generator.generate(2), Err(BoardError::Dimensions(2, 2)));
        assert_eq!(generator.generate(51), Err(BoardError::Dimensions(51, 51)));
    }
}
