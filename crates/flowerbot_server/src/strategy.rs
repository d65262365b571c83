//! Autoplay strategies.

use derive_new::new;
use flowerbot_core::{ActionType, CellType, Direction, Game, GameBoard, Position};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use tracing::{debug, instrument};

/// One step chosen by a [`Strategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, new, Serialize, Deserialize)]
pub struct PlannedAction {
    /// What to do.
    pub action: ActionType,
    /// Where to aim it.
    pub direction: Direction,
}

/// Chooses the next action for autoplay.
///
/// Implementations must be cheap to call repeatedly: autoplay asks once per
/// step and performs the answer before asking again.
pub trait Strategy: Send + Sync {
    /// Next action, or `None` to stop playing.
    fn decide(&self, game: &Game) -> Option<PlannedAction>;

    /// Returns the strategy's display name.
    fn name(&self) -> &str;
}

/// Walks to the nearest useful cell and acts on it.
///
/// While the robot has room and flowers remain on the board it heads for the
/// closest flower; otherwise it heads for the princess and gives. Paths may
/// cross obstacles at the price of cleaning them. The robot turns to face
/// every cell it moves into or acts on.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyStrategy;

/// Cost of stepping into an obstacle: clean, then move.
const OBSTACLE_COST: u32 = 2;

impl GreedyStrategy {
    /// Cheapest route to a cell adjacent to any of `targets`.
    ///
    /// Returns the path (without the start) and the target to act on.
    fn route(board: &GameBoard, targets: &[Position]) -> Option<(Vec<Position>, Position)> {
        let start = board.robot().position();
        let adjacent_target = |p: Position| {
            Direction::ALL
                .into_iter()
                .filter_map(|d| board.neighbor(p, d))
                .find(|n| targets.contains(n))
        };

        let mut best: HashMap<Position, u32> = HashMap::from([(start, 0)]);
        let mut parent: HashMap<Position, Position> = HashMap::new();
        let mut frontier = BinaryHeap::from([Reverse((0_u32, start))]);

        while let Some(Reverse((cost, current))) = frontier.pop() {
            if best.get(&current).is_some_and(|&known| cost > known) {
                continue;
            }
            if let Some(target) = adjacent_target(current) {
                let mut path = vec![current];
                let mut cursor = current;
                while let Some(&prev) = parent.get(&cursor) {
                    path.push(prev);
                    cursor = prev;
                }
                path.pop();
                path.reverse();
                return Some((path, target));
            }
            for direction in Direction::ALL {
                let Some(next) = board.neighbor(current, direction) else {
                    continue;
                };
                let step = match board.cell_at(next) {
                    CellType::Obstacle => OBSTACLE_COST,
                    CellType::Empty | CellType::Flower => 1,
                };
                let next_cost = cost + step;
                if best.get(&next).is_none_or(|&known| next_cost < known) {
                    best.insert(next, next_cost);
                    parent.insert(next, current);
                    frontier.push(Reverse((next_cost, next)));
                }
            }
        }
        None
    }

    /// Rotates first if the robot is not already facing `direction`.
    fn facing(board: &GameBoard, direction: Direction, then: ActionType) -> PlannedAction {
        if board.robot().orientation() == direction {
            PlannedAction::new(then, direction)
        } else {
            PlannedAction::new(ActionType::Rotate, direction)
        }
    }
}

impl Strategy for GreedyStrategy {
    #[instrument(skip_all, fields(game_id = %game.id()))]
    fn decide(&self, game: &Game) -> Option<PlannedAction> {
        if game.is_finished() {
            return None;
        }
        let board = game.board();
        let robot = board.robot();

        let (targets, act) = if robot.can_pick_more() && board.flowers_on_board() > 0 {
            (board.flower_positions().collect::<Vec<_>>(), ActionType::PickFlower)
        } else if robot.has_flowers() {
            (vec![board.princess_position()], ActionType::GiveFlower)
        } else {
            debug!("Nothing left to collect or deliver");
            return None;
        };

        let (path, target) = Self::route(board, &targets)?;
        let planned = match path.first() {
            None => {
                let direction = robot.position().direction_to(target)?;
                Self::facing(board, direction, act)
            }
            Some(&next) => {
                let direction = robot.position().direction_to(next)?;
                let step = if board.cell_at(next) == CellType::Obstacle {
                    ActionType::Clean
                } else {
                    ActionType::Move
                };
                Self::facing(board, direction, step)
            }
        };

        debug!(
            action = %planned.action,
            direction = %planned.direction,
            remaining = path.len(),
            "Planned"
        );
        Some(planned)
    }

    fn name(&self) -> &str {
        "greedy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowerbot_core::{
        BoardGenerator, GameStatus, GeneratorSettings, RandomBoardGenerator, Robot,
    };

    fn play_out(mut game: Game, limit: usize) -> Game {
        let strategy = GreedyStrategy;
        for _ in 0..limit {
            let Some(step) = strategy.decide(&game) else {
                break;
            };
            game.perform(step.action, step.direction)
                .unwrap_or_else(|e| panic!("greedy proposed an illegal action: {e}"));
        }
        game
    }

    #[test]
    fn test_rotates_before_acting() {
        let board = GameBoard::new(
            3,
            3,
            Robot::new(Position::new(0, 0), Direction::North),
            Position::new(2, 2),
        )
        .and_then(|b| b.with_flower(Position::new(1, 0)))
        .unwrap();
        let game = Game::new("g", "rotate", board);
        assert_eq!(
            GreedyStrategy.decide(&game),
            Some(PlannedAction::new(ActionType::Rotate, Direction::East))
        );
    }

    #[test]
    fn test_cleans_when_walled_in() {
        let board = GameBoard::new(
            4,
            4,
            Robot::new(Position::new(0, 0), Direction::East),
            Position::new(3, 3),
        )
        .and_then(|b| b.with_obstacle(Position::new(1, 0)))
        .and_then(|b| b.with_obstacle(Position::new(0, 1)))
        .and_then(|b| b.with_flower(Position::new(3, 0)))
        .unwrap();
        let game = Game::new("g", "walled", board);
        assert_eq!(
            GreedyStrategy.decide(&game),
            Some(PlannedAction::new(ActionType::Clean, Direction::East))
        );
    }

    #[test]
    fn test_wins_scenario_board() {
        let board = GameBoard::new(
            5,
            5,
            Robot::new(Position::new(0, 0), Direction::North),
            Position::new(4, 4),
        )
        .and_then(|b| b.with_flower(Position::new(1, 1)))
        .unwrap();
        let game = play_out(Game::new("g", "scenario", board), 100);
        assert_eq!(game.status(), GameStatus::Won);
        assert!(game.actions().iter().all(|a| *a.success()));
    }

    #[test]
    fn test_wins_generated_boards() {
        let generator = RandomBoardGenerator::seeded(GeneratorSettings::default(), 99);
        for size in [3, 6, 10, 25] {
            let board = generator.generate(size).unwrap();
            let game = play_out(Game::new(format!("g{size}"), "generated", board), 20_000);
            assert_eq!(game.status(), GameStatus::Won, "size {size}");
        }
    }

    #[test]
    fn test_stops_on_finished_game() {
        let board = GameBoard::new(
            3,
            3,
            Robot::new(Position::new(0, 0), Direction::North),
            Position::new(2, 2),
        )
        .unwrap();
        assert_eq!(GreedyStrategy.decide(&Game::new("g", "won", board)), None);
    }
}
