//! Game service operations against an in-memory store.

use flowerbot_core::{
    ActionFailure, ActionType, Direction, Game, GameBoard, GameStatus, Position, Robot,
};
use flowerbot_server::{
    GameErrorKind, GameService, MAX_CONSECUTIVE_FAILURES, MoveLimit, PlannedAction, ServerConfig,
    Strategy,
};
use std::thread;

fn service() -> GameService {
    GameService::new(&ServerConfig::default().with_seed(Some(7)))
}

fn five_by_five() -> GameBoard {
    GameBoard::new(
        5,
        5,
        Robot::new(Position::new(0, 0), Direction::North),
        Position::new(4, 4),
    )
    .and_then(|b| b.with_flower(Position::new(1, 1)))
    .expect("valid board")
}

/// Always walks off the north edge.
struct OffTheEdge;

impl Strategy for OffTheEdge {
    fn decide(&self, _game: &Game) -> Option<PlannedAction> {
        Some(PlannedAction::new(ActionType::Move, Direction::North))
    }

    fn name(&self) -> &str {
        "off-the-edge"
    }
}

/// Never proposes anything.
struct Idle;

impl Strategy for Idle {
    fn decide(&self, _game: &Game) -> Option<PlannedAction> {
        None
    }

    fn name(&self) -> &str {
        "idle"
    }
}

#[test]
fn test_create_rejects_bad_input() {
    let service = service();

    for size in [0, 2, 51] {
        let err = service.create_game("sized", size).unwrap_err();
        assert_eq!(
            err.kind,
            GameErrorKind::Validation("Board size must be between 3 and 50".into())
        );
    }
    let err = service.create_game("   ", 10).unwrap_err();
    assert_eq!(
        err.kind,
        GameErrorKind::Validation("Game name cannot be empty".into())
    );
    assert!(service.list_games().unwrap().is_empty());
}

#[test]
fn test_create_accepts_size_bounds() {
    let service = service();
    for size in [3, 50] {
        let game = service.create_game("bounds", size).unwrap();
        assert_eq!(game.board().width(), size);
        assert_eq!(game.board().height(), size);
        assert_eq!(game.status(), GameStatus::Playing);
        assert!(game.actions().is_empty());
        assert!(game.board().total_flowers() >= 1);
    }
}

#[test]
fn test_get_unknown_and_blank_ids() {
    let service = service();
    assert_eq!(
        service.get_game("missing").unwrap_err().kind,
        GameErrorKind::NotFound("missing".into())
    );
    assert_eq!(
        service.get_game("").unwrap_err().kind,
        GameErrorKind::Validation("Game ID cannot be empty".into())
    );
}

#[test]
fn test_illegal_action_is_logged() {
    let service = service();
    let game = service
        .create_game_with_board("illegal", five_by_five())
        .unwrap();

    let err = service
        .execute_action(game.id(), ActionType::Move, Direction::North)
        .unwrap_err();
    assert_eq!(
        err.kind,
        GameErrorKind::IllegalAction(ActionFailure::OutOfBounds)
    );

    let stored = service.get_game(game.id()).unwrap();
    assert_eq!(stored.board(), game.board());
    assert_eq!(stored.actions().len(), 1);
    assert!(!*stored.actions()[0].success());
    assert_eq!(
        stored.actions()[0].failure(),
        Some(ActionFailure::OutOfBounds)
    );
    assert!(stored.updated_at().is_some());
}

#[test]
fn test_won_game_refuses_actions() {
    let service = service();
    let id = service
        .create_game_with_board("refuse", five_by_five())
        .unwrap()
        .id()
        .to_string();

    let game = service.auto_play(&id).unwrap();
    assert_eq!(game.status(), GameStatus::Won);
    let logged = game.actions().len();

    let err = service
        .execute_action(&id, ActionType::Rotate, Direction::West)
        .unwrap_err();
    assert_eq!(err.kind, GameErrorKind::GameFinished(GameStatus::Won));
    assert_eq!(service.get_game(&id).unwrap().actions().len(), logged);

    let again = service.auto_play(&id).unwrap();
    assert_eq!(again.actions().len(), logged);
}

#[test]
fn test_move_limit_ends_the_game() {
    let service = service().with_authority(MoveLimit::new(2));
    let id = service
        .create_game_with_board("limited", five_by_five())
        .unwrap()
        .id()
        .to_string();

    let game = service
        .execute_action(&id, ActionType::Rotate, Direction::East)
        .unwrap();
    assert_eq!(game.status(), GameStatus::Playing);

    // The failed attempt fills the log and the game is returned lost.
    let game = service
        .execute_action(&id, ActionType::Move, Direction::North)
        .unwrap();
    assert_eq!(game.status(), GameStatus::GameOver);

    assert_eq!(
        service
            .execute_action(&id, ActionType::Move, Direction::East)
            .unwrap_err()
            .kind,
        GameErrorKind::GameFinished(GameStatus::GameOver)
    );
}

#[test]
fn test_autoplay_wins_generated_boards() {
    let service = service();
    for size in [3, 10, 20] {
        let game = service.create_game("auto", size).unwrap();
        let game = service.auto_play(game.id()).unwrap();
        assert_eq!(game.status(), GameStatus::Won, "size {size}");
        assert_eq!(
            game.board().flowers_delivered(),
            game.board().total_flowers()
        );
    }
}

#[test]
fn test_autoplay_respects_step_bound() {
    let service = service();
    let id = service
        .create_game_with_board("bounded", five_by_five())
        .unwrap()
        .id()
        .to_string();

    let game = service.auto_play_bounded(&id, 3).unwrap();
    assert_eq!(game.status(), GameStatus::Playing);
    assert_eq!(game.actions().len(), 3);

    let game = service.auto_play(&id).unwrap();
    assert_eq!(game.status(), GameStatus::Won);
}

#[test]
fn test_list_is_ordered_by_creation() {
    let service = service();
    let ids: Vec<String> = ["first", "second", "third"]
        .into_iter()
        .map(|name| service.create_game(name, 5).unwrap().id().to_string())
        .collect();

    let listed = service.list_games().unwrap();
    assert_eq!(listed.len(), 3);
    assert!(
        listed
            .windows(2)
            .all(|w| w[0].created_at() <= w[1].created_at())
    );
    for id in &ids {
        assert!(listed.iter().any(|g| g.id() == id));
    }
}

#[test]
fn test_replay_matches_history() {
    let service = service();
    let id = service
        .create_game_with_board("replay", five_by_five())
        .unwrap()
        .id()
        .to_string();

    assert!(service.replay(&id).unwrap().is_empty());

    let _ = service.execute_action(&id, ActionType::Move, Direction::West);
    let game = service.auto_play(&id).unwrap();
    let snapshots = service.replay(&id).unwrap();

    let successes = game.actions().iter().filter(|a| *a.success()).count();
    assert_eq!(snapshots.len(), successes);
    assert_eq!(snapshots.last(), Some(game.board()));
}

#[test]
fn test_concurrent_actions_on_one_game_serialize() {
    let service = service();
    let id = service
        .create_game_with_board("race", five_by_five())
        .unwrap()
        .id()
        .to_string();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = service.clone();
            let id = id.clone();
            thread::spawn(move || {
                let direction = if i % 2 == 0 {
                    Direction::East
                } else {
                    Direction::South
                };
                for _ in 0..25 {
                    service
                        .execute_action(&id, ActionType::Rotate, direction)
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let game = service.get_game(&id).unwrap();
    assert_eq!(game.actions().len(), 200);
    assert!(game.actions().iter().all(|a| *a.success()));
    assert_eq!(service.replay(&id).unwrap().len(), 200);
}

#[test]
fn test_autoplay_gives_up_after_repeated_failures() {
    let service = service().with_strategy(OffTheEdge);
    let id = service
        .create_game_with_board("stuck", five_by_five())
        .unwrap()
        .id()
        .to_string();

    let game = service.auto_play(&id).unwrap();
    assert_eq!(game.status(), GameStatus::Playing);
    assert_eq!(game.actions().len(), MAX_CONSECUTIVE_FAILURES);
    assert!(
        game.actions()
            .iter()
            .all(|a| a.failure() == Some(ActionFailure::OutOfBounds))
    );
    assert_eq!(game.board(), &five_by_five());
}

#[test]
fn test_autoplay_stops_when_strategy_halts() {
    let service = service().with_strategy(Idle);
    let created = service
        .create_game_with_board("idle", five_by_five())
        .unwrap();

    let game = service.auto_play(created.id()).unwrap();
    assert_eq!(game.status(), GameStatus::Playing);
    assert!(game.actions().is_empty());
    assert_eq!(game.updated_at(), None);
}

#[test]
fn test_autoplay_ends_at_move_limit() {
    let service = service().with_authority(MoveLimit::new(4));
    let id = service
        .create_game_with_board("limited autoplay", five_by_five())
        .unwrap()
        .id()
        .to_string();

    let game = service.auto_play(&id).unwrap();
    assert_eq!(game.status(), GameStatus::GameOver);
    assert_eq!(game.actions().len(), 4);
    assert_eq!(
        service
            .execute_action(&id, ActionType::Rotate, Direction::South)
            .unwrap_err()
            .kind,
        GameErrorKind::GameFinished(GameStatus::GameOver)
    );
}

#[test]
fn test_requested_bound_is_capped_by_config() {
    let config = ServerConfig::default()
        .with_seed(Some(7))
        .with_autoplay_max_steps(2);
    let service = GameService::new(&config);
    let id = service
        .create_game_with_board("capped", five_by_five())
        .unwrap()
        .id()
        .to_string();

    let game = service.auto_play_bounded(&id, 100).unwrap();
    assert_eq!(game.actions().len(), 2);
    assert_eq!(game.status(), GameStatus::Playing);
}
