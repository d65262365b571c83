//! Flowerbot - Unified CLI
//!
//! Runs the game server or talks to one over HTTP.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use flowerbot_core::{Game, GameBoard};
use flowerbot_server::{GameService, RestGameClient, ServerConfig};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,flowerbot_server=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            port,
            host,
            seed,
            move_limit,
        } => run_server(config, host, port, seed, move_limit).await,
        Command::Create {
            name,
            size,
            server_url,
        } => {
            let game = client(&server_url)?.create_game(&name, size).await?;
            print_game(&game);
            Ok(())
        }
        Command::List { server_url } => {
            for game in client(&server_url)?.list_games().await? {
                println!(
                    "{}  {:<20} {:>3}x{:<3} {}",
                    game.id(),
                    game.name(),
                    game.board().width(),
                    game.board().height(),
                    game.status()
                );
            }
            Ok(())
        }
        Command::Show { id, server_url } => {
            print_game(&client(&server_url)?.get_game(&id).await?);
            Ok(())
        }
        Command::Act {
            id,
            action,
            direction,
            server_url,
        } => {
            let game = client(&server_url)?
                .execute_action(&id, action, direction)
                .await?;
            print_game(&game);
            Ok(())
        }
        Command::Autoplay { id, server_url } => {
            print_game(&client(&server_url)?.auto_play(&id).await?);
            Ok(())
        }
        Command::Replay { id, server_url } => {
            let snapshots = client(&server_url)?.replay(&id).await?;
            for (step, board) in snapshots.iter().enumerate() {
                println!("Step {}", step + 1);
                print_board(board);
            }
            Ok(())
        }
    }
}

/// Run the HTTP game server
#[instrument(skip_all)]
async fn run_server(
    config_path: Option<std::path::PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    seed: Option<u64>,
    move_limit: Option<usize>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    let mut config = config.with_env()?.with_overrides(host, port);
    if seed.is_some() {
        config = config.with_seed(seed);
    }
    if move_limit.is_some() {
        config = config.with_move_limit(move_limit);
    }

    info!(address = %config.bind_address(), "Starting Flowerbot server");
    let service = GameService::new(&config);
    flowerbot_server::serve(service, &config.bind_address()).await
}

fn client(server_url: &str) -> Result<RestGameClient> {
    Ok(RestGameClient::new(server_url)?)
}

fn print_game(game: &Game) {
    println!("{} ({}) - {}", game.name(), game.id(), game.status());
    println!("Actions: {}", game.actions().len());
    print_board(game.board());
}

fn print_board(board: &GameBoard) {
    let robot = board.robot();
    println!(
        "Robot facing {} holding {} | delivered {}/{}",
        robot.orientation(),
        robot.flowers_held(),
        board.flowers_delivered(),
        board.total_flowers()
    );
    println!("{}", board.display());
}
