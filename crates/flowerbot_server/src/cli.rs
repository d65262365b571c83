//! Command-line interface for flowerbot.

use clap::{Parser, Subcommand};
use flowerbot_core::{ActionType, Direction};
use flowerbot_server::DEFAULT_BASE_URL;

/// Flowerbot - robot, flowers and a princess on a grid
#[derive(Parser, Debug)]
#[command(name = "flowerbot")]
#[command(about = "Robot-flower-princess game server and client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Seed for reproducible boards
        #[arg(long)]
        seed: Option<u64>,

        /// Declare games over after this many logged actions
        #[arg(long)]
        move_limit: Option<usize>,
    },

    /// Create a game
    Create {
        /// Game name
        name: String,

        /// Side of the square board
        #[arg(short, long, default_value = "10")]
        size: u32,

        /// Game server URL
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        server_url: String,
    },

    /// List all games
    List {
        /// Game server URL
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        server_url: String,
    },

    /// Show one game
    Show {
        /// Game id
        id: String,

        /// Game server URL
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        server_url: String,
    },

    /// Perform one action, e.g. `act <id> move east`
    Act {
        /// Game id
        id: String,

        /// rotate, move, pickFlower, dropFlower, giveFlower or clean
        action: ActionType,

        /// north, east, south or west
        direction: Direction,

        /// Game server URL
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        server_url: String,
    },

    /// Let the server play a game to the end
    Autoplay {
        /// Game id
        id: String,

        /// Game server URL
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        server_url: String,
    },

    /// Print every board of a game's history
    Replay {
        /// Game id
        id: String,

        /// Game server URL
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        server_url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_act_parses_action_and_direction() {
        let cli = Cli::try_parse_from(["flowerbot", "act", "abc", "pickFlower", "south"]).unwrap();
        match cli.command {
            Command::Act {
                id,
                action,
                direction,
                server_url,
            } => {
                assert_eq!(id, "abc");
                assert_eq!(action, ActionType::PickFlower);
                assert_eq!(direction, Direction::South);
                assert_eq!(server_url, DEFAULT_BASE_URL);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_serve_flags_are_optional() {
        let cli = Cli::try_parse_from(["flowerbot", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Serve {
                port: Some(9000),
                host: None,
                config: None,
                ..
            }
        ));
    }
}
