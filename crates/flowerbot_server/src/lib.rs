//! Flowerbot server - game service, REST API and client
//!
//! Hosts robot-flower-princess games over HTTP.
//!
//! # Architecture
//!
//! - **Service**: the six game operations over an in-memory store
//! - **Store**: one lock per game, so concurrent requests on one id serialize
//! - **Strategy**: autoplay decisions (greedy path to flowers, then the princess)
//! - **Authority**: decides when a playing game is lost
//! - **Api**: axum router mapping the service onto JSON routes
//! - **Client**: reqwest client for the same routes
//!
//! # Example
//!
//! ```no_run
//! use flowerbot_server::{GameService, ServerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let service = GameService::new(&config);
//! let game = service.create_game("first", 8)?;
//! let game = service.auto_play(game.id())?;
//! println!("{}", game.status());
//!
//! flowerbot_server::serve(service, &config.bind_address()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod authority;
mod client;
mod config;
mod error;
mod service;
mod store;
mod strategy;
mod validation;

// Crate-level exports - HTTP surface
pub use api::{ActionRequest, AutoplayQuery, CreateGameRequest, router, serve};
pub use client::{DEFAULT_BASE_URL, REQUEST_TIMEOUT, RestGameClient};

// Crate-level exports - Configuration
pub use config::{ConfigError, HOST_ENV, PORT_ENV, ServerConfig};

// Crate-level exports - Errors
pub use error::{ErrorBody, ErrorTag, GameError, GameErrorKind};

// Crate-level exports - Game service
pub use authority::{MoveLimit, NeverUnwinnable, RuleAuthority};
pub use service::{GameService, MAX_CONSECUTIVE_FAILURES};
pub use store::{GameRecord, GameStore};
pub use strategy::{GreedyStrategy, PlannedAction, Strategy};
pub use validation::{validate_board_size, validate_game_id, validate_name};
