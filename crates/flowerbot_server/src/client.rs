//! Typed HTTP client for the REST API.

use crate::api::{ActionRequest, CreateGameRequest};
use crate::error::{ErrorBody, GameError, GameErrorKind};
use crate::validation::{validate_board_size, validate_game_id, validate_name};
use flowerbot_core::{ActionType, Direction, Game, GameBoard};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default server address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Type-safe HTTP game client.
///
/// Inputs are validated locally with the server's rules before any request
/// is sent. Transport failures surface as [`GameErrorKind::Network`].
#[derive(Debug, Clone)]
pub struct RestGameClient {
    base_url: String,
    client: reqwest::Client,
}

impl RestGameClient {
    /// Creates a client for `base_url`, e.g. `http://localhost:8080/api`.
    ///
    /// # Errors
    ///
    /// Returns a network error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, GameError> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    /// Creates a client with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns a network error if the HTTP client cannot be built.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GameError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GameError::network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Server address this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates a game.
    #[instrument(skip(self))]
    pub async fn create_game(&self, name: &str, board_size: u32) -> Result<Game, GameError> {
        validate_name(name)?;
        validate_board_size(board_size)?;
        let body = CreateGameRequest {
            name: name.to_string(),
            board_size: Some(board_size),
        };
        self.send(self.client.post(self.url("/games")).json(&body))
            .await
    }

    /// Lists all games.
    #[instrument(skip(self))]
    pub async fn list_games(&self) -> Result<Vec<Game>, GameError> {
        self.send(self.client.get(self.url("/games"))).await
    }

    /// Fetches one game.
    #[instrument(skip(self))]
    pub async fn get_game(&self, id: &str) -> Result<Game, GameError> {
        validate_game_id(id)?;
        self.send(self.client.get(self.url(&format!("/games/{id}"))))
            .await
    }

    /// Performs one action.
    #[instrument(skip(self))]
    pub async fn execute_action(
        &self,
        id: &str,
        action: ActionType,
        direction: Direction,
    ) -> Result<Game, GameError> {
        validate_game_id(id)?;
        let body = ActionRequest { action, direction };
        self.send(
            self.client
                .post(self.url(&format!("/games/{id}/action")))
                .json(&body),
        )
        .await
    }

    /// Runs autoplay on the server.
    #[instrument(skip(self))]
    pub async fn auto_play(&self, id: &str) -> Result<Game, GameError> {
        validate_game_id(id)?;
        self.send(self.client.post(self.url(&format!("/games/{id}/autoplay"))))
            .await
    }

    /// Fetches the replay snapshots.
    #[instrument(skip(self))]
    pub async fn replay(&self, id: &str) -> Result<Vec<GameBoard>, GameError> {
        validate_game_id(id)?;
        self.send(self.client.get(self.url(&format!("/games/{id}/replay"))))
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GameError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Request failed");
            GameError::network(e.to_string())
        })?;

        let status = response.status();
        debug!(%status, "Response received");
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| GameError::network(format!("Undecodable response: {e}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| GameError::network(e.to_string()))?;
        let kind = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.into_kind(),
            Err(_) => kind_for_status(status, text),
        };
        Err(GameError::new(kind))
    }
}

/// Error kind for a non-2xx answer without a decodable error body.
fn kind_for_status(status: StatusCode, text: String) -> GameErrorKind {
    let message = if text.is_empty() {
        status.to_string()
    } else {
        text
    };
    match status {
        StatusCode::BAD_REQUEST => GameErrorKind::Validation(message),
        StatusCode::NOT_FOUND => GameErrorKind::NotFound(message),
        _ => GameErrorKind::Server(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_fallbacks() {
        assert_eq!(
            kind_for_status(StatusCode::BAD_REQUEST, "bad".into()),
            GameErrorKind::Validation("bad".into())
        );
        assert!(matches!(
            kind_for_status(StatusCode::NOT_FOUND, String::new()),
            GameErrorKind::NotFound(m) if m.contains("404")
        ));
        assert!(matches!(
            kind_for_status(StatusCode::BAD_GATEWAY, "upstream".into()),
            GameErrorKind::Server(_)
        ));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = RestGameClient::new("http://localhost:8080/api/").unwrap();
        assert_eq!(client.url("/games"), "http://localhost:8080/api/games");
    }
}
