//! Error types shared by the service, the HTTP layer and the client.

use derive_more::{Display, Error};
use flowerbot_core::{ActionFailure, GameStatus};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GameErrorKind {
    /// Input rejected before anything was touched.
    #[display("{}", _0)]
    Validation(#[error(not(source))] String),

    /// No game with this id.
    #[display("Game not found: {}", _0)]
    NotFound(#[error(not(source))] String),

    /// The engine refused the action; the attempt was logged.
    #[display("Illegal action: {}", _0)]
    IllegalAction(#[error(not(source))] ActionFailure),

    /// The game already ended.
    #[display("Game is already finished ({})", _0)]
    GameFinished(#[error(not(source))] GameStatus),

    /// Unexpected failure on the server.
    #[display("Server error: {}", _0)]
    Server(#[error(not(source))] String),

    /// The server could not be reached or answered garbage.
    #[display("Network error: {}", _0)]
    Network(#[error(not(source))] String),
}

/// Game operation error with the location it was raised at.
#[derive(Debug, Clone, Display, Error)]
#[display("{} at {}:{}", kind, file, line)]
pub struct GameError {
    /// Error category and payload.
    pub kind: GameErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GameError {
    /// Creates a new error with caller location tracking.
    #[track_caller]
    #[instrument(skip(kind))]
    pub fn new(kind: GameErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for [`GameErrorKind::Validation`].
    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(GameErrorKind::Validation(message.into()))
    }

    /// Shorthand for [`GameErrorKind::NotFound`].
    #[track_caller]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::new(GameErrorKind::NotFound(id.into()))
    }

    /// Shorthand for [`GameErrorKind::Server`].
    #[track_caller]
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(GameErrorKind::Server(message.into()))
    }

    /// Shorthand for [`GameErrorKind::Network`].
    #[track_caller]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GameErrorKind::Network(message.into()))
    }

    /// Error category and payload.
    pub fn kind(&self) -> &GameErrorKind {
        &self.kind
    }
}

impl From<GameErrorKind> for GameError {
    #[track_caller]
    fn from(kind: GameErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Category tag carried by [`ErrorBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorTag {
    /// See [`GameErrorKind::Validation`].
    Validation,
    /// See [`GameErrorKind::NotFound`].
    NotFound,
    /// See [`GameErrorKind::IllegalAction`].
    IllegalAction,
    /// See [`GameErrorKind::GameFinished`].
    GameFinished,
    /// See [`GameErrorKind::Server`].
    Server,
    /// See [`GameErrorKind::Network`].
    Network,
}

/// JSON error body returned by the REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Category.
    pub kind: ErrorTag,
    /// Human-readable message.
    pub message: String,
    /// Failure code for illegal actions, e.g. `"BLOCKED"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ActionFailure>,
    /// Terminal status for refused actions on finished games.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<GameStatus>,
    /// Identifier that was looked up, for not-found errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl From<&GameErrorKind> for ErrorBody {
    fn from(kind: &GameErrorKind) -> Self {
        let (tag, reason, status, id) = match kind {
            GameErrorKind::Validation(_) => (ErrorTag::Validation, None, None, None),
            GameErrorKind::NotFound(id) => (ErrorTag::NotFound, None, None, Some(id.clone())),
            GameErrorKind::IllegalAction(f) => (ErrorTag::IllegalAction, Some(*f), None, None),
            GameErrorKind::GameFinished(s) => (ErrorTag::GameFinished, None, Some(*s), None),
            GameErrorKind::Server(_) => (ErrorTag::Server, None, None, None),
            GameErrorKind::Network(_) => (ErrorTag::Network, None, None, None),
        };
        Self {
            kind: tag,
            message: kind.to_string(),
            reason,
            status,
            id,
        }
    }
}

impl ErrorBody {
    /// Rebuilds the error kind on the client side.
    ///
    /// Falls back to the message when `reason`/`status`/`id` are missing.
    pub fn into_kind(self) -> GameErrorKind {
        match (self.kind, self.reason, self.status) {
            (ErrorTag::IllegalAction, Some(reason), _) => GameErrorKind::IllegalAction(reason),
            (ErrorTag::GameFinished, _, Some(status)) => GameErrorKind::GameFinished(status),
            (ErrorTag::NotFound, _, _) => {
                GameErrorKind::NotFound(self.id.unwrap_or(self.message))
            }
            (ErrorTag::Network, _, _) => GameErrorKind::Network(
                strip(&self.message, "Network error: "),
            ),
            (ErrorTag::Validation, _, _) => GameErrorKind::Validation(self.message),
            _ => GameErrorKind::Server(strip(&self.message, "Server error: ")),
        }
    }
}

fn strip(message: &str, prefix: &str) -> String {
    message.strip_prefix(prefix).unwrap_or(message).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_records_location() {
        let err = GameError::validation("Game name cannot be empty");
        assert_eq!(err.file, file!());
        assert!(err.to_string().starts_with("Game name cannot be empty at "));
    }

    #[test]
    fn test_body_for_illegal_action() {
        let body = ErrorBody::from(&GameErrorKind::IllegalAction(ActionFailure::Blocked));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["kind"], "illegalAction");
        assert_eq!(json["reason"], "BLOCKED");
        assert_eq!(json["message"], "Illegal action: Movement blocked by an obstacle");
        assert!(json.get("status").is_none());
    }

    #[test]
    fn test_body_round_trips_kinds() {
        let kinds = [
            GameErrorKind::Validation("Board size must be between 3 and 50".into()),
            GameErrorKind::NotFound("abc".into()),
            GameErrorKind::IllegalAction(ActionFailure::NoFlowerHere),
            GameErrorKind::GameFinished(GameStatus::Won),
            GameErrorKind::Server("lock poisoned".into()),
        ];
        for kind in kinds {
            let body: ErrorBody =
                serde_json::from_value(serde_json::to_value(ErrorBody::from(&kind)).unwrap())
                    .unwrap();
            assert_eq!(body.into_kind(), kind);
        }
    }
}
