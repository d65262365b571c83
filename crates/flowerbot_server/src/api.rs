//! REST API over [`GameService`].
//!
//! Every route is served both at the root and under `/api`.

use crate::error::{ErrorBody, GameError, GameErrorKind};
use crate::service::GameService;
use axum::{
    Json, Router,
    body::Body,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use flowerbot_core::{ActionType, Direction, Game, GameBoard};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tracing::{debug, error, info, instrument};

/// Body of `POST /games`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    /// Display name.
    pub name: String,
    /// Side of the square board; the server default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_size: Option<u32>,
}

/// Body of `POST /games/{id}/action`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActionRequest {
    /// What to do.
    pub action: ActionType,
    /// Where to aim it.
    pub direction: Direction,
}

/// Query of `POST /games/{id}/autoplay`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoplayQuery {
    /// Optional step bound, capped by the server's own.
    pub max_steps: Option<usize>,
}

impl GameErrorKind {
    /// HTTP status for this kind of failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GameErrorKind::Validation(_)
            | GameErrorKind::IllegalAction(_)
            | GameErrorKind::GameFinished(_) => StatusCode::BAD_REQUEST,
            GameErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            GameErrorKind::Server(_) | GameErrorKind::Network(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            debug!(error = %self, "Request rejected");
        }
        (status, Json(ErrorBody::from(&self.kind))).into_response()
    }
}

impl From<JsonRejection> for GameError {
    #[track_caller]
    fn from(rejection: JsonRejection) -> Self {
        GameError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for GameError {
    #[track_caller]
    fn from(rejection: QueryRejection) -> Self {
        GameError::validation(rejection.body_text())
    }
}

/// Builds the router.
pub fn router(service: GameService) -> Router {
    let routes = Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/action", post(execute_action))
        .route("/games/{id}/autoplay", post(auto_play))
        .route("/games/{id}/replay", get(replay))
        .route("/health", get(health));

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(service)
}

#[instrument(skip_all)]
async fn create_game(
    State(service): State<GameService>,
    body: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Game>), GameError> {
    let Json(request) = body?;
    let size = request
        .board_size
        .unwrap_or_else(|| service.default_board_size());
    let game = blocking(move || service.create_game(&request.name, size)).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

#[instrument(skip_all)]
async fn list_games(State(service): State<GameService>) -> Result<Json<Vec<Game>>, GameError> {
    Ok(Json(blocking(move || service.list_games()).await?))
}

#[instrument(skip(service))]
async fn get_game(
    State(service): State<GameService>,
    Path(id): Path<String>,
) -> Result<Json<Game>, GameError> {
    Ok(Json(blocking(move || service.get_game(&id)).await?))
}

#[instrument(skip(service, body))]
async fn execute_action(
    State(service): State<GameService>,
    Path(id): Path<String>,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<Game>, GameError> {
    let Json(request) = body?;
    let game = blocking(move || {
        service.execute_action(&id, request.action, request.direction)
    })
    .await?;
    Ok(Json(game))
}

#[instrument(skip(service, query))]
async fn auto_play(
    State(service): State<GameService>,
    Path(id): Path<String>,
    query: Result<Query<AutoplayQuery>, QueryRejection>,
) -> Result<Json<Game>, GameError> {
    let Query(query) = query?;
    let game = blocking(move || match query.max_steps {
        Some(steps) => service.auto_play_bounded(&id, steps),
        None => service.auto_play(&id),
    })
    .await?;
    Ok(Json(game))
}

#[instrument(skip(service))]
async fn replay(
    State(service): State<GameService>,
    Path(id): Path<String>,
) -> Result<Json<Vec<GameBoard>>, GameError> {
    Ok(Json(blocking(move || service.replay(&id)).await?))
}

/// Runs a service call on the blocking pool.
///
/// Calls may wait on a game's lock, which autoplay holds for its whole run.
async fn blocking<T, F>(call: F) -> Result<T, GameError>
where
    F: FnOnce() -> Result<T, GameError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| GameError::server(format!("Service task failed: {e}")))?
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Binds `address` and serves the API until the process stops.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
#[instrument(skip(service))]
pub async fn serve(service: GameService, address: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!(address = %listener.local_addr()?, "Flowerbot server listening");
    axum::serve(listener, router(service)).await?;
    Ok(())
}
