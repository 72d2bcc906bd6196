use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::game::id::{CreatorId, GameId, OptionId, PlayerId, QuestionId};
use crate::game::quiz::{Question, QuestionOption, Quiz};
use crate::game::{Creator, Game, Player};
use crate::routes::AppState;
use crate::websocket::connection::ConnectionActor;
use crate::websocket::message::ErrorContent;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    creator_nickname: String,
    player_limit: Option<usize>,
    quiz_name: String,
    questions: Vec<CreateQuestionRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    title: String,
    duration_seconds: u64,
    options: Vec<String>,
}

#[derive(Deserialize)]
pub struct AddPlayerRequest {
    nickname: String,
}

#[derive(Deserialize)]
pub struct GameCodeQuery {
    code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    id: GameId,
    code: Option<String>,
    state: String,
    player_limit: usize,
    quiz: Quiz,
    players: Vec<Player>,
    current_question: Option<QuestionId>,
}

impl From<Game> for GameResponse {
    fn from(game: Game) -> Self {
        let id = game.id();
        let state = game.state().to_string();
        GameResponse {
            id,
            code: game.code,
            state,
            player_limit: game.player_limit,
            quiz: game.quiz,
            players: game.players,
            current_question: game.current_question,
        }
    }
}

/// What a player may see of a game before joining: no creator id, no questions.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicGameResponse {
    id: GameId,
    code: Option<String>,
    state: String,
    quiz_name: String,
    player_limit: usize,
    players: Vec<Player>,
}

impl From<Game> for PublicGameResponse {
    fn from(game: Game) -> Self {
        let id = game.id();
        let state = game.state().to_string();
        PublicGameResponse {
            id,
            code: game.code,
            state,
            quiz_name: game.quiz.name,
            player_limit: game.player_limit,
            players: game.players,
        }
    }
}

impl CreateGameRequest {
    fn into_quiz(self) -> Result<Quiz, Error> {
        if self.creator_nickname.trim().is_empty() {
            return Err(unprocessable("The creator nickname cannot be empty"));
        }
        if self.quiz_name.trim().is_empty() {
            return Err(unprocessable("The quiz name cannot be empty"));
        }

        let questions = self
            .questions
            .into_iter()
            .zip(0..)
            .map(|(question, order)| question.into_question(order))
            .collect::<Result<Vec<Question>, Error>>()?;

        Ok(Quiz {
            name: self.quiz_name,
            creator: Creator {
                id: CreatorId::new_random(),
                nickname: self.creator_nickname,
            },
            questions,
        })
    }
}

impl CreateQuestionRequest {
    const MAX_DURATION_SECONDS: u64 = 3600;

    fn into_question(self, order: i32) -> Result<Question, Error> {
        if self.duration_seconds == 0 {
            return Err(unprocessable("A question needs a duration"));
        }
        if self.duration_seconds > CreateQuestionRequest::MAX_DURATION_SECONDS {
            return Err(unprocessable("A question cannot last longer than an hour"));
        }
        if self.options.is_empty() {
            return Err(unprocessable("A question needs at least one option"));
        }

        Ok(Question {
            id: QuestionId::new_random(),
            title: self.title,
            duration: Duration::from_secs(self.duration_seconds),
            order,
            options: self
                .options
                .into_iter()
                .map(|text| QuestionOption {
                    id: OptionId::new_random(),
                    text,
                })
                .collect(),
        })
    }
}

fn unprocessable(reason: &str) -> Error {
    Error::UnprocessableMessage(reason.to_string(), "Request body".to_string())
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateGameRequest>,
) -> Response {
    let player_limit = request
        .player_limit
        .unwrap_or(state.config.game.default_player_limit);
    if player_limit == 0 {
        return error_response(unprocessable("The player limit must be positive"));
    }

    let result = match request.into_quiz() {
        Ok(quiz) => {
            state
                .coordinator
                .game_service()
                .create(quiz, player_limit)
                .await
        }
        Err(error) => Err(error),
    };

    match result {
        Ok(game) => (StatusCode::OK, Json(GameResponse::from(game))).into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn start(State(state): State<Arc<AppState>>, Path(game_id): Path<GameId>) -> Response {
    let game_service = state.coordinator.game_service();
    let result = match game_service.get_by_id(game_id).await {
        Ok(game) => game_service.start(game).await,
        Err(error) => Err(error),
    };

    match result {
        Ok(game) => {
            log::info!("Game started. GameId: '{game_id}'.");
            (StatusCode::OK, Json(GameResponse::from(game))).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub async fn add_player(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
    Json(request): Json<AddPlayerRequest>,
) -> Response {
    if request.nickname.trim().is_empty() {
        return error_response(unprocessable("The nickname cannot be empty"));
    }

    match state
        .coordinator
        .game_service()
        .add_player(game_id, &request.nickname)
        .await
    {
        Ok(player) => {
            log::info!(
                "Player added. GameId: '{game_id}', PlayerId: '{}'.",
                player.id
            );
            (StatusCode::OK, Json(player)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub async fn find_by_code(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GameCodeQuery>,
) -> Response {
    let code = query.code.trim().to_uppercase();
    if code.is_empty() {
        return error_response(unprocessable("The game code cannot be empty"));
    }

    match state.coordinator.game_service().get_by_code(&code).await {
        Ok(game) => (StatusCode::OK, Json(PublicGameResponse::from(game))).into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn current_question(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
) -> Response {
    let result = state
        .coordinator
        .game_service()
        .get_by_id(game_id)
        .await
        .and_then(|game| {
            game.active_question()
                .cloned()
                .ok_or_else(|| DomainError::NoCurrentQuestion(game_id).into())
        });

    match result {
        Ok(question) => (StatusCode::OK, Json(question)).into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn connect_player_to_websocket(
    State(state): State<Arc<AppState>>,
    Path((game_id, player_id)): Path<(GameId, PlayerId)>,
    websocket_upgrade: WebSocketUpgrade,
) -> Response {
    let inactivity_timeout = state.config.websocket.inactivity_timeout();
    websocket_upgrade.on_upgrade(move |websocket| async move {
        ConnectionActor::connect_player(
            Arc::clone(&state.coordinator),
            game_id,
            player_id,
            websocket,
            inactivity_timeout,
        )
        .await
    })
}

pub async fn connect_creator_to_websocket(
    State(state): State<Arc<AppState>>,
    Path((game_id, creator_id)): Path<(GameId, CreatorId)>,
    websocket_upgrade: WebSocketUpgrade,
) -> Response {
    let inactivity_timeout = state.config.websocket.inactivity_timeout();
    websocket_upgrade.on_upgrade(move |websocket| async move {
        ConnectionActor::connect_creator(
            Arc::clone(&state.coordinator),
            game_id,
            creator_id,
            websocket,
            inactivity_timeout,
        )
        .await
    })
}

fn error_status(error: &Error) -> StatusCode {
    match error {
        Error::Domain(
            DomainError::GameDoesNotExist(_)
            | DomainError::GameCodeDoesNotExist(_)
            | DomainError::NoCurrentQuestion(_)
            | DomainError::PlayerNotInGame(_),
        ) => StatusCode::NOT_FOUND,
        Error::Domain(DomainError::QuizHasNoQuestions) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Domain(_) => StatusCode::CONFLICT,
        Error::UnprocessableMessage(_, _) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Internal(_) | Error::WebsocketClosed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: Error) -> Response {
    let status = error_status(&error);
    if status.is_server_error() {
        log::error!("Request failed. Error: '{error}'.");
    } else {
        log::info!("Request rejected. Error: '{error}'.");
    }
    (status, Json(ErrorContent::from(&error))).into_response()
}
