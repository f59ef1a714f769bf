use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{patch, post},
};
use validator::Validate;

use crate::{
    dto::player::{
        ClearAnswersRequest, ClearAnswersResponse, JoinSessionRequest, JoinSessionResponse,
        PlayerView, SubmitAnswerRequest,
    },
    error::AppError,
    routes::extract::ApiJson,
    services::player_service,
    state::SharedState,
};

/// Player endpoints: joining a session and answering.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/players", post(join_session))
        .route("/api/players/clear", patch(clear_answers))
        .route("/api/players/{id}", patch(submit_answer))
}

/// Join a session by name, or get back the player already using that name.
#[utoipa::path(
    post,
    path = "/api/players",
    tag = "players",
    request_body = JoinSessionRequest,
    responses(
        (status = 201, description = "Player created", body = JoinSessionResponse),
        (status = 200, description = "Player already in the session", body = JoinSessionResponse),
        (status = 400, description = "Malformed session code or blank name"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn join_session(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<JoinSessionRequest>,
) -> Result<(StatusCode, Json<JoinSessionResponse>), AppError> {
    payload.validate()?;
    let (joined, created) = player_service::join_session(&state, payload).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(joined)))
}

/// Submit or clear the player's answer. Only accepted while the session is live.
#[utoipa::path(
    patch,
    path = "/api/players/{id}",
    tag = "players",
    params(("id" = i64, Path, description = "Player identifier")),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = PlayerView),
        (status = 400, description = "Polling is closed or the body is incomplete"),
        (status = 404, description = "Player not found in that session")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<SubmitAnswerRequest>,
) -> Result<Json<PlayerView>, AppError> {
    Ok(Json(
        player_service::submit_answer(&state, &id, payload).await?,
    ))
}

/// Reset every answer of a session to null.
#[utoipa::path(
    patch,
    path = "/api/players/clear",
    tag = "players",
    request_body = ClearAnswersRequest,
    responses(
        (status = 200, description = "Answers cleared", body = ClearAnswersResponse),
        (status = 400, description = "Malformed session code")
    )
)]
pub async fn clear_answers(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<ClearAnswersRequest>,
) -> Result<Json<ClearAnswersResponse>, AppError> {
    payload.validate()?;
    Ok(Json(player_service::clear_answers(&state, payload).await?))
}
