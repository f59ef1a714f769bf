use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::player::AnswerView, error::AppError, services::player_service, state::SharedState,
};

/// Host answer board.
pub fn router() -> Router<SharedState> {
    Router::new().route("/api/answers/{id}", get(list_answers))
}

/// Answer board of a session, in join order.
#[utoipa::path(
    get,
    path = "/api/answers/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Four digit session code")),
    responses(
        (status = 200, description = "Name and answer of every player", body = [AnswerView]),
        (status = 400, description = "Malformed session code")
    )
)]
pub async fn list_answers(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AnswerView>>, AppError> {
    Ok(Json(player_service::list_answers(&state, &id).await?))
}
